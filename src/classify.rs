//! Per-address transaction classification.
//!
//! Derives how a single transaction affects one subject address: money
//! received, money spent, a transfer between the address and itself, or a
//! newly minted mining reward. Matching is on the exact address string.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::amount::{Amount, to_display_units};
use crate::models::{LineItem, Transaction};

/// The effect a transaction has on the subject address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxCategory {
    Income,
    Expense,
    #[serde(rename = "self")]
    SelfTransfer,
    Mining,
}

impl TxCategory {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            TxCategory::Income => "income",
            TxCategory::Expense => "expense",
            TxCategory::SelfTransfer => "self",
            TxCategory::Mining => "mining",
        }
    }
}

/// Display-ready classification of one transaction for one address.
///
/// `amount` and `net_amount` are unsigned display-unit values; the sign of
/// the net flow lives in `is_positive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(rename = "type")]
    pub category: TxCategory,
    pub amount: Decimal,
    pub net_amount: Decimal,
    pub is_positive: bool,
}

impl Classification {
    /// Returns the net amount with its sign restored.
    pub fn signed_net_amount(&self) -> Decimal {
        if self.is_positive {
            self.net_amount
        } else {
            -self.net_amount
        }
    }
}

fn total_for(items: &[LineItem], address: &str) -> Amount {
    items
        .iter()
        .filter(|item| item.address == address)
        .map(|item| item.amount)
        .sum()
}

/// Classifies `tx` from the point of view of `address`.
///
/// Branches are tried in priority order: mining, self, expense, income.
/// A transaction that does not involve `address` at all falls back to a
/// zero-valued `self` result instead of failing.
///
/// The `self` branch only requires the address on both sides; whether the
/// address actually received change is not consulted.
pub fn classify(tx: &Transaction, address: &str) -> Classification {
    let total_input = total_for(&tx.senders, address);
    let total_output = total_for(&tx.receivers, address);
    let total_change = total_for(&tx.change_outputs, address);

    let is_coinbase = tx.is_coinbase();
    let is_sender = total_input.is_positive();
    let is_receiver = total_output.is_positive();

    let (category, amount, net_amount) = if is_coinbase && is_receiver {
        (TxCategory::Mining, total_output, total_output)
    } else if is_sender && is_receiver {
        let net = total_output - total_input;
        (TxCategory::SelfTransfer, net.abs(), net)
    } else if is_sender {
        let spent = total_input - total_change;
        (TxCategory::Expense, spent, -spent)
    } else if is_receiver {
        (TxCategory::Income, total_output, total_output)
    } else {
        (TxCategory::SelfTransfer, Amount::ZERO, Amount::ZERO)
    };

    Classification {
        category,
        amount: to_display_units(amount),
        net_amount: to_display_units(net_amount.abs()),
        is_positive: !net_amount.is_negative(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(
        senders: Vec<LineItem>,
        receivers: Vec<LineItem>,
        change_outputs: Vec<LineItem>,
    ) -> Transaction {
        Transaction {
            txid: "t1".to_string(),
            block_height: Some(1),
            size: 0,
            weight: 0,
            senders,
            receivers,
            change_outputs,
            total_amount: Amount::ZERO,
            fee: Amount::ZERO,
            timestamp: String::new(),
            confirmations: 1,
        }
    }

    #[test]
    fn spending_with_change_is_expense_net_of_change() {
        let t = tx(
            vec![LineItem::new("A", 100_000_000u64)],
            vec![LineItem::new("B", 59_990_000u64)],
            vec![LineItem::new("A", 40_000_000u64)],
        );
        let c = classify(&t, "A");
        assert_eq!(c.category, TxCategory::Expense);
        assert_eq!(c.amount, dec!(0.6));
        assert_eq!(c.net_amount, dec!(0.6));
        assert!(!c.is_positive);
        assert_eq!(c.signed_net_amount(), dec!(-0.6));
    }

    #[test]
    fn coinbase_receiver_is_mining() {
        let t = tx(vec![], vec![LineItem::new("A", 5_000_000_000u64)], vec![]);
        let c = classify(&t, "A");
        assert_eq!(c.category, TxCategory::Mining);
        assert_eq!(c.amount, dec!(50));
        assert!(c.is_positive);
    }

    #[test]
    fn mining_sums_repeated_receiver_entries() {
        let t = tx(
            vec![],
            vec![
                LineItem::new("A", 300u64),
                LineItem::new("B", 1u64),
                LineItem::new("A", 700u64),
            ],
            vec![],
        );
        let c = classify(&t, "A");
        assert_eq!(c.category, TxCategory::Mining);
        assert_eq!(c.amount, dec!(0.00001));
    }

    #[test]
    fn sender_and_receiver_is_self_transfer() {
        let t = tx(
            vec![LineItem::new("A", 1_000u64)],
            vec![LineItem::new("A", 400u64), LineItem::new("B", 500u64)],
            vec![],
        );
        let c = classify(&t, "A");
        assert_eq!(c.category, TxCategory::SelfTransfer);
        assert_eq!(c.amount, dec!(0.000006));
        assert_eq!(c.net_amount, dec!(0.000006));
        assert!(!c.is_positive);
    }

    #[test]
    fn receiver_only_is_income() {
        let t = tx(
            vec![LineItem::new("B", 1_000u64)],
            vec![LineItem::new("A", 250_000_000u64)],
            vec![LineItem::new("B", 10u64)],
        );
        let c = classify(&t, "A");
        assert_eq!(c.category, TxCategory::Income);
        assert_eq!(c.amount, dec!(2.5));
        assert!(c.is_positive);
    }

    #[test]
    fn unrelated_address_falls_back_to_zero_self() {
        let t = tx(
            vec![LineItem::new("B", 1_000u64)],
            vec![LineItem::new("C", 900u64)],
            vec![],
        );
        let c = classify(&t, "A");
        assert_eq!(c.category, TxCategory::SelfTransfer);
        assert_eq!(c.amount, Decimal::ZERO);
        assert_eq!(c.net_amount, Decimal::ZERO);
        assert!(c.is_positive);
    }

    #[test]
    fn address_match_is_case_sensitive() {
        let t = tx(vec![], vec![LineItem::new("abc", 10u64)], vec![]);
        assert_eq!(classify(&t, "ABC").category, TxCategory::SelfTransfer);
        assert_eq!(classify(&t, "abc").category, TxCategory::Mining);
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let t = tx(vec![], vec![LineItem::new("A", 100_000_000u64)], vec![]);
        let json = serde_json::to_value(classify(&t, "A")).unwrap();
        assert_eq!(json["type"], "mining");
        assert_eq!(json["isPositive"], true);
        assert!(json.get("netAmount").is_some());
    }
}
