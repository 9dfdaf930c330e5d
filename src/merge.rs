//! Coalescing of repeated addresses within one transaction.
//!
//! A transaction may list the same address several times on one side (one
//! entry per input or output). For display, each side is collapsed to one
//! entry per address with the amounts summed exactly.
//!
//! An address that appears on both sides ends up as a single combined entry
//! on the receiver side: its sender and receiver amounts are added together
//! and the input/output split for that address is lost.

use std::collections::HashMap;

use crate::amount::Amount;
use crate::models::LineItem;

/// Which side of a transaction a merged entry ended up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

/// Result of [`merge_senders_receivers`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergedLineItems {
    pub senders: Vec<LineItem>,
    pub receivers: Vec<LineItem>,
}

struct Entry {
    address: String,
    sum: Amount,
    side: Side,
}

/// Merges repeated addresses within `senders` and within `receivers`.
///
/// Entries keep the order in which their address first appeared. When an
/// address occurs on both sides, the output side wins.
pub fn merge_senders_receivers(senders: &[LineItem], receivers: &[LineItem]) -> MergedLineItems {
    let mut entries: Vec<Entry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let tagged = senders
        .iter()
        .map(|item| (item, Side::Input))
        .chain(receivers.iter().map(|item| (item, Side::Output)));

    for (item, side) in tagged {
        match index.get(item.address.as_str()) {
            Some(&i) => {
                let entry = &mut entries[i];
                entry.sum += item.amount;
                entry.side = side;
            }
            None => {
                index.insert(item.address.as_str(), entries.len());
                entries.push(Entry {
                    address: item.address.clone(),
                    sum: item.amount,
                    side,
                });
            }
        }
    }

    let mut merged = MergedLineItems::default();
    for entry in entries {
        let item = LineItem {
            address: entry.address,
            amount: entry.sum,
        };
        match entry.side {
            Side::Input => merged.senders.push(item),
            Side::Output => merged.receivers.push(item),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(items: &[LineItem]) -> Amount {
        items.iter().map(|i| i.amount).sum()
    }

    #[test]
    fn repeated_receiver_collapses_into_one_entry() {
        let receivers = [LineItem::new("A", 10u64), LineItem::new("A", 20u64)];
        let merged = merge_senders_receivers(&[], &receivers);
        assert!(merged.senders.is_empty());
        assert_eq!(merged.receivers, vec![LineItem::new("A", 30u64)]);
    }

    #[test]
    fn sums_are_preserved_per_side() {
        let senders = [
            LineItem::new("A", 5u64),
            LineItem::new("B", 7u64),
            LineItem::new("A", 11u64),
        ];
        let receivers = [
            LineItem::new("C", 1u64),
            LineItem::new("D", 2u64),
            LineItem::new("C", 3u64),
            LineItem::new("E", 4u64),
        ];
        let merged = merge_senders_receivers(&senders, &receivers);
        assert_eq!(sum(&merged.senders), sum(&senders));
        assert_eq!(sum(&merged.receivers), sum(&receivers));
        assert_eq!(merged.senders.len(), 2);
        assert_eq!(merged.receivers.len(), 3);
    }

    #[test]
    fn keeps_first_appearance_order() {
        let receivers = [
            LineItem::new("Z", 1u64),
            LineItem::new("Y", 1u64),
            LineItem::new("Z", 1u64),
        ];
        let merged = merge_senders_receivers(&[], &receivers);
        let order: Vec<&str> = merged.receivers.iter().map(|i| i.address.as_str()).collect();
        assert_eq!(order, ["Z", "Y"]);
    }

    #[test]
    fn address_on_both_sides_collapses_to_output() {
        let senders = [LineItem::new("A", 100u64), LineItem::new("B", 50u64)];
        let receivers = [LineItem::new("C", 60u64), LineItem::new("A", 40u64)];
        let merged = merge_senders_receivers(&senders, &receivers);
        assert_eq!(merged.senders, vec![LineItem::new("B", 50u64)]);
        assert_eq!(
            merged.receivers,
            vec![LineItem::new("A", 140u64), LineItem::new("C", 60u64)]
        );
    }

    #[test]
    fn large_string_amounts_sum_exactly() {
        let receivers: Vec<LineItem> = serde_json::from_str(
            r#"[
                {"address": "A", "amount": "2100000000000000"},
                {"address": "A", "amount": 1}
            ]"#,
        )
        .unwrap();
        let merged = merge_senders_receivers(&[], &receivers);
        assert_eq!(merged.receivers[0].amount, Amount::from(2_100_000_000_000_001u64));
    }
}
