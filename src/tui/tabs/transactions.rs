//! Transactions tab: the center address's transactions, classified.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::amount::{format_amount, format_display};
use crate::classify::{Classification, TxCategory, classify};
use crate::merge::merge_senders_receivers;
use crate::models::{LineItem, Transaction};
use crate::tui::app::{App, Loadable};

/// Renders the transactions panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (title, lines) = match &app.transactions {
        Loadable::Loading => (
            format!(" Transactions  page {} ", app.tx_page),
            vec![Line::styled("Loading...", Style::default().fg(Color::DarkGray))],
        ),
        Loadable::Failed(message) => (
            format!(" Transactions  page {} ", app.tx_page),
            vec![Line::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )],
        ),
        Loadable::Ready(page) => {
            let title = format!(
                " Transactions  page {}/{}  {} total  {} per page ",
                app.tx_page,
                page.pagination.total_pages.max(1),
                page.pagination.total,
                app.page_size
            );
            let lines = if page.list.is_empty() {
                vec![Line::styled(
                    "No transactions",
                    Style::default().fg(Color::DarkGray),
                )]
            } else {
                page.list
                    .iter()
                    .skip(app.tx_scroll)
                    .flat_map(|tx| transaction_lines(tx, &app.center))
                    .collect()
            };
            (title, lines)
        }
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Lines for one transaction: summary, merged inputs, merged outputs,
/// change outputs and a blank separator.
fn transaction_lines(tx: &Transaction, address: &str) -> Vec<Line<'static>> {
    let classification = classify(tx, address);
    let merged = merge_senders_receivers(&tx.senders, &tx.receivers);
    let counts = Counts {
        inputs: merged.senders.len(),
        outputs: merged.receivers.len() + tx.change_outputs.len(),
    };

    let mut lines = vec![summary_line(tx, &classification, counts)];
    if tx.is_coinbase() {
        lines.push(Line::styled(
            "  in   coinbase",
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.extend(
        merged
            .senders
            .iter()
            .map(|item| item_line("  in   ", item, address)),
    );
    lines.extend(
        merged
            .receivers
            .iter()
            .map(|item| item_line("  out  ", item, address)),
    );
    lines.extend(
        tx.change_outputs
            .iter()
            .map(|item| item_line("  chg  ", item, address)),
    );
    lines.push(Line::raw(""));
    lines
}

#[derive(Clone, Copy)]
struct Counts {
    inputs: usize,
    outputs: usize,
}

fn summary_line(tx: &Transaction, classification: &Classification, counts: Counts) -> Line<'static> {
    let badge_color = match classification.category {
        TxCategory::Income => Color::Green,
        TxCategory::Expense => Color::Red,
        TxCategory::SelfTransfer => Color::Blue,
        TxCategory::Mining => Color::Yellow,
    };
    let net_color = if classification.is_positive {
        Color::Green
    } else {
        Color::Red
    };
    let sign = if classification.is_positive { "+" } else { "-" };
    let status = match tx.block_height {
        Some(height) => format!("block {height}  {} conf", tx.confirmations),
        None => "unconfirmed".to_string(),
    };

    Line::from(vec![
        Span::styled(
            format!(" {:<7} ", classification.category.label()),
            Style::default()
                .fg(Color::Black)
                .bg(badge_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {sign}{} ", format_display(classification.net_amount)),
            Style::default().fg(net_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", tx.txid)),
        Span::styled(
            format!(
                " {} in  {} out  fee {}  {status}  {}",
                counts.inputs,
                counts.outputs,
                format_amount(tx.fee),
                tx.timestamp
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn item_line(prefix: &'static str, item: &LineItem, address: &str) -> Line<'static> {
    let style = if item.address == address {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::DarkGray)),
        Span::styled(item.address.clone(), style),
        Span::raw(format!("  {}", format_amount(item.amount))),
    ])
}
