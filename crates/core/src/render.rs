//! Text rendering of a computed quote. Amounts are rounded to cents here and
//! nowhere else.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::quote::QuoteResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreakdownLine {
    pub section: &'static str,
    pub amount: Decimal,
}

pub fn cost_breakdown(quote: &QuoteResult) -> [BreakdownLine; 5] {
    [
        BreakdownLine { section: "Select source", amount: quote.source.layer.cost },
        BreakdownLine { section: "Select middleware", amount: quote.middleware.layer.cost },
        BreakdownLine {
            section: "Select destination (fixed)",
            amount: quote.destination.fixed.cost,
        },
        BreakdownLine { section: "Add-ons", amount: quote.destination.addons_cost },
        BreakdownLine { section: "TOTAL", amount: quote.grand_total_cost },
    ]
}

/// `1234.5` renders as `1,234.50`.
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, cents) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}.{cents}")
}

pub fn format_money(amount: Decimal, currency: &str) -> String {
    if currency.eq_ignore_ascii_case("USD") {
        format!("${}", format_amount(amount))
    } else {
        format!("{} {currency}", format_amount(amount))
    }
}

pub fn timeline_sentence(quote: &QuoteResult) -> String {
    format!(
        "Total: {} business days (~{} calendar days, assuming {} working days/week).",
        quote.total_business_days, quote.approx_calendar_days, quote.working_days_per_week
    )
}

pub fn schedule_line(quote: &QuoteResult) -> String {
    format!("Start: {} → Finish: {}", quote.start_date, quote.finish_date)
}

pub fn render_text(quote: &QuoteResult) -> String {
    let mut lines = Vec::new();

    lines.push("Select source".to_string());
    if quote.source.rows.is_empty() {
        lines.push("  (no source selected)".to_string());
    }
    for row in &quote.source.rows {
        lines.push(format!("  {} • Priority: {}", row.source, row.tier.title()));
        lines.push(format!("    Volumetrics: {}", row.volumetrics));
        for (index, text) in row.customization.lines().enumerate() {
            let label = if index == 0 { "Customization & Logic:" } else { "" };
            lines.push(format!("    {label:<22} {text}"));
        }
        lines.push(format!("    Timeline: {}", row.timeline_text));
    }

    lines.push("Select middleware".to_string());
    match &quote.middleware.option {
        Some(option) => lines.push(format!(
            "  {option} ({})",
            format_money(quote.middleware.layer.cost, &quote.currency)
        )),
        None => lines.push("  (no middleware option)".to_string()),
    }

    lines.push("Select destination".to_string());
    lines.push(format!(
        "  Included: {} ({})",
        quote.destination.target,
        format_money(quote.destination.fixed.cost, &quote.currency)
    ));
    if quote.destination.addons.is_empty() {
        lines.push("  No add-ons selected.".to_string());
    }
    for addon in &quote.destination.addons {
        lines.push(format!("  + {} ({})", addon.name, format_money(addon.price, &quote.currency)));
    }

    lines.push(String::new());
    lines.push(format!("Summary ({})", quote.currency));
    let breakdown = cost_breakdown(quote);
    let width = breakdown.iter().map(|line| line.section.len()).max().unwrap_or(0);
    for line in &breakdown {
        lines.push(format!(
            "  {:<width$}  {:>14}",
            line.section,
            format_money(line.amount, &quote.currency)
        ));
    }

    lines.push(String::new());
    lines.push(timeline_sentence(quote));
    lines.push(schedule_line(quote));

    if !quote.diagnostics.is_empty() {
        lines.push(String::new());
        lines.push("Warnings:".to_string());
        for diagnostic in &quote.diagnostics {
            lines.push(format!("  - {diagnostic}"));
        }
    }

    lines.join("\n")
}
