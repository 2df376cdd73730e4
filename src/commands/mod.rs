pub mod affiliate;
pub mod invoice;
pub mod plan;
pub mod remote;
pub mod setup;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use league::error::{BillingError, Result};
use league::money::{group_thousands, round_cents};

/// Parse an optional YYYY-MM-DD argument, defaulting to today
pub fn parse_date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| BillingError::InvalidDate(value.to_string()))
}

/// Whole units, right-aligned for table columns: `$ 1,250`
pub fn format_whole_money(value: Decimal, currency_symbol: &str) -> String {
    let whole = round_cents(value).round();
    format!("{}{:>6}", currency_symbol, group_thousands(&whole.to_string()))
}

/// Widths of each column, read from a rounded table's top border.
fn column_widths(table: &str) -> Option<Vec<usize>> {
    let inner = table.lines().next()?.strip_prefix('╭')?.strip_suffix('╮')?;
    Some(inner.split('┬').map(|cell| cell.chars().count()).collect())
}

/// Close a rounded table with summary rows whose values sit under column
/// `value_col`. Columns left of it merge into one right-aligned label cell;
/// columns right of it are closed off. Rows too wide for their cells are
/// printed as plain `label: value` lines instead.
pub fn add_summary_footer(table: &str, value_col: usize, rows: &[(&str, String)]) -> String {
    let widths = match column_widths(table) {
        Some(w) if value_col > 0 && value_col < w.len() && !rows.is_empty() => w,
        _ => return table.to_string(),
    };
    let body: Vec<&str> = table.lines().collect();
    if body.len() < 4 {
        return table.to_string();
    }

    let label_width = widths[..value_col].iter().sum::<usize>() + value_col - 1;
    let value_width = widths[value_col];

    let fits = rows.iter().all(|(label, value)| {
        label.chars().count() + 2 <= label_width && value.chars().count() + 2 <= value_width
    });
    if !fits {
        let mut out = table.to_string();
        for (label, value) in rows {
            out.push_str(&format!("\n{label}: {value}"));
        }
        return out;
    }

    let last_col = widths.len() - 1;
    let bar = |width: usize| "─".repeat(width);

    let mut out: Vec<String> = body[..body.len() - 1].iter().map(|l| l.to_string()).collect();

    let mut seam = String::from("├");
    for (col, width) in widths.iter().enumerate() {
        if col > 0 {
            let edge_of_value = col == value_col || col == value_col + 1;
            seam.push(if edge_of_value { '┼' } else { '┴' });
        }
        seam.push_str(&bar(*width));
    }
    seam.push(if value_col == last_col { '┤' } else { '╯' });
    out.push(seam);

    for (idx, (label, value)) in rows.iter().enumerate() {
        if idx > 0 {
            out.push(format!("├{}┼{}┤", bar(label_width), bar(value_width)));
        }
        out.push(format!(
            "│ {:>lw$} │ {:>vw$} │",
            label,
            value,
            lw = label_width - 2,
            vw = value_width - 2
        ));
    }
    out.push(format!("╰{}┴{}╯", bar(label_width), bar(value_width)));

    out.join("\n")
}
