use chrono::{Datelike, Duration};
use rust_decimal::Decimal;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use league::config::{ensure_initialized, load_config, load_state, save_state, State};
use league::error::{BillingError, Result};
use league::invoice::{InvoiceBuilder, InvoiceStatus, ItemField};
use league::money::{format_money, parse_amount};

use super::{add_summary_footer, format_whole_money, parse_date, parse_date_or_today};
use crate::InvoiceCommand;

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "ISSUED")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "BILL TO")]
    bill_to: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ITEM")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "LINE TOTAL")]
    line_total: String,
}

pub fn run(cfg_dir: &Path, command: InvoiceCommand) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    match command {
        InvoiceCommand::Create {
            bill_to,
            item,
            tax,
            issued,
            due,
            notes,
            send,
        } => cmd_create(cfg_dir, &bill_to, &item, tax, issued, due, notes, send),
        InvoiceCommand::List { status, limit } => cmd_list(cfg_dir, status, limit),
        InvoiceCommand::Show { invoice, json } => cmd_show(cfg_dir, &invoice, json),
        InvoiceCommand::Send { invoice } => cmd_transition(cfg_dir, &invoice, InvoiceStatus::Sent, None),
        InvoiceCommand::Pay { invoice, date } => {
            cmd_transition(cfg_dir, &invoice, InvoiceStatus::Paid, date)
        }
        InvoiceCommand::Cancel { invoice } => {
            cmd_transition(cfg_dir, &invoice, InvoiceStatus::Cancelled, None)
        }
        InvoiceCommand::Delete { invoice } => cmd_delete(cfg_dir, &invoice),
    }
}

/// Parse item input like "Spring registration:150:2" into (name, amount, quantity)
fn parse_item_input(input: &str) -> Result<(&str, &str, &str)> {
    let parts: Vec<&str> = input.split(':').collect();
    let (name, amount, qty) = match parts.as_slice() {
        [name, amount] => (*name, *amount, "1"),
        [name, amount, qty] => (*name, *amount, *qty),
        _ => return Err(BillingError::InvalidItemFormat(input.to_string())),
    };

    if name.trim().is_empty() || qty.trim().parse::<i64>().is_err() {
        return Err(BillingError::InvalidItemFormat(input.to_string()));
    }
    parse_amount(amount)?;

    Ok((name, amount, qty))
}

#[allow(clippy::too_many_arguments)]
fn cmd_create(
    cfg_dir: &Path,
    bill_to: &str,
    items_input: &[String],
    tax: Option<String>,
    issued: Option<String>,
    due: Option<String>,
    notes: Option<String>,
    send: bool,
) -> Result<()> {
    if items_input.is_empty() {
        return Err(BillingError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let mut builder = InvoiceBuilder::new();
    for (idx, input) in items_input.iter().enumerate() {
        let (name, amount, qty) = parse_item_input(input)?;
        let slot = if idx == 0 { 0 } else { builder.add_item() };
        builder.set_item_field(slot, ItemField::Name, name)?;
        builder.set_item_field(slot, ItemField::Amount, amount)?;
        builder.set_item_field(slot, ItemField::Quantity, qty)?;
    }

    let tax_rate = match tax {
        Some(t) => parse_amount(&t)?,
        None => config.billing.tax_rate,
    };
    builder.set_tax_rate(tax_rate);

    let issue_date = parse_date_or_today(issued.as_deref())?;
    let due_date = match due {
        Some(d) => parse_date(&d)?,
        None => issue_date
            .checked_add_signed(Duration::days(config.billing.due_days as i64))
            .ok_or_else(|| {
                BillingError::InvalidDate(format!("{issue_date} + {} days", config.billing.due_days))
            })?,
    };

    // Validate before claiming an invoice number
    builder.build("", bill_to, issue_date, due_date, notes.clone())?;

    let year = issue_date.year() as u32;
    let number = state.next_invoice_number(&config.billing.number_format, year);
    let mut invoice = builder.build(number.clone(), bill_to, issue_date, due_date, notes)?;
    if send {
        invoice.send()?;
    }

    let symbol = &config.billing.currency_symbol;
    println!("Created {} ({})", number, invoice.status);
    println!("  Bill to:  {}", invoice.bill_to);
    println!("  Subtotal: {}", format_money(invoice.subtotal, symbol));
    println!(
        "  Tax:      {} ({}%)",
        format_money(invoice.tax_amount, symbol),
        invoice.tax_rate.normalize()
    );
    println!("  Total:    {}", format_money(invoice.total, symbol));
    println!("  Due:      {}", invoice.due_date);

    tracing::info!(invoice = %number, total = %invoice.total, "invoice created");
    state.invoices.push(invoice);
    save_state(cfg_dir, &state)?;

    Ok(())
}

/// List invoices with a billed / paid / outstanding footer
fn cmd_list(cfg_dir: &Path, status: Option<String>, limit: Option<usize>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let status_filter = match status.as_deref() {
        Some(s) => Some(InvoiceStatus::parse(s).ok_or_else(|| BillingError::InvalidStatus(s.to_string()))?),
        None => None,
    };

    refresh_overdue(cfg_dir, &mut state)?;

    if state.invoices.is_empty() {
        println!("No invoices created yet.");
        return Ok(());
    }

    let invoices: Vec<_> = state
        .invoices
        .iter()
        .rev()
        .enumerate()
        .filter(|(_, i)| status_filter.map_or(true, |s| i.status == s))
        .collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    if invoices.is_empty() {
        println!("No invoices match the given filters.");
        return Ok(());
    }

    let symbol = &config.billing.currency_symbol;
    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, invoice)| InvoiceRow {
            index: idx + 1,
            number: invoice.number.clone(),
            date: invoice.issue_date.to_string(),
            total: format_whole_money(invoice.total, symbol),
            status: invoice.status.as_str().to_uppercase(),
            bill_to: invoice.bill_to.clone(),
        })
        .collect();

    // Drafts and cancelled invoices were never billed
    let billed: Decimal = invoices
        .iter()
        .filter(|(_, i)| !matches!(i.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled))
        .map(|(_, i)| i.total)
        .sum();
    let outstanding: Decimal = invoices.iter().map(|(_, i)| i.outstanding()).sum();
    let paid = billed - outstanding;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_summary_footer(
        &table,
        3,
        &[
            ("TOTAL", format_whole_money(billed, symbol)),
            ("(-) PAID", format_whole_money(paid, symbol)),
            ("(=) OUTSTANDING", format_whole_money(outstanding, symbol)),
        ],
    );

    println!("{table}");
    println!();
    println!("Total: {} invoices", state.invoices.len());
    println!("Use index number with show/send/pay/cancel/delete (e.g., 'league invoice show 1')");

    Ok(())
}

fn cmd_show(cfg_dir: &Path, reference: &str, json: bool) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    refresh_overdue(cfg_dir, &mut state)?;

    let number = state.resolve_invoice(reference)?;
    let invoice = state.invoice(&number)?;

    if json {
        println!("{}", serde_json::to_string_pretty(invoice)?);
        return Ok(());
    }

    let symbol = &config.billing.currency_symbol;
    println!("Invoice {} ({})", invoice.number, invoice.status);
    println!("  Bill to: {}", invoice.bill_to);
    println!("  Issued:  {}", invoice.issue_date);
    println!("  Due:     {}", invoice.due_date);
    if let Some(paid) = invoice.paid_date {
        println!("  Paid:    {}", paid);
    }

    let rows = invoice
        .items
        .iter()
        .map(|item| {
            Ok(ItemRow {
                name: item.name.clone(),
                description: item.description.clone().unwrap_or_default(),
                quantity: item.quantity,
                amount: format_money(item.amount, symbol),
                line_total: format_money(item.line_total()?, symbol),
            })
        })
        .collect::<Result<Vec<ItemRow>>>()?;
    println!("{}", Table::new(rows).with(Style::rounded()));

    println!("  Subtotal: {}", format_money(invoice.subtotal, symbol));
    println!(
        "  Tax:      {} ({}%)",
        format_money(invoice.tax_amount, symbol),
        invoice.tax_rate.normalize()
    );
    println!("  Total:    {}", format_money(invoice.total, symbol));
    if let Some(notes) = &invoice.notes {
        println!("  Notes:    {}", notes);
    }

    Ok(())
}

fn cmd_transition(
    cfg_dir: &Path,
    reference: &str,
    next: InvoiceStatus,
    date: Option<String>,
) -> Result<()> {
    let mut state = load_state(cfg_dir)?;
    let date = parse_date_or_today(date.as_deref())?;
    refresh_overdue(cfg_dir, &mut state)?;

    let number = state.resolve_invoice(reference)?;
    state.invoice_mut(&number)?.apply_status(next, date)?;
    save_state(cfg_dir, &state)?;

    println!("Marked {} as {}", number, next);
    Ok(())
}

fn cmd_delete(cfg_dir: &Path, reference: &str) -> Result<()> {
    let mut state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    state.delete_invoice(&number)?;
    save_state(cfg_dir, &state)?;

    println!("Deleted draft {}", number);
    Ok(())
}

/// Persist overdue transitions as soon as they are noticed
fn refresh_overdue(cfg_dir: &Path, state: &mut State) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    if state.refresh_overdue(today) > 0 {
        save_state(cfg_dir, state)?;
    }
    Ok(())
}
