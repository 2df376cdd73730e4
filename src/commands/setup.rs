use chrono::Datelike;
use rust_decimal::Decimal;
use std::path::Path;

use league::config::{ensure_initialized, init_config_dir, load_config, load_state};
use league::error::Result;
use league::invoice::{format_invoice_number, InvoiceStatus};
use league::money::format_money;
use league::plan::PlanStatus;

/// Initialize config directory with template files
pub fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized league config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your league details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Create your first invoice:");
    println!("     league invoice create --bill-to <member> --item <name>:<amount>[:<qty>]");

    Ok(())
}

/// Show billing summary
pub fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let symbol = &config.billing.currency_symbol;

    let current_year = chrono::Local::now().year() as u32;
    let next_number = format_invoice_number(
        &config.billing.number_format,
        current_year,
        state.peek_invoice_seq(&config.billing.number_format, current_year),
    );

    let open_invoices: Vec<_> = state
        .invoices
        .iter()
        .filter(|i| matches!(i.status, InvoiceStatus::Sent | InvoiceStatus::Overdue))
        .collect();
    let receivable: Decimal = open_invoices.iter().map(|i| i.outstanding()).sum();
    let active_plans = state
        .plans
        .iter()
        .filter(|p| p.status == PlanStatus::Active)
        .count();
    let plan_balance: Decimal = state
        .plans
        .iter()
        .filter(|p| matches!(p.status, PlanStatus::Active | PlanStatus::Defaulted))
        .map(|p| p.remaining_balance())
        .sum();
    let commissions_owed: Decimal = state.affiliates.iter().map(|a| a.pending_balance()).sum();

    println!("League Billing Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("League:           {}", config.league.name);
    println!("Next invoice:     {}", next_number);
    println!(
        "Open invoices:    {} ({} receivable)",
        open_invoices.len(),
        format_money(receivable, symbol)
    );
    println!(
        "Active plans:     {} ({} remaining)",
        active_plans,
        format_money(plan_balance, symbol)
    );
    println!(
        "Affiliates:       {} ({} commission owed)",
        state.affiliates.len(),
        format_money(commissions_owed, symbol)
    );

    if !state.invoices.is_empty() {
        println!();
        println!("Recent invoices:");
        for invoice in state.invoices.iter().rev().take(5) {
            println!(
                "  {} - {} - {} - {}",
                invoice.number,
                invoice.bill_to,
                format_money(invoice.total, symbol),
                invoice.status
            );
        }
    }

    Ok(())
}
