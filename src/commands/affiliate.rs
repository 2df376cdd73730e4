use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use league::affiliate::{process_payouts, Affiliate};
use league::config::{ensure_initialized, load_config, load_state, save_state};
use league::error::Result;
use league::money::{format_money, parse_amount};

use super::parse_date_or_today;
use crate::AffiliateCommand;

#[derive(Tabled)]
struct AffiliateRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PENDING")]
    pending: String,
    #[tabled(rename = "PAID OUT")]
    paid: String,
}

pub fn run(cfg_dir: &Path, command: AffiliateCommand) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    match command {
        AffiliateCommand::Apply { name, email, rate } => cmd_apply(cfg_dir, &name, &email, rate),
        AffiliateCommand::List => cmd_list(cfg_dir),
        AffiliateCommand::Approve { id } => cmd_approve(cfg_dir, id),
        AffiliateCommand::Reject { id, reason } => cmd_reject(cfg_dir, id, reason),
        AffiliateCommand::Commission {
            id,
            amount,
            reference,
            date,
        } => cmd_commission(cfg_dir, id, &amount, &reference, date),
        AffiliateCommand::Payouts { date } => cmd_payouts(cfg_dir, date),
    }
}

fn cmd_apply(cfg_dir: &Path, name: &str, email: &str, rate: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let rate = match rate {
        Some(r) => parse_amount(&r)?,
        None => config.affiliates.commission_rate,
    };
    let today = chrono::Local::now().date_naive();
    let affiliate = Affiliate::apply(state.counter.last_affiliate + 1, name, email, rate, today)?;
    state.next_affiliate_id();

    println!(
        "Recorded application {} for {} ({}% commission, pending review)",
        affiliate.id,
        affiliate.name,
        affiliate.commission_rate.normalize()
    );
    state.affiliates.push(affiliate);
    save_state(cfg_dir, &state)?;
    Ok(())
}

fn cmd_list(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.affiliates.is_empty() {
        println!("No affiliate applications yet.");
        return Ok(());
    }

    let symbol = &config.billing.currency_symbol;
    let rows: Vec<AffiliateRow> = state
        .affiliates
        .iter()
        .map(|a| AffiliateRow {
            id: a.id,
            name: a.name.clone(),
            email: a.email.clone(),
            rate: format!("{}%", a.commission_rate.normalize()),
            status: a.status.to_string().to_uppercase(),
            pending: format_money(a.pending_balance(), symbol),
            paid: format_money(a.total_paid(), symbol),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

fn cmd_approve(cfg_dir: &Path, id: u32) -> Result<()> {
    let mut state = load_state(cfg_dir)?;
    let today = chrono::Local::now().date_naive();
    state.affiliate_mut(id)?.approve(today)?;
    save_state(cfg_dir, &state)?;

    println!("Approved affiliate {}", id);
    Ok(())
}

fn cmd_reject(cfg_dir: &Path, id: u32, reason: Option<String>) -> Result<()> {
    let mut state = load_state(cfg_dir)?;
    let today = chrono::Local::now().date_naive();
    state.affiliate_mut(id)?.reject(reason.clone(), today)?;
    save_state(cfg_dir, &state)?;

    match reason {
        Some(r) => println!("Rejected affiliate {}: {}", id, r),
        None => println!("Rejected affiliate {}", id),
    }
    Ok(())
}

fn cmd_commission(
    cfg_dir: &Path,
    id: u32,
    amount: &str,
    reference: &str,
    date: Option<String>,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let sale_amount = parse_amount(amount)?;
    let date = parse_date_or_today(date.as_deref())?;

    let commission_id = state.counter.last_commission + 1;
    let commission = state
        .affiliate_mut(id)?
        .record_commission(commission_id, reference, sale_amount, date)?
        .amount;
    state.next_commission_id();
    save_state(cfg_dir, &state)?;

    println!(
        "Recorded {} commission for affiliate {} on {}",
        format_money(commission, &config.billing.currency_symbol),
        id,
        reference
    );
    Ok(())
}

fn cmd_payouts(cfg_dir: &Path, date: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let date = parse_date_or_today(date.as_deref())?;
    let symbol = &config.billing.currency_symbol;

    let payouts = process_payouts(&mut state.affiliates, config.affiliates.minimum_payout, date);
    if payouts.is_empty() {
        println!(
            "No affiliate balances at or above the {} minimum",
            format_money(config.affiliates.minimum_payout, symbol)
        );
        return Ok(());
    }

    save_state(cfg_dir, &state)?;
    for payout in &payouts {
        println!(
            "Paid {} to {} (affiliate {}, {} commission(s))",
            format_money(payout.amount, symbol),
            payout.name,
            payout.affiliate_id,
            payout.commission_count
        );
    }
    Ok(())
}
