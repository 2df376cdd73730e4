use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use league::config::{ensure_initialized, load_config, load_state, save_state};
use league::error::Result;
use league::money::{format_money, parse_amount};
use league::plan::{Frequency, NewPlan, PaymentPlan};

use super::{add_summary_footer, parse_date_or_today};
use crate::PlanCommand;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "MEMBER")]
    member: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "INSTALLMENT")]
    installment: String,
    #[tabled(rename = "PAID")]
    progress: String,
    #[tabled(rename = "NEXT DUE")]
    next_due: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "TXN")]
    id: u32,
    #[tabled(rename = "#")]
    installment: u32,
    #[tabled(rename = "DUE")]
    due_date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PAID ON")]
    paid_date: String,
}

pub fn run(cfg_dir: &Path, command: PlanCommand) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    match command {
        PlanCommand::Create {
            member,
            total,
            installments,
            frequency,
            first_date,
            description,
        } => cmd_create(
            cfg_dir,
            member,
            &total,
            installments,
            &frequency,
            first_date,
            description,
        ),
        PlanCommand::List => cmd_list(cfg_dir),
        PlanCommand::Show { id, json } => cmd_show(cfg_dir, id, json),
        PlanCommand::Pay { transaction, date } => cmd_pay(cfg_dir, transaction, date),
        PlanCommand::Cancel { id } => cmd_cancel(cfg_dir, id),
        PlanCommand::Assess { date } => cmd_assess(cfg_dir, date),
    }
}

fn cmd_create(
    cfg_dir: &Path,
    member: String,
    total: &str,
    installments: u32,
    frequency: &str,
    first_date: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let params = NewPlan {
        member,
        description,
        total_amount: parse_amount(total)?,
        num_installments: installments,
        frequency: frequency.parse::<Frequency>()?,
        first_payment_date: parse_date_or_today(first_date.as_deref())?,
    };

    // Ids are only claimed once the plan validates
    let plan = PaymentPlan::new(
        state.counter.last_plan + 1,
        state.counter.last_transaction + 1,
        params,
    )?;
    state.next_plan_id();
    state.reserve_transaction_ids(plan.num_installments);

    let symbol = &config.billing.currency_symbol;
    println!("Created payment plan {} for {}", plan.id, plan.member);
    println!(
        "  {} {} installments of {} starting {}",
        plan.num_installments,
        plan.frequency,
        format_money(plan.installment_amount, symbol),
        plan.first_payment_date
    );
    if let Some(last) = plan.transactions.last() {
        if last.amount != plan.installment_amount {
            println!("  Final installment: {}", format_money(last.amount, symbol));
        }
    }

    tracing::info!(plan = plan.id, total = %plan.total_amount, "payment plan created");
    state.plans.push(plan);
    save_state(cfg_dir, &state)?;

    Ok(())
}

fn cmd_list(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.plans.is_empty() {
        println!("No payment plans yet.");
        return Ok(());
    }

    let symbol = &config.billing.currency_symbol;
    let rows: Vec<PlanRow> = state
        .plans
        .iter()
        .map(|plan| PlanRow {
            id: plan.id,
            member: plan.member.clone(),
            total: format_money(plan.total_amount, symbol),
            installment: format!(
                "{} {}",
                format_money(plan.installment_amount, symbol),
                plan.frequency
            ),
            progress: format!("{}/{}", plan.payments_made, plan.num_installments),
            next_due: plan
                .next_due()
                .map(|t| t.due_date.to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: plan.status.to_string().to_uppercase(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

fn cmd_show(cfg_dir: &Path, id: u32, json: bool) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let plan = state.plan(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    let symbol = &config.billing.currency_symbol;
    println!("Payment plan {} for {} ({})", plan.id, plan.member, plan.status);
    if let Some(description) = &plan.description {
        println!("  {}", description);
    }

    let rows: Vec<TransactionRow> = plan
        .transactions
        .iter()
        .map(|t| TransactionRow {
            id: t.id,
            installment: t.installment_number,
            due_date: t.due_date.to_string(),
            amount: format_money(t.amount, symbol),
            status: t.status.to_string().to_uppercase(),
            paid_date: t.paid_date.map(|d| d.to_string()).unwrap_or_default(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_summary_footer(
        &table,
        3,
        &[
            ("TOTAL", format_money(plan.total_amount, symbol)),
            ("(-) PAID", format_money(plan.amount_paid(), symbol)),
            ("(=) REMAINING", format_money(plan.remaining_balance(), symbol)),
        ],
    );
    println!("{table}");
    Ok(())
}

fn cmd_pay(cfg_dir: &Path, txn_id: u32, date: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let date = parse_date_or_today(date.as_deref())?;

    let plan = state.plan_for_transaction_mut(txn_id)?;
    let recorded = plan.mark_transaction_paid(txn_id, date)?;
    let summary = format!(
        "plan {}: {}/{} paid, {} remaining ({})",
        plan.id,
        plan.payments_made,
        plan.num_installments,
        format_money(plan.remaining_balance(), &config.billing.currency_symbol),
        plan.status
    );

    if !recorded {
        println!("Transaction {} was already paid; nothing recorded", txn_id);
        println!("  {}", summary);
        return Ok(());
    }

    save_state(cfg_dir, &state)?;
    println!("Recorded payment for transaction {}", txn_id);
    println!("  {}", summary);
    Ok(())
}

fn cmd_cancel(cfg_dir: &Path, id: u32) -> Result<()> {
    let mut state = load_state(cfg_dir)?;
    state.plan_mut(id)?.cancel()?;
    save_state(cfg_dir, &state)?;

    println!("Cancelled payment plan {}", id);
    Ok(())
}

fn cmd_assess(cfg_dir: &Path, date: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let today = parse_date_or_today(date.as_deref())?;

    let defaulted = state.assess_defaults(today, config.plans.grace_days);
    if defaulted.is_empty() {
        println!(
            "No plans past the {}-day grace period as of {}",
            config.plans.grace_days, today
        );
        return Ok(());
    }

    save_state(cfg_dir, &state)?;
    for id in &defaulted {
        let plan = state.plan(*id)?;
        println!("Plan {} ({}) is now defaulted", plan.id, plan.member);
    }
    Ok(())
}
