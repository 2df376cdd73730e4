use std::path::Path;

use league::config::{ensure_initialized, load_config, load_state};
use league::error::{BillingError, Result};
use league::invoice::InvoiceStatus;
use league::remote::{ApiClient, Session, TOKEN_ENV};

use crate::RemoteCommand;

pub fn run(cfg_dir: &Path, command: RemoteCommand) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let session = Session::from_settings(&config.api, std::env::var(TOKEN_ENV).ok())?;
    let client = ApiClient::new(session);

    let response = match command {
        RemoteCommand::Invoices => client.list_invoices()?,
        RemoteCommand::PushInvoice { invoice } => {
            let state = load_state(cfg_dir)?;
            let number = state.resolve_invoice(&invoice)?;
            client.create_invoice(state.invoice(&number)?)?
        }
        RemoteCommand::InvoiceStatus { id, status } => {
            let status = InvoiceStatus::parse(&status).ok_or(BillingError::InvalidStatus(status))?;
            client.update_invoice_status(&id, status)?
        }
        RemoteCommand::Plans => client.list_payment_plans()?,
        RemoteCommand::PushPlan { id } => {
            let state = load_state(cfg_dir)?;
            client.create_payment_plan(state.plan(id)?)?
        }
        RemoteCommand::Transactions { plan } => client.plan_transactions(plan)?,
        RemoteCommand::MarkPaid { transaction } => client.mark_transaction_paid(transaction)?,
        RemoteCommand::Applications => client.affiliate_applications()?,
        RemoteCommand::Approve { id } => client.approve_affiliate(id)?,
        RemoteCommand::Reject { id, reason } => client.reject_affiliate(id, reason.as_deref())?,
        RemoteCommand::Payouts => client.process_payouts()?,
    };

    if response.is_null() {
        println!("OK");
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}
