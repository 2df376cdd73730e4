use std::path::PathBuf;
use thiserror::Error;

use rust_decimal::Decimal;

use crate::affiliate::ApplicationStatus;
use crate::invoice::InvoiceStatus;
use crate::plan::PlanStatus;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Config directory not found at {0}. Run 'league init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write state file: {0}")]
    StateWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid item format '{0}'. Expected 'name:amount[:quantity]' (e.g., 'Spring registration:150:2')")]
    InvalidItemFormat(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Amount '{0}' is larger than 1,000,000,000,000")]
    AmountTooLarge(String),

    #[error("Amount {0} has fractions of a cent; use at most two decimal places")]
    SubCentAmount(Decimal),

    #[error("Amount is too large to compute")]
    AmountOverflow,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("No items specified. Use --item <name>:<amount>[:<quantity>] to add line items.")]
    NoItems,

    #[error("Item {index} has a negative amount ({amount})")]
    NegativeAmount { index: usize, amount: Decimal },

    #[error("Item {index} has quantity {quantity}; quantity must be at least 1")]
    InvalidQuantity { index: usize, quantity: i64 },

    #[error("Tax rate must not be negative (got {0})")]
    NegativeTaxRate(Decimal),

    #[error("Due date {due} is before issue date {issued}")]
    DueBeforeIssue {
        issued: chrono::NaiveDate,
        due: chrono::NaiveDate,
    },

    #[error("Cannot remove the last remaining invoice item")]
    LastInvoiceItem,

    #[error("No invoice item at index {index} (invoice has {count} item(s))")]
    ItemIndex { index: usize, count: usize },

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'league invoice list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Invalid status '{0}'. Use draft, sent, paid, overdue, or cancelled.")]
    InvalidStatus(String),

    #[error("Invoice cannot move from {from} to {to}")]
    InvoiceTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    #[error("Invoice '{number}' is {status} and can no longer be deleted")]
    InvoiceNotDeletable {
        number: String,
        status: InvoiceStatus,
    },

    #[error("A payment plan needs between {min} and {max} installments (got {got})")]
    InstallmentCount { got: u32, min: u32, max: u32 },

    #[error("Payment plan total must be greater than zero (got {0})")]
    InvalidPlanTotal(Decimal),

    #[error("Unknown payment frequency '{0}'. Use 'weekly', 'bi-weekly', or 'monthly'.")]
    InvalidFrequency(String),

    #[error("Payment plan {0} not found")]
    PlanNotFound(u32),

    #[error("Payment plan transaction {0} not found")]
    TransactionNotFound(u32),

    #[error("Payment plan cannot move from {from} to {to}")]
    PlanTransition { from: PlanStatus, to: PlanStatus },

    #[error("Payment plan {id} is {status} and does not accept payments")]
    PlanClosed { id: u32, status: PlanStatus },

    #[error("Affiliate {0} not found")]
    AffiliateNotFound(u32),

    #[error("Affiliate application cannot move from {from} to {to}")]
    ApplicationTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Affiliate {id} is {status}; commissions require an approved affiliate")]
    AffiliateNotApproved { id: u32, status: ApplicationStatus },

    #[error("Commission rate must be between 0 and 100 (got {0})")]
    InvalidCommissionRate(Decimal),

    #[error("Sale amount must be greater than zero (got {0})")]
    InvalidSaleAmount(Decimal),

    #[error("No API base URL configured. Set [api] base_url in config.toml.")]
    ApiNotConfigured,

    #[error("No API token available. Set [api] token in config.toml or LEAGUE_API_TOKEN.")]
    MissingToken,

    #[error("{0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, BillingError>;
