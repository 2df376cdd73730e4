pub mod affiliate;
pub mod config;
pub mod error;
pub mod invoice;
pub mod logging;
pub mod money;
pub mod plan;
pub mod remote;

pub use config::{Config, State};
pub use error::{BillingError, Result};
pub use invoice::{Invoice, InvoiceBuilder, InvoiceStatus};
pub use plan::{PaymentPlan, PlanStatus};
