mod application;
mod payout;

pub use application::{Affiliate, ApplicationStatus};
pub use payout::{process_payouts, Commission, CommissionStatus, Payout};
