use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub league: League,
    pub billing: BillingSettings,
    #[serde(default)]
    pub plans: PlanSettings,
    #[serde(default)]
    pub affiliates: AffiliateSettings,
    #[serde(default)]
    pub api: ApiSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct League {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BillingSettings {
    pub number_format: String,
    pub currency: String,
    pub currency_symbol: String,
    pub due_days: u32,
    /// Percent, e.g. 8.25
    #[serde(default)]
    pub tax_rate: Decimal,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PlanSettings {
    /// Days a missed installment may stay unpaid before the plan defaults
    pub grace_days: u32,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self { grace_days: 15 }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AffiliateSettings {
    pub commission_rate: Decimal,
    pub minimum_payout: Decimal,
}

impl Default for AffiliateSettings {
    fn default() -> Self {
        Self {
            commission_rate: Decimal::TEN,
            minimum_payout: Decimal::from(50),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ApiSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}
