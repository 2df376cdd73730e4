use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payout::{Commission, CommissionStatus};
use crate::error::{BillingError, Result};
use crate::money::percent_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// A referral partner. Starts as a pending application; once approved or
/// rejected the decision is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affiliate {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub commission_rate: Decimal,
    pub status: ApplicationStatus,
    pub applied_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub commissions: Vec<Commission>,
}

impl Affiliate {
    pub fn apply(
        id: u32,
        name: impl Into<String>,
        email: impl Into<String>,
        commission_rate: Decimal,
        applied_on: NaiveDate,
    ) -> Result<Self> {
        if commission_rate < Decimal::ZERO || commission_rate > Decimal::ONE_HUNDRED {
            return Err(BillingError::InvalidCommissionRate(commission_rate));
        }
        Ok(Self {
            id,
            name: name.into(),
            email: email.into(),
            commission_rate,
            status: ApplicationStatus::Pending,
            applied_on,
            decided_on: None,
            rejection_reason: None,
            commissions: Vec::new(),
        })
    }

    fn decide(&mut self, to: ApplicationStatus, date: NaiveDate) -> Result<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(BillingError::ApplicationTransition {
                from: self.status,
                to,
            });
        }
        tracing::info!(affiliate = self.id, to = %to, "affiliate application decided");
        self.status = to;
        self.decided_on = Some(date);
        Ok(())
    }

    pub fn approve(&mut self, date: NaiveDate) -> Result<()> {
        self.decide(ApplicationStatus::Approved, date)
    }

    pub fn reject(&mut self, reason: Option<String>, date: NaiveDate) -> Result<()> {
        self.decide(ApplicationStatus::Rejected, date)?;
        self.rejection_reason = reason.filter(|r| !r.trim().is_empty());
        Ok(())
    }

    /// Accrue commission on a sale or registration referred by this affiliate.
    pub fn record_commission(
        &mut self,
        id: u32,
        reference: impl Into<String>,
        sale_amount: Decimal,
        date: NaiveDate,
    ) -> Result<&Commission> {
        if self.status != ApplicationStatus::Approved {
            return Err(BillingError::AffiliateNotApproved {
                id: self.id,
                status: self.status,
            });
        }
        if sale_amount <= Decimal::ZERO {
            return Err(BillingError::InvalidSaleAmount(sale_amount));
        }

        let amount = percent_of(sale_amount, self.commission_rate)?;
        self.commissions.push(Commission {
            id,
            reference: reference.into(),
            sale_amount,
            rate: self.commission_rate,
            amount,
            earned_on: date,
            status: CommissionStatus::Pending,
            paid_on: None,
        });
        tracing::info!(affiliate = self.id, commission = id, %amount, "commission recorded");

        let last = self.commissions.len() - 1;
        Ok(&self.commissions[last])
    }

    pub fn pending_balance(&self) -> Decimal {
        self.commissions
            .iter()
            .filter(|c| c.status == CommissionStatus::Pending)
            .map(|c| c.amount)
            .sum()
    }

    pub fn total_paid(&self) -> Decimal {
        self.commissions
            .iter()
            .filter(|c| c.status == CommissionStatus::Paid)
            .map(|c| c.amount)
            .sum()
    }
}
