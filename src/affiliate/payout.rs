use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::application::{Affiliate, ApplicationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: u32,
    /// Registration or order the commission was earned on
    pub reference: String,
    pub sale_amount: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub earned_on: NaiveDate,
    pub status: CommissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<NaiveDate>,
}

/// One affiliate's share of a payout run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payout {
    pub affiliate_id: u32,
    pub name: String,
    pub amount: Decimal,
    pub commission_count: usize,
}

/// Settle pending commissions for every approved affiliate whose balance
/// reaches `minimum`. Balances below the minimum roll over to the next run.
pub fn process_payouts(affiliates: &mut [Affiliate], minimum: Decimal, date: NaiveDate) -> Vec<Payout> {
    let mut payouts = Vec::new();

    for affiliate in affiliates
        .iter_mut()
        .filter(|a| a.status == ApplicationStatus::Approved)
    {
        let balance = affiliate.pending_balance();
        if balance.is_zero() || balance < minimum {
            tracing::debug!(affiliate = affiliate.id, %balance, "below payout minimum");
            continue;
        }

        let mut count = 0;
        for commission in affiliate
            .commissions
            .iter_mut()
            .filter(|c| c.status == CommissionStatus::Pending)
        {
            commission.status = CommissionStatus::Paid;
            commission.paid_on = Some(date);
            count += 1;
        }

        tracing::info!(affiliate = affiliate.id, amount = %balance, count, "affiliate paid out");
        payouts.push(Payout {
            affiliate_id: affiliate.id,
            name: affiliate.name.clone(),
            amount: balance,
            commission_count: count,
        });
    }

    payouts
}
