use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};
use crate::money::truncate_cents;

pub const MIN_INSTALLMENTS: u32 = 2;
pub const MAX_INSTALLMENTS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Frequency {
    /// Due date of the installment at `offset` (0-based). Monthly dates are
    /// anchored to the first date and clamped to the end of shorter months.
    pub fn due_date(self, first: NaiveDate, offset: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => first.checked_add_signed(Duration::weeks(offset as i64)),
            Frequency::BiWeekly => first.checked_add_signed(Duration::weeks(2 * offset as i64)),
            Frequency::Monthly => first.checked_add_months(Months::new(offset)),
        }
    }
}

impl FromStr for Frequency {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "bi-weekly" | "biweekly" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(BillingError::InvalidFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

pub fn check_installment_count(count: u32) -> Result<()> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&count) {
        return Err(BillingError::InstallmentCount {
            got: count,
            min: MIN_INSTALLMENTS,
            max: MAX_INSTALLMENTS,
        });
    }
    Ok(())
}

/// Regular installment amount: `total / count`, truncated to cents.
pub fn compute_installment(total: Decimal, count: u32) -> Result<Decimal> {
    check_installment_count(count)?;
    Ok(truncate_cents(total / Decimal::from(count)))
}

/// Every installment amount in order. The cents lost to truncation are
/// added to the final installment, so the amounts sum to `total` exactly.
pub fn split_installments(total: Decimal, count: u32) -> Result<Vec<Decimal>> {
    let regular = compute_installment(total, count)?;
    let mut amounts = vec![regular; count as usize];
    let last = total - regular * Decimal::from(count - 1);
    if let Some(slot) = amounts.last_mut() {
        *slot = last;
    }
    Ok(amounts)
}

/// One entry in a generated schedule, before it is attached to a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

pub fn generate_schedule(
    total: Decimal,
    count: u32,
    frequency: Frequency,
    first_payment_date: NaiveDate,
) -> Result<Vec<ScheduledInstallment>> {
    let amounts = split_installments(total, count)?;
    amounts
        .into_iter()
        .enumerate()
        .map(|(idx, amount)| {
            let offset = idx as u32;
            let due_date = frequency
                .due_date(first_payment_date, offset)
                .ok_or_else(|| BillingError::InvalidDate(first_payment_date.to_string()))?;
            Ok(ScheduledInstallment {
                installment_number: offset + 1,
                due_date,
                amount,
            })
        })
        .collect()
}
