use std::fmt;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::{compute_installment, generate_schedule, Frequency};
use crate::error::{BillingError, Result};
use crate::money::has_sub_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Completed,
    Cancelled,
    Defaulted,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
            PlanStatus::Defaulted => "defaulted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Paid,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => f.write_str("pending"),
            TransactionStatus::Paid => f.write_str("paid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlanTransaction {
    pub id: u32,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
}

impl PaymentPlanTransaction {
    pub fn is_paid(&self) -> bool {
        self.status == TransactionStatus::Paid
    }
}

/// Parameters for a new plan, checked by [`PaymentPlan::new`].
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub member: String,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub num_installments: u32,
    pub frequency: Frequency,
    pub first_payment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub id: u32,
    pub member: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub num_installments: u32,
    pub frequency: Frequency,
    pub first_payment_date: NaiveDate,
    pub installment_amount: Decimal,
    pub payments_made: u32,
    pub status: PlanStatus,
    pub transactions: Vec<PaymentPlanTransaction>,
}

impl PaymentPlan {
    /// Build a plan with its full schedule. Transaction ids are assigned
    /// sequentially starting at `first_transaction_id`.
    pub fn new(id: u32, first_transaction_id: u32, params: NewPlan) -> Result<Self> {
        if params.total_amount <= Decimal::ZERO {
            return Err(BillingError::InvalidPlanTotal(params.total_amount));
        }
        if has_sub_cents(params.total_amount) {
            return Err(BillingError::SubCentAmount(params.total_amount));
        }
        let installment_amount = compute_installment(params.total_amount, params.num_installments)?;
        let transactions = generate_schedule(
            params.total_amount,
            params.num_installments,
            params.frequency,
            params.first_payment_date,
        )?
        .into_iter()
        .zip(first_transaction_id..)
        .map(|(slot, txn_id)| PaymentPlanTransaction {
            id: txn_id,
            installment_number: slot.installment_number,
            due_date: slot.due_date,
            amount: slot.amount,
            status: TransactionStatus::Pending,
            paid_date: None,
        })
        .collect();

        Ok(Self {
            id,
            member: params.member,
            description: params.description,
            total_amount: params.total_amount,
            num_installments: params.num_installments,
            frequency: params.frequency,
            first_payment_date: params.first_payment_date,
            installment_amount,
            payments_made: 0,
            status: PlanStatus::Active,
            transactions,
        })
    }

    pub fn transaction(&self, txn_id: u32) -> Option<&PaymentPlanTransaction> {
        self.transactions.iter().find(|t| t.id == txn_id)
    }

    pub fn next_due(&self) -> Option<&PaymentPlanTransaction> {
        self.transactions.iter().find(|t| !t.is_paid())
    }

    pub fn amount_paid(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_paid())
            .map(|t| t.amount)
            .sum()
    }

    pub fn remaining_balance(&self) -> Decimal {
        self.total_amount - self.amount_paid()
    }

    /// Mark one installment paid. Paying an installment that is already paid
    /// is a no-op and returns `false`; `payments_made` is counted once.
    pub fn mark_transaction_paid(&mut self, txn_id: u32, date: NaiveDate) -> Result<bool> {
        if matches!(self.status, PlanStatus::Cancelled | PlanStatus::Completed) {
            let already_paid = self.transaction(txn_id).map(|t| t.is_paid());
            return match already_paid {
                Some(true) => Ok(false),
                Some(false) => Err(BillingError::PlanClosed {
                    id: self.id,
                    status: self.status,
                }),
                None => Err(BillingError::TransactionNotFound(txn_id)),
            };
        }

        let txn = self
            .transactions
            .iter_mut()
            .find(|t| t.id == txn_id)
            .ok_or(BillingError::TransactionNotFound(txn_id))?;

        if txn.is_paid() {
            tracing::debug!(plan = self.id, txn = txn_id, "installment already paid");
            return Ok(false);
        }

        txn.status = TransactionStatus::Paid;
        txn.paid_date = Some(date);
        self.payments_made = (self.payments_made + 1).min(self.num_installments);
        tracing::info!(
            plan = self.id,
            txn = txn_id,
            payments_made = self.payments_made,
            "installment paid"
        );

        if self.payments_made == self.num_installments {
            tracing::info!(plan = self.id, from = %self.status, "payment plan completed");
            self.status = PlanStatus::Completed;
        }
        Ok(true)
    }

    /// Flag an active plan as defaulted when any pending installment is more
    /// than `grace_days` past due. Returns whether the status changed.
    /// A grace period reaching past the calendar's end never expires.
    pub fn assess_default(&mut self, today: NaiveDate, grace_days: u32) -> bool {
        if self.status != PlanStatus::Active {
            return false;
        }
        let grace = Duration::days(grace_days as i64);
        let missed = self
            .transactions
            .iter()
            .find(|t| {
                !t.is_paid()
                    && t.due_date
                        .checked_add_signed(grace)
                        .is_some_and(|deadline| deadline < today)
            });

        match missed {
            Some(txn) => {
                tracing::warn!(
                    plan = self.id,
                    installment = txn.installment_number,
                    due = %txn.due_date,
                    "payment plan defaulted"
                );
                self.status = PlanStatus::Defaulted;
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) -> Result<()> {
        match self.status {
            PlanStatus::Active | PlanStatus::Defaulted => {
                tracing::info!(plan = self.id, from = %self.status, "payment plan cancelled");
                self.status = PlanStatus::Cancelled;
                Ok(())
            }
            from => Err(BillingError::PlanTransition {
                from,
                to: PlanStatus::Cancelled,
            }),
        }
    }
}
