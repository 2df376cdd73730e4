use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

/// A validated line item on a built invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Decimal,
    pub quantity: u32,
}

impl InvoiceItem {
    pub fn line_total(&self) -> Result<Decimal> {
        self.amount
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(BillingError::AmountOverflow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Cancelled)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Cancelled)
                | (Overdue, Paid)
                | (Overdue, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted invoice. Totals are fixed at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub bill_to: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    fn transition(&mut self, next: InvoiceStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(BillingError::InvoiceTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::info!(invoice = %self.number, from = %self.status, to = %next, "invoice status changed");
        self.status = next;
        Ok(())
    }

    pub fn send(&mut self) -> Result<()> {
        self.transition(InvoiceStatus::Sent)
    }

    pub fn mark_paid(&mut self, date: NaiveDate) -> Result<()> {
        self.transition(InvoiceStatus::Paid)?;
        self.paid_date = Some(date);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(InvoiceStatus::Cancelled)
    }

    /// Move a sent invoice to overdue once its due date has passed.
    /// Returns whether the status changed.
    pub fn refresh_overdue(&mut self, today: NaiveDate) -> bool {
        if self.status == InvoiceStatus::Sent && self.due_date < today {
            self.status = InvoiceStatus::Overdue;
            tracing::info!(invoice = %self.number, due = %self.due_date, "invoice is overdue");
            true
        } else {
            false
        }
    }

    /// Apply a status by name, as the admin API's status endpoint does.
    pub fn apply_status(&mut self, next: InvoiceStatus, date: NaiveDate) -> Result<()> {
        match next {
            InvoiceStatus::Paid => self.mark_paid(date),
            other => self.transition(other),
        }
    }

    pub fn is_deletable(&self) -> bool {
        self.status == InvoiceStatus::Draft
    }

    pub fn outstanding(&self) -> Decimal {
        match self.status {
            InvoiceStatus::Sent | InvoiceStatus::Overdue => self.total,
            _ => Decimal::ZERO,
        }
    }
}
