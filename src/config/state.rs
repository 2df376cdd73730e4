use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::affiliate::Affiliate;
use crate::error::{BillingError, Result};
use crate::invoice::{format_invoice_number, Invoice};
use crate::plan::PaymentPlan;

/// Everything the league has billed, persisted as state.toml
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub plans: Vec<PaymentPlan>,
    #[serde(default)]
    pub affiliates: Vec<Affiliate>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
    #[serde(default)]
    pub last_plan: u32,
    #[serde(default)]
    pub last_transaction: u32,
    #[serde(default)]
    pub last_affiliate: u32,
    #[serde(default)]
    pub last_commission: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: chrono::Utc::now().year() as u32,
            last_plan: 0,
            last_transaction: 0,
            last_affiliate: 0,
            last_commission: 0,
        }
    }
}

impl State {
    /// Sequence the next invoice number would get, without claiming it.
    /// Only formats that include `{year}` restart at 1 in a new year, and
    /// numbers already on record are skipped.
    pub fn peek_invoice_seq(&self, format: &str, year: u32) -> u32 {
        let mut seq = if self.counter.last_year == year || !format.contains("{year}") {
            self.counter.last_number + 1
        } else {
            1
        };
        while self.has_invoice(&format_invoice_number(format, year, seq)) {
            seq += 1;
        }
        seq
    }

    pub fn next_invoice_number(&mut self, format: &str, year: u32) -> String {
        let seq = self.peek_invoice_seq(format, year);
        self.counter.last_number = seq;
        self.counter.last_year = year;
        format_invoice_number(format, year, seq)
    }

    pub fn next_plan_id(&mut self) -> u32 {
        self.counter.last_plan += 1;
        self.counter.last_plan
    }

    /// Reserve `count` consecutive transaction ids and return the first.
    pub fn reserve_transaction_ids(&mut self, count: u32) -> u32 {
        let first = self.counter.last_transaction + 1;
        self.counter.last_transaction += count;
        first
    }

    pub fn next_affiliate_id(&mut self) -> u32 {
        self.counter.last_affiliate += 1;
        self.counter.last_affiliate
    }

    pub fn next_commission_id(&mut self) -> u32 {
        self.counter.last_commission += 1;
        self.counter.last_commission
    }

    /// Resolve an invoice reference to the actual invoice number.
    /// Accepts either an index (1-based, newest first) or the full number.
    pub fn resolve_invoice(&self, reference: &str) -> Result<String> {
        if let Ok(idx) = reference.parse::<usize>() {
            if idx == 0 || idx > self.invoices.len() {
                return Err(BillingError::InvalidInvoiceIndex(reference.to_string()));
            }
            return Ok(self.invoices[self.invoices.len() - idx].number.clone());
        }

        if self.has_invoice(reference) {
            Ok(reference.to_string())
        } else {
            Err(BillingError::InvoiceNotFound(reference.to_string()))
        }
    }

    fn has_invoice(&self, number: &str) -> bool {
        self.invoices.iter().any(|i| i.number == number)
    }

    pub fn invoice(&self, number: &str) -> Result<&Invoice> {
        self.invoices
            .iter()
            .find(|i| i.number == number)
            .ok_or_else(|| BillingError::InvoiceNotFound(number.to_string()))
    }

    pub fn invoice_mut(&mut self, number: &str) -> Result<&mut Invoice> {
        self.invoices
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(|| BillingError::InvoiceNotFound(number.to_string()))
    }

    /// Delete a draft invoice. Anything already sent stays on record.
    pub fn delete_invoice(&mut self, number: &str) -> Result<Invoice> {
        let idx = self
            .invoices
            .iter()
            .position(|i| i.number == number)
            .ok_or_else(|| BillingError::InvoiceNotFound(number.to_string()))?;
        let invoice = &self.invoices[idx];
        if !invoice.is_deletable() {
            return Err(BillingError::InvoiceNotDeletable {
                number: invoice.number.clone(),
                status: invoice.status,
            });
        }
        Ok(self.invoices.remove(idx))
    }

    /// Move every sent invoice past its due date to overdue.
    pub fn refresh_overdue(&mut self, today: NaiveDate) -> usize {
        self.invoices
            .iter_mut()
            .map(|i| i.refresh_overdue(today))
            .filter(|changed| *changed)
            .count()
    }

    pub fn plan(&self, id: u32) -> Result<&PaymentPlan> {
        self.plans
            .iter()
            .find(|p| p.id == id)
            .ok_or(BillingError::PlanNotFound(id))
    }

    pub fn plan_mut(&mut self, id: u32) -> Result<&mut PaymentPlan> {
        self.plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BillingError::PlanNotFound(id))
    }

    /// The plan owning a transaction id
    pub fn plan_for_transaction_mut(&mut self, txn_id: u32) -> Result<&mut PaymentPlan> {
        self.plans
            .iter_mut()
            .find(|p| p.transaction(txn_id).is_some())
            .ok_or(BillingError::TransactionNotFound(txn_id))
    }

    /// Default every active plan with an installment past the grace period.
    /// Returns the ids of plans that changed.
    pub fn assess_defaults(&mut self, today: NaiveDate, grace_days: u32) -> Vec<u32> {
        self.plans
            .iter_mut()
            .filter_map(|p| p.assess_default(today, grace_days).then_some(p.id))
            .collect()
    }

    pub fn affiliate_mut(&mut self, id: u32) -> Result<&mut Affiliate> {
        self.affiliates
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(BillingError::AffiliateNotFound(id))
    }
}
