use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::lifecycle::{Invoice, InvoiceItem, InvoiceStatus};
use crate::error::{BillingError, Result};
use crate::money::{coerce_amount, has_sub_cents, percent_of};

/// Editable field of a draft line item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Description,
    Amount,
    Quantity,
}

/// A line item while the invoice is still being edited. Values are
/// whatever was typed (coerced to numbers) and are only validated by
/// [`InvoiceBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub name: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub quantity: i64,
}

impl Default for DraftItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            amount: Decimal::ZERO,
            quantity: 1,
        }
    }
}

impl DraftItem {
    pub fn line_total(&self) -> Result<Decimal> {
        self.amount
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(BillingError::AmountOverflow)
    }
}

/// Accumulates line items and a tax rate. Subtotal and total are derived
/// on every read, so they always agree with the current items. Reads fail
/// with [`BillingError::AmountOverflow`] instead of panicking on huge input.
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    items: Vec<DraftItem>,
    tax_rate: Decimal,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            items: vec![DraftItem::default()],
            tax_rate: Decimal::ZERO,
        }
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Append a zero-valued item and return its index.
    pub fn add_item(&mut self) -> usize {
        self.items.push(DraftItem::default());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> Result<DraftItem> {
        self.check_index(index)?;
        if self.items.len() == 1 {
            return Err(BillingError::LastInvoiceItem);
        }
        Ok(self.items.remove(index))
    }

    pub fn set_item_field(&mut self, index: usize, field: ItemField, value: &str) -> Result<()> {
        self.check_index(index)?;
        let item = &mut self.items[index];
        match field {
            ItemField::Name => item.name = value.to_string(),
            ItemField::Description => {
                let trimmed = value.trim();
                item.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            ItemField::Amount => item.amount = coerce_amount(value),
            ItemField::Quantity => item.quantity = value.trim().parse().unwrap_or(0),
        }
        Ok(())
    }

    pub fn set_tax_rate(&mut self, rate: Decimal) {
        self.tax_rate = rate;
    }

    pub fn subtotal(&self) -> Result<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.line_total()?)
                .ok_or(BillingError::AmountOverflow)
        })
    }

    pub fn tax_amount(&self) -> Result<Decimal> {
        percent_of(self.subtotal()?, self.tax_rate)
    }

    pub fn total(&self) -> Result<Decimal> {
        self.subtotal()?
            .checked_add(self.tax_amount()?)
            .ok_or(BillingError::AmountOverflow)
    }

    /// Validate the draft and produce an invoice in `draft` status.
    pub fn build(
        &self,
        number: impl Into<String>,
        bill_to: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Invoice> {
        if self.tax_rate.is_sign_negative() && !self.tax_rate.is_zero() {
            return Err(BillingError::NegativeTaxRate(self.tax_rate));
        }
        if due_date < issue_date {
            return Err(BillingError::DueBeforeIssue {
                issued: issue_date,
                due: due_date,
            });
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (idx, draft) in self.items.iter().enumerate() {
            if draft.amount < Decimal::ZERO {
                return Err(BillingError::NegativeAmount {
                    index: idx + 1,
                    amount: draft.amount,
                });
            }
            if has_sub_cents(draft.amount) {
                return Err(BillingError::SubCentAmount(draft.amount));
            }
            let quantity = u32::try_from(draft.quantity)
                .ok()
                .filter(|q| *q >= 1)
                .ok_or(BillingError::InvalidQuantity {
                    index: idx + 1,
                    quantity: draft.quantity,
                })?;
            items.push(InvoiceItem {
                name: draft.name.trim().to_string(),
                description: draft.description.clone(),
                amount: draft.amount,
                quantity,
            });
        }

        let subtotal = self.subtotal()?;
        let tax_amount = self.tax_amount()?;
        let total = self.total()?;

        Ok(Invoice {
            number: number.into(),
            bill_to: bill_to.into(),
            issue_date,
            due_date,
            status: InvoiceStatus::Draft,
            tax_rate: self.tax_rate,
            subtotal,
            tax_amount,
            total,
            notes: notes.filter(|n| !n.trim().is_empty()),
            paid_date: None,
            items,
        })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(BillingError::ItemIndex {
                index,
                count: self.items.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn starts_with_one_zero_item() {
        let builder = InvoiceBuilder::new();
        assert_eq!(builder.items().len(), 1);
        assert_eq!(builder.subtotal().unwrap(), Decimal::ZERO);
        assert_eq!(builder.total().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn registration_example_totals() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "50").unwrap();
        builder.set_item_field(0, ItemField::Quantity, "2").unwrap();
        let second = builder.add_item();
        builder.set_item_field(second, ItemField::Amount, "10").unwrap();
        builder.set_tax_rate(dec!(10));

        assert_eq!(builder.subtotal().unwrap(), dec!(110));
        assert_eq!(builder.total().unwrap(), dec!(121.00));
    }

    #[test]
    fn totals_follow_every_edit() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "19.99").unwrap();
        builder.set_item_field(0, ItemField::Quantity, "3").unwrap();
        builder.set_tax_rate(dec!(8.25));
        let idx = builder.add_item();
        builder.set_item_field(idx, ItemField::Amount, "5.50").unwrap();
        builder.remove_item(0).unwrap();
        builder.set_tax_rate(dec!(7));

        let expected_subtotal: Decimal = builder.items().iter().map(|i| i.amount * Decimal::from(i.quantity)).sum();
        let subtotal = builder.subtotal().unwrap();
        assert_eq!(subtotal, expected_subtotal);
        assert_eq!(subtotal, dec!(5.50));
        let unrounded = subtotal * (Decimal::ONE + builder.tax_rate() / Decimal::ONE_HUNDRED);
        let total = builder.total().unwrap();
        assert!((total - unrounded).abs() < dec!(0.01));
        assert_eq!(total, dec!(5.89));
    }

    #[test]
    fn non_numeric_input_coerces_to_zero() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "75").unwrap();
        builder.set_item_field(0, ItemField::Amount, "seventy").unwrap();
        builder.set_item_field(0, ItemField::Quantity, "two").unwrap();
        assert_eq!(builder.items()[0].amount, Decimal::ZERO);
        assert_eq!(builder.items()[0].quantity, 0);
        assert_eq!(builder.subtotal().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn huge_amounts_overflow_without_panicking() {
        let mut builder = InvoiceBuilder::new();
        builder
            .set_item_field(0, ItemField::Amount, "79228162514264337593543950335")
            .unwrap();
        builder.set_item_field(0, ItemField::Quantity, "2").unwrap();
        assert!(matches!(builder.subtotal(), Err(BillingError::AmountOverflow)));
        assert!(matches!(builder.total(), Err(BillingError::AmountOverflow)));
        assert!(matches!(
            builder.build("INV-1", "Lee", date(2026, 1, 1), date(2026, 1, 31), None),
            Err(BillingError::AmountOverflow)
        ));

        // Each line fits but their sum does not
        builder.set_item_field(0, ItemField::Quantity, "1").unwrap();
        let idx = builder.add_item();
        builder
            .set_item_field(idx, ItemField::Amount, "79228162514264337593543950335")
            .unwrap();
        assert!(matches!(builder.subtotal(), Err(BillingError::AmountOverflow)));
    }

    #[test]
    fn huge_tax_rate_overflows_without_panicking() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "1000000000000").unwrap();
        builder.set_tax_rate(Decimal::MAX);
        assert!(matches!(builder.tax_amount(), Err(BillingError::AmountOverflow)));
    }

    #[test]
    fn build_rejects_fractions_of_a_cent() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "10.005").unwrap();
        assert!(matches!(
            builder.build("INV-1", "Lee", date(2026, 1, 1), date(2026, 1, 31), None),
            Err(BillingError::SubCentAmount(_))
        ));
        builder.set_item_field(0, ItemField::Amount, "10.500").unwrap();
        assert!(builder
            .build("INV-1", "Lee", date(2026, 1, 1), date(2026, 1, 31), None)
            .is_ok());
    }

    #[test]
    fn cannot_remove_last_item() {
        let mut builder = InvoiceBuilder::new();
        assert!(matches!(builder.remove_item(0), Err(BillingError::LastInvoiceItem)));
        builder.add_item();
        builder.remove_item(1).unwrap();
        assert!(matches!(builder.remove_item(0), Err(BillingError::LastInvoiceItem)));
        assert_eq!(builder.items().len(), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut builder = InvoiceBuilder::new();
        assert!(matches!(
            builder.set_item_field(3, ItemField::Name, "Jersey"),
            Err(BillingError::ItemIndex { index: 3, count: 1 })
        ));
        builder.add_item();
        assert!(matches!(
            builder.remove_item(2),
            Err(BillingError::ItemIndex { index: 2, count: 2 })
        ));
    }

    #[test]
    fn build_validates_amounts_and_quantities() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "-20").unwrap();
        let err = builder
            .build("INV-1", "Lee", date(2026, 1, 1), date(2026, 1, 31), None)
            .unwrap_err();
        assert!(matches!(err, BillingError::NegativeAmount { index: 1, .. }));

        builder.set_item_field(0, ItemField::Amount, "20").unwrap();
        builder.set_item_field(0, ItemField::Quantity, "0").unwrap();
        let err = builder
            .build("INV-1", "Lee", date(2026, 1, 1), date(2026, 1, 31), None)
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidQuantity { index: 1, quantity: 0 }));
    }

    #[test]
    fn build_rejects_due_before_issue_and_negative_tax() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Amount, "20").unwrap();
        assert!(matches!(
            builder.build("INV-1", "Lee", date(2026, 2, 1), date(2026, 1, 31), None),
            Err(BillingError::DueBeforeIssue { .. })
        ));
        builder.set_tax_rate(dec!(-5));
        assert!(matches!(
            builder.build("INV-1", "Lee", date(2026, 1, 1), date(2026, 1, 31), None),
            Err(BillingError::NegativeTaxRate(_))
        ));
    }

    #[test]
    fn build_copies_derived_totals() {
        let mut builder = InvoiceBuilder::new();
        builder.set_item_field(0, ItemField::Name, "  Summer camp ").unwrap();
        builder.set_item_field(0, ItemField::Description, "Week 1").unwrap();
        builder.set_item_field(0, ItemField::Amount, "250").unwrap();
        builder.set_tax_rate(dec!(6));

        let invoice = builder
            .build("INV-2026-0007", "Okafor family", date(2026, 6, 1), date(2026, 6, 15), Some(" ".into()))
            .unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.items[0].name, "Summer camp");
        assert_eq!(invoice.items[0].description.as_deref(), Some("Week 1"));
        assert_eq!(invoice.subtotal, dec!(250));
        assert_eq!(invoice.tax_amount, dec!(15.00));
        assert_eq!(invoice.total, dec!(265.00));
        assert_eq!(invoice.notes, None);
    }
}
