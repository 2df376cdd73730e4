mod builder;
mod lifecycle;

pub use builder::{DraftItem, InvoiceBuilder, ItemField};
pub use lifecycle::{Invoice, InvoiceItem, InvoiceStatus};

/// Format invoice number from template
pub fn format_invoice_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}
