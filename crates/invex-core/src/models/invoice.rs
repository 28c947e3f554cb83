//! Extracted invoice record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of a field on an [`InvoiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    InvoiceNumber,
    Date,
    TotalAmount,
    Address,
}

impl FieldName {
    /// Fields extracted by regex pattern lists, in extraction order.
    pub const PATTERN_FIELDS: [FieldName; 3] =
        [FieldName::InvoiceNumber, FieldName::Date, FieldName::TotalAmount];

    /// All record fields, in output order.
    pub const ALL: [FieldName; 4] = [
        FieldName::InvoiceNumber,
        FieldName::Date,
        FieldName::TotalAmount,
        FieldName::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::InvoiceNumber => "invoice_number",
            FieldName::Date => "date",
            FieldName::TotalAmount => "total_amount",
            FieldName::Address => "address",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice_number" => Ok(FieldName::InvoiceNumber),
            "date" => Ok(FieldName::Date),
            "total_amount" => Ok(FieldName::TotalAmount),
            "address" => Ok(FieldName::Address),
            other => Err(format!("unknown field: '{other}'")),
        }
    }
}

/// Structured fields extracted from one invoice document.
///
/// Every field is independently optional. A present value is never the empty
/// string; use [`InvoiceRecord::set`] to keep that invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice number/identifier.
    pub invoice_number: Option<String>,

    /// Issue date, as written on the document.
    pub date: Option<String>,

    /// Total amount, as written on the document (no currency symbol).
    pub total_amount: Option<String>,

    /// Address assembled from place, facility and organization entities.
    pub address: Option<String>,
}

// chrono's `%Y` also accepts two digits, so the layout is picked from the
// digit-group lengths before parsing.
const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DAY_FIRST_LONG_YEAR: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];
const DAY_FIRST_SHORT_YEAR: &[&str] = &["%d-%m-%y", "%d/%m/%y", "%d.%m.%y"];

impl InvoiceRecord {
    /// Get a field value.
    pub fn get(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::InvoiceNumber => self.invoice_number.as_deref(),
            FieldName::Date => self.date.as_deref(),
            FieldName::TotalAmount => self.total_amount.as_deref(),
            FieldName::Address => self.address.as_deref(),
        }
    }

    /// Set a field value. Empty or whitespace-only values are stored as absent.
    pub fn set(&mut self, field: FieldName, value: Option<String>) {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        *self.slot(field) = value;
    }

    /// Reset a field to absent, returning the previous value.
    pub fn clear(&mut self, field: FieldName) -> Option<String> {
        self.slot(field).take()
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        FieldName::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Number of present fields.
    pub fn present_count(&self) -> usize {
        FieldName::ALL.iter().filter(|f| self.get(**f).is_some()).count()
    }

    /// Interpret the date field as a calendar date.
    ///
    /// Year-first when the first group has four digits, otherwise day-first.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?;
        let groups: Vec<&str> = raw.split(['-', '/', '.']).collect();
        let formats = match (groups.first(), groups.last()) {
            (Some(first), _) if first.len() == 4 => YEAR_FIRST,
            (_, Some(last)) if last.len() == 4 => DAY_FIRST_LONG_YEAR,
            _ => DAY_FIRST_SHORT_YEAR,
        };
        formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }

    /// Interpret the total amount as a decimal.
    ///
    /// The captured amount carries at most one separator, and a comma is
    /// always read as the decimal point, so `"1,250"` is `1.25`, not one
    /// thousand two hundred fifty. Thousands separators are not recognised.
    pub fn parsed_total(&self) -> Option<Decimal> {
        let raw = self.total_amount.as_deref()?;
        Decimal::from_str(&raw.replace(',', ".")).ok()
    }

    fn slot(&mut self, field: FieldName) -> &mut Option<String> {
        match field {
            FieldName::InvoiceNumber => &mut self.invoice_number,
            FieldName::Date => &mut self.date,
            FieldName::TotalAmount => &mut self.total_amount,
            FieldName::Address => &mut self.address,
        }
    }
}
