//! Strict format checks for extracted fields.

use regex::Regex;
use tracing::debug;

use super::patterns::{VALID_DATE, VALID_INVOICE_NUMBER, VALID_TOTAL_AMOUNT};
use crate::models::{FieldName, InvoiceRecord};

fn validation_rule(field: FieldName) -> Option<&'static Regex> {
    match field {
        FieldName::InvoiceNumber => Some(&*VALID_INVOICE_NUMBER),
        FieldName::Date => Some(&*VALID_DATE),
        FieldName::TotalAmount => Some(&*VALID_TOTAL_AMOUNT),
        FieldName::Address => None,
    }
}

/// Whether `value` is an acceptable value for `field`.
pub fn is_valid(field: FieldName, value: &str) -> bool {
    validation_rule(field).is_none_or(|rule| rule.is_match(value))
}

/// Clear every present field whose value fails its format check and return
/// the cleared fields. Values are never corrected; absent fields and the
/// address are left untouched.
pub fn validate(record: &mut InvoiceRecord) -> Vec<FieldName> {
    let mut rejected = Vec::new();
    for field in FieldName::ALL {
        let Some(value) = record.get(field) else {
            continue;
        };
        if !is_valid(field, value) {
            debug!("Rejecting {} value {:?}", field, value);
            record.clear(field);
            rejected.push(field);
        }
    }
    rejected
}
