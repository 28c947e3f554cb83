//! Field pattern catalog and validation patterns.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::error::InvexError;
use crate::models::FieldName;

/// Default extraction rules, in priority order per field.
pub const INVOICE_NUMBER_RULES: &[&str] = &[
    r"\bInvoice[ \t]*(No\.?|Number)?[ \t]*:[ \t]*(\S+(?: \S+)*)",
    r"\bBill[ \t]*ID[ \t]*:[ \t]*(\S+(?: \S+)*)",
];

pub const DATE_RULES: &[&str] = &[
    r"\bDate:\s*(\d{2,4}[-/.]\d{2}[-/.]\d{2,4})",
    r"\bIssue\s*Date:\s*(\d{2,4}[-/.]\d{2,4}[-/.]\d{2,4})",
];

pub const TOTAL_AMOUNT_RULES: &[&str] = &[
    r"\bTotal\s*(Amount)?:?\s*[$€£]?\s*(\d+[.,]?\d*)",
    r"\bGrand\s*Total:\s*[$€£]?\s*(\d+[.,]?\d*)",
];

lazy_static! {
    static ref DEFAULT_SET: FieldPatternSet = FieldPatternSet::builder()
        .rules(FieldName::InvoiceNumber, INVOICE_NUMBER_RULES.iter().copied())
        .rules(FieldName::Date, DATE_RULES.iter().copied())
        .rules(FieldName::TotalAmount, TOTAL_AMOUNT_RULES.iter().copied())
        .build()
        .unwrap();

    // Validation: full-string, case-sensitive.
    pub static ref VALID_INVOICE_NUMBER: Regex = Regex::new(r"^\w+$").unwrap();

    pub static ref VALID_DATE: Regex = Regex::new(
        r"^\d{2,4}[-/.]\d{2,4}[-/.]\d{2,4}$"
    ).unwrap();

    pub static ref VALID_TOTAL_AMOUNT: Regex = Regex::new(r"^\d+[.,]?\d*$").unwrap();
}

/// Ordered extraction rules for the regex-driven fields.
///
/// Rules are compiled case-insensitive and unanchored. Earlier rules take
/// priority over later ones for the same field.
#[derive(Debug, Clone)]
pub struct FieldPatternSet {
    rules: HashMap<FieldName, Vec<Regex>>,
}

impl FieldPatternSet {
    pub fn builder() -> FieldPatternSetBuilder {
        FieldPatternSetBuilder::default()
    }

    /// Rules for `field`, highest priority first. Empty for fields without rules.
    pub fn rules(&self, field: FieldName) -> &[Regex] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for FieldPatternSet {
    fn default() -> Self {
        DEFAULT_SET.clone()
    }
}

/// Builder for custom [`FieldPatternSet`]s.
#[derive(Debug, Default)]
pub struct FieldPatternSetBuilder {
    sources: Vec<(FieldName, String)>,
}

impl FieldPatternSetBuilder {
    /// Append a rule for `field` after any rules already added for it.
    pub fn rule(mut self, field: FieldName, pattern: impl Into<String>) -> Self {
        self.sources.push((field, pattern.into()));
        self
    }

    pub fn rules<I, S>(mut self, field: FieldName, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources
            .extend(patterns.into_iter().map(|p| (field, p.into())));
        self
    }

    pub fn build(self) -> Result<FieldPatternSet, InvexError> {
        let mut rules: HashMap<FieldName, Vec<Regex>> = HashMap::new();

        for (field, source) in self.sources {
            if field == FieldName::Address {
                return Err(InvexError::Config(
                    "address is resolved by entity recognition, not patterns".to_string(),
                ));
            }

            let regex = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    InvexError::Config(format!("invalid {} pattern '{}': {}", field, source, e))
                })?;
            rules.entry(field).or_default().push(regex);
        }

        Ok(FieldPatternSet { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let set = FieldPatternSet::default();
        for (field, sources) in [
            (FieldName::InvoiceNumber, INVOICE_NUMBER_RULES),
            (FieldName::Date, DATE_RULES),
            (FieldName::TotalAmount, TOTAL_AMOUNT_RULES),
        ] {
            let compiled: Vec<&str> = set.rules(field).iter().map(Regex::as_str).collect();
            assert_eq!(compiled, sources.to_vec());
        }
        assert!(set.rules(FieldName::Address).is_empty());
    }

    #[test]
    fn test_rules_are_case_insensitive() {
        let set = FieldPatternSet::default();
        assert!(set.rules(FieldName::Date)[0].is_match("DATE: 2024-01-15"));
        assert!(set.rules(FieldName::Date)[0].is_match("date: 2024-01-15"));
    }

    #[test]
    fn test_builder_keeps_insertion_order() {
        let set = FieldPatternSet::builder()
            .rule(FieldName::Date, r"Due:\s*(\S+)")
            .rule(FieldName::InvoiceNumber, r"Ref:\s*(\w+)")
            .rule(FieldName::Date, r"Dated\s*(\S+)")
            .build()
            .unwrap();

        let dates: Vec<&str> = set.rules(FieldName::Date).iter().map(Regex::as_str).collect();
        assert_eq!(dates, vec![r"Due:\s*(\S+)", r"Dated\s*(\S+)"]);
        assert!(set.rules(FieldName::TotalAmount).is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_regex() {
        let result = FieldPatternSet::builder()
            .rule(FieldName::TotalAmount, r"Total:\s*(\d+")
            .build();
        assert!(matches!(result, Err(InvexError::Config(msg)) if msg.contains("total_amount")));
    }

    #[test]
    fn test_builder_rejects_address_rules() {
        let result = FieldPatternSet::builder()
            .rule(FieldName::Address, r"Address:\s*(.+)")
            .build();
        assert!(matches!(result, Err(InvexError::Config(_))));
    }

    #[test]
    fn test_validation_patterns_are_anchored() {
        assert!(VALID_INVOICE_NUMBER.is_match("INV2024"));
        assert!(!VALID_INVOICE_NUMBER.is_match("INV-2024"));
        assert!(VALID_DATE.is_match("15.01.2024"));
        assert!(!VALID_DATE.is_match("on 15.01.2024"));
        assert!(VALID_TOTAL_AMOUNT.is_match("1250,00"));
        assert!(!VALID_TOTAL_AMOUNT.is_match("1,250.00"));
    }
}
