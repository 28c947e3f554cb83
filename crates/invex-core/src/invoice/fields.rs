//! Ordered-fallback field extraction.

use regex::Regex;
use tracing::trace;

use super::patterns::FieldPatternSet;
use crate::models::{FieldName, InvoiceRecord};

/// Run `rules` in order against `text`.
///
/// The first rule that matches anywhere decides the outcome: its last
/// capture group, trimmed and cut before any following `Label:` token, is
/// the value. Later rules are not consulted even when that group is empty or
/// did not participate. A rule without capture groups yields its whole match.
pub fn extract_field(text: &str, rules: &[Regex]) -> Option<String> {
    for (index, rule) in rules.iter().enumerate() {
        let Some(caps) = rule.captures(text) else {
            continue;
        };

        trace!("Rule {} matched: {:?}", index, caps.get(0).map(|m| m.as_str()));
        let has_groups = caps.len() > 1;
        let value = caps
            .get(caps.len() - 1)
            .map(|m| m.as_str().trim())
            .map(|v| if has_groups { before_next_label(v) } else { v })
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        return value;
    }
    None
}

/// Cut `value` before its first whitespace-separated token that ends in `:`.
fn before_next_label(value: &str) -> &str {
    let mut token_start = 0;
    for (i, c) in value.char_indices() {
        if c.is_whitespace() {
            token_start = i + c.len_utf8();
        } else if c == ':' && value[i + 1..].chars().next().is_none_or(char::is_whitespace) {
            return value[..token_start].trim_end();
        }
    }
    value
}

/// Extract every regex-driven field of `patterns` into a fresh record.
/// The address is left absent.
pub fn extract_fields(text: &str, patterns: &FieldPatternSet) -> InvoiceRecord {
    let mut record = InvoiceRecord::default();
    for field in FieldName::PATTERN_FIELDS {
        record.set(field, extract_field(text, patterns.rules(field)));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(field: FieldName) -> Vec<Regex> {
        FieldPatternSet::default().rules(field).to_vec()
    }

    #[test]
    fn test_invoice_number_variants() {
        let rules = rules(FieldName::InvoiceNumber);
        assert_eq!(extract_field("Invoice No: INV2024", &rules).as_deref(), Some("INV2024"));
        assert_eq!(extract_field("Invoice Number: 12345", &rules).as_deref(), Some("12345"));
        assert_eq!(extract_field("INVOICE: A77", &rules).as_deref(), Some("A77"));
        assert_eq!(extract_field("Bill ID: B-9", &rules).as_deref(), Some("B-9"));
    }

    #[test]
    fn test_invoice_number_keeps_garbled_run() {
        let rules = rules(FieldName::InvoiceNumber);
        assert_eq!(
            extract_field("Invoice No: INV 2024!!\nDate: 2024-01-15", &rules).as_deref(),
            Some("INV 2024!!")
        );
    }

    #[test]
    fn test_invoice_label_needs_colon_on_one_line() {
        let rules = rules(FieldName::InvoiceNumber);
        assert_eq!(
            extract_field("INVOICE\nInvoice No: 123\nDate: 2024-01-15", &rules).as_deref(),
            Some("123")
        );
        assert_eq!(extract_field("INVOICE\nBill ID: B7", &rules).as_deref(), Some("B7"));
        assert_eq!(
            extract_field("Invoice Date: 2024-01-15\nInvoice Number: INV2024", &rules).as_deref(),
            Some("INV2024")
        );
        assert_eq!(extract_field("Invoice INV2024", &rules), None);
    }

    #[test]
    fn test_value_stops_at_next_label() {
        let numbers = rules(FieldName::InvoiceNumber);
        let text = "Invoice No: 123 Date: 2024-01-15";
        assert_eq!(extract_field(text, &numbers).as_deref(), Some("123"));
        assert_eq!(extract_field(text, &rules(FieldName::Date)).as_deref(), Some("2024-01-15"));
        assert_eq!(extract_field("Invoice No: Date: 2024-01-15", &numbers), None);
        assert_eq!(
            extract_field("Bill ID: A 12:30 run", &numbers).as_deref(),
            Some("A 12:30 run")
        );
    }

    #[test]
    fn test_before_next_label() {
        assert_eq!(before_next_label("INV 2024!!"), "INV 2024!!");
        assert_eq!(before_next_label("123  Total: 5"), "123");
        assert_eq!(before_next_label("Date:"), "");
        assert_eq!(before_next_label("Zürich Ref: 9"), "Zürich");
    }

    #[test]
    fn test_date_and_total() {
        let dates = rules(FieldName::Date);
        let totals = rules(FieldName::TotalAmount);

        assert_eq!(extract_field("Date: 15.01.2024", &dates).as_deref(), Some("15.01.2024"));
        assert_eq!(extract_field("Issue Date: 2024/1/15", &dates).as_deref(), None);
        assert_eq!(extract_field("Issue Date: 2024/01/15", &dates).as_deref(), Some("2024/01/15"));
        assert_eq!(extract_field("Total Amount: $1250.00", &totals).as_deref(), Some("1250.00"));
        assert_eq!(extract_field("TOTAL 99,95", &totals).as_deref(), Some("99,95"));
        assert_eq!(extract_field("Grand Total: €42", &totals).as_deref(), Some("42"));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            Regex::new(r"Bill ID:\s*(\w+)").unwrap(),
            Regex::new(r"Invoice No:\s*(\w+)").unwrap(),
        ];
        let text = "Invoice No: AAA\nBill ID: BBB";
        assert_eq!(extract_field(text, &rules).as_deref(), Some("BBB"));

        let reversed: Vec<Regex> = rules.into_iter().rev().collect();
        assert_eq!(extract_field(text, &reversed).as_deref(), Some("AAA"));
    }

    #[test]
    fn test_empty_capture_stops_search() {
        let rules = vec![
            Regex::new(r"Ref:(\s*)").unwrap(),
            Regex::new(r"Ref:\s*(\w+)").unwrap(),
        ];
        assert_eq!(extract_field("Ref: X1", &rules), None);
    }

    #[test]
    fn test_rule_without_groups_yields_match() {
        let rules = vec![Regex::new(r"INV\d+").unwrap()];
        assert_eq!(extract_field("see INV42 attached", &rules).as_deref(), Some("INV42"));
    }

    #[test]
    fn test_no_rules_or_no_match() {
        assert_eq!(extract_field("Invoice No: 1", &[]), None);
        assert_eq!(extract_field("", &rules(FieldName::Date)), None);
    }

    #[test]
    fn test_extract_fields() {
        let text = "ACME LTD\nInvoice Number: 12345\nDate: 2024-01-15\nTotal Amount: $1250.00";
        let record = extract_fields(text, &FieldPatternSet::default());

        assert_eq!(
            record,
            InvoiceRecord {
                invoice_number: Some("12345".to_string()),
                date: Some("2024-01-15".to_string()),
                total_amount: Some("1250.00".to_string()),
                address: None,
            }
        );
    }
}
