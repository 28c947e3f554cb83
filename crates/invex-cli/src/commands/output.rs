//! Output formatting shared by `process` and `batch`.

use invex_core::models::{FieldName, InvoiceRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
    /// XML output
    Xml,
}

impl OutputFormat {
    /// File extension for per-file outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
            OutputFormat::Xml => "xml",
        }
    }
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
        OutputFormat::Xml => Ok(quick_xml::se::to_string_with_root("invoice", record)?),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(FieldName::ALL.iter().map(|f| f.as_str()))?;
    wtr.write_record(FieldName::ALL.iter().map(|f| record.get(*f).unwrap_or_default()))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    for (label, field) in [
        ("Invoice number", FieldName::InvoiceNumber),
        ("Date", FieldName::Date),
        ("Total amount", FieldName::TotalAmount),
        ("Address", FieldName::Address),
    ] {
        let label = format!("{}:", label);
        let value = record.get(field).unwrap_or("-");
        output.push_str(&format!("{:<16}{}\n", label, value));
    }

    output
}
