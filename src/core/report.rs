use crate::domain::model::{ClientRecord, DedupResult, DuplicatePair};
use crate::domain::ports::ReportFormat;
use crate::utils::error::{DedupError, Result};
use serde::Serialize;

pub const VALIDATION_COLUMNS: [&str; 6] = [
    "System Client ID",
    "Agency Client Reference",
    "Field Name",
    "Invalid Value",
    "Reason",
    "No. Cases",
];

pub const DUPLICATE_COLUMNS: [&str; 8] = [
    "System Client ID 1",
    "Agency Client Reference 1",
    "System Client ID 2",
    "Agency Client Reference 2",
    "No. Cases 1",
    "No. Cases 2",
    "Score",
    "Reasons",
];

pub const TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M";

/// One line of the validation section.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRow {
    pub system_id: u64,
    pub client_reference: u64,
    pub field: &'static str,
    pub value: String,
    pub reason: &'static str,
    pub case_count: u32,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated: &'a str,
    total_records: usize,
    invalid_records: usize,
    validation_errors: Vec<ValidationRow>,
    duplicates: &'a [DuplicatePair],
    fuzzy_comparisons: u64,
}

pub fn validation_rows(records: &[ClientRecord]) -> Vec<ValidationRow> {
    records
        .iter()
        .flat_map(|record| {
            record.validation_errors.iter().map(move |error| ValidationRow {
                system_id: record.system_id,
                client_reference: record.client_reference,
                field: error.field,
                value: error.value.clone(),
                reason: error.reason,
                case_count: record.case_count,
            })
        })
        .collect()
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

// 欄位已自行加上引號，整列照原樣寫出
fn preformatted_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| DedupError::ProcessingError {
        message: format!("Failed to flush report: {}", e),
    })
}

/// A text cell quoted whatever it holds, so an invalid value such as `-5`
/// is still written as text.
fn text_cell(text: &str) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_field(text)?;
    String::from_utf8(finish(writer)?).map_err(|e| DedupError::ProcessingError {
        message: format!("Report cell is not UTF-8: {}", e),
    })
}

/// Summary lines plus one row per rejected field. The column header is only
/// written when at least one record is invalid.
pub fn render_validation_section(result: &DedupResult, generated: &str) -> Result<Vec<u8>> {
    let invalid = result.invalid_count();

    let mut writer = csv_writer();
    writer.write_record(["Report generated", generated])?;
    writer.write_record([
        "Validation errors".to_string(),
        invalid.to_string(),
        "No. records".to_string(),
        result.records.len().to_string(),
    ])?;
    let mut out = finish(writer)?;
    out.push(b'\n');

    if invalid == 0 {
        return Ok(out);
    }

    let mut writer = preformatted_writer();
    let header = VALIDATION_COLUMNS
        .iter()
        .map(|column| text_cell(column))
        .collect::<Result<Vec<_>>>()?;
    writer.write_record(&header)?;
    for row in validation_rows(&result.records) {
        writer.write_record([
            row.system_id.to_string(),
            row.client_reference.to_string(),
            text_cell(row.field)?,
            text_cell(&row.value)?,
            text_cell(row.reason)?,
            row.case_count.to_string(),
        ])?;
    }
    out.extend(finish(writer)?);
    Ok(out)
}

pub fn render_duplicate_section(duplicates: &[DuplicatePair]) -> Result<Vec<u8>> {
    let mut out = vec![b'\n'];

    let mut writer = csv_writer();
    writer.write_record(["Possible duplicates"])?;
    writer.write_record(DUPLICATE_COLUMNS)?;
    for pair in duplicates {
        writer.write_record([
            pair.system_id_1.to_string(),
            pair.client_reference_1.to_string(),
            pair.system_id_2.to_string(),
            pair.client_reference_2.to_string(),
            pair.case_count_1.to_string(),
            pair.case_count_2.to_string(),
            pair.score_percent.to_string(),
            pair.reasons.clone(),
        ])?;
    }
    out.extend(finish(writer)?);
    Ok(out)
}

pub fn render_report(result: &DedupResult, format: ReportFormat, generated: &str) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Csv => {
            let mut out = render_validation_section(result, generated)?;
            out.extend(render_duplicate_section(&result.duplicates)?);
            Ok(out)
        }
        ReportFormat::Json => {
            let report = JsonReport {
                generated,
                total_records: result.records.len(),
                invalid_records: result.invalid_count(),
                validation_errors: validation_rows(&result.records),
                duplicates: &result.duplicates,
                fuzzy_comparisons: result.fuzzy_comparisons,
            };
            let mut out = serde_json::to_vec_pretty(&report)?;
            out.push(b'\n');
            Ok(out)
        }
    }
}
