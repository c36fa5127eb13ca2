use crate::domain::model::{ClientRecord, RawClientRow, INPUT_HEADER};
use crate::utils::error::{DedupError, Result};

/// Parses an AdvicePro client export. The header row must match
/// [`INPUT_HEADER`] exactly; every data row becomes a record, valid or not.
pub fn parse_client_export(data: &[u8], current_year: i32) -> Result<Vec<ClientRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let header = reader.headers()?.clone();
    if !header.iter().eq(INPUT_HEADER.iter().copied()) {
        return Err(DedupError::HeaderMismatch {
            expected: INPUT_HEADER.iter().map(|h| h.to_string()).collect(),
            found: header.iter().map(|h| h.to_string()).collect(),
        });
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<RawClientRow>() {
        let row = row?;
        records.push(ClientRecord::from_row_at(&row, current_year));
    }

    tracing::debug!("Parsed {} client rows", records.len());
    Ok(records)
}
