use crate::domain::fields::{self, FieldIssue, FieldResult};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Column headings of the AdvicePro "duplicate check" client report, in order.
pub const INPUT_HEADER: [&str; 11] = [
    "System Client ID",
    "Agency Client Reference",
    "Surname, Forename",
    "Gender",
    "NI Number",
    "Home Office Reference",
    "Mobile Number",
    "Main E-Mail Address",
    "Postcode",
    "Date of Birth",
    "Number of Cases",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn is_known(self) -> bool {
        self != Gender::Unknown
    }
}

/// One row as it appears in the export, before any normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClientRow {
    #[serde(rename = "System Client ID")]
    pub system_id: String,
    #[serde(rename = "Agency Client Reference")]
    pub client_reference: String,
    #[serde(rename = "Surname, Forename")]
    pub name: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "NI Number")]
    pub ni_number: String,
    #[serde(rename = "Home Office Reference")]
    pub home_office_reference: String,
    #[serde(rename = "Mobile Number")]
    pub mobile: String,
    #[serde(rename = "Main E-Mail Address")]
    pub email: String,
    #[serde(rename = "Postcode")]
    pub postcode: String,
    #[serde(rename = "Date of Birth")]
    pub date_of_birth: String,
    #[serde(rename = "Number of Cases")]
    pub case_count: String,
}

/// A rejected field: the report column name, the raw cell text and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// A normalized client. Fields that failed validation hold their default
/// (0 or empty) and the failure is listed in `validation_errors`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRecord {
    pub system_id: u64,
    pub client_reference: u64,
    pub name: String,
    pub search_name: String,
    pub gender: Gender,
    pub ni_number: String,
    pub home_office_reference: String,
    pub mobile: String,
    pub email: String,
    pub postcode: String,
    pub date_of_birth: String,
    pub case_count: u32,
    pub validation_errors: Vec<FieldError>,
}

struct ErrorCollector {
    errors: Vec<FieldError>,
}

impl ErrorCollector {
    fn check<T: Default>(&mut self, field: &'static str, raw: &str, result: FieldResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(FieldIssue(reason)) => {
                self.errors.push(FieldError {
                    field,
                    value: raw.to_string(),
                    reason,
                });
                T::default()
            }
        }
    }
}

impl ClientRecord {
    /// Builds a record, judging dates of birth against the current year.
    pub fn from_row(row: &RawClientRow) -> Self {
        Self::from_row_at(row, chrono::Local::now().year())
    }

    pub fn from_row_at(row: &RawClientRow, current_year: i32) -> Self {
        let mut collector = ErrorCollector { errors: Vec::new() };

        let system_id = collector.check(
            INPUT_HEADER[0],
            &row.system_id,
            fields::system_id(&row.system_id),
        );
        let client_reference = collector.check(
            INPUT_HEADER[1],
            &row.client_reference,
            fields::client_reference(&row.client_reference),
        );
        let name = collector.check("Client name", &row.name, fields::client_name(&row.name));
        let gender = collector.check(INPUT_HEADER[3], &row.gender, fields::gender(&row.gender));
        let ni_number = collector.check(
            INPUT_HEADER[4],
            &row.ni_number,
            fields::ni_number(&row.ni_number),
        );
        let home_office_reference = collector.check(
            INPUT_HEADER[5],
            &row.home_office_reference,
            fields::home_office_reference(&row.home_office_reference),
        );
        let mobile = collector.check(INPUT_HEADER[6], &row.mobile, fields::mobile_number(&row.mobile));
        let email = collector.check(INPUT_HEADER[7], &row.email, fields::email(&row.email));
        let postcode = collector.check(INPUT_HEADER[8], &row.postcode, fields::postcode(&row.postcode));
        let date_of_birth = collector.check(
            INPUT_HEADER[9],
            &row.date_of_birth,
            fields::date_of_birth(&row.date_of_birth, current_year),
        );
        let case_count = collector.check(
            INPUT_HEADER[10],
            &row.case_count,
            fields::case_count(&row.case_count),
        );

        Self {
            system_id,
            client_reference,
            search_name: fields::search_name(&name),
            name,
            gender,
            ni_number,
            home_office_reference,
            mobile,
            email,
            postcode,
            date_of_birth,
            case_count,
            validation_errors: collector.errors,
        }
    }

    pub fn is_invalid(&self) -> bool {
        !self.validation_errors.is_empty()
    }
}

/// A pair of records scoring at or above the duplicate threshold.
/// "1" is the earlier record in the input, "2" the later one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePair {
    pub system_id_1: u64,
    pub client_reference_1: u64,
    pub system_id_2: u64,
    pub client_reference_2: u64,
    pub case_count_1: u32,
    pub case_count_2: u32,
    pub score_percent: u32,
    pub reasons: String,
}

/// Output of the validate + score phase, handed to the report writer.
#[derive(Debug, Clone)]
pub struct DedupResult {
    pub records: Vec<ClientRecord>,
    pub duplicates: Vec<DuplicatePair>,
    pub fuzzy_comparisons: u64,
}

impl DedupResult {
    pub fn invalid_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_invalid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RawClientRow {
        RawClientRow {
            system_id: "101".to_string(),
            client_reference: "5001".to_string(),
            name: "Smith,  John".to_string(),
            gender: "Male".to_string(),
            ni_number: "AB123456C".to_string(),
            home_office_reference: "".to_string(),
            mobile: "07700 900123".to_string(),
            email: "John@Example.com".to_string(),
            postcode: "so14 7ab".to_string(),
            date_of_birth: "12/03/1980".to_string(),
            case_count: "2".to_string(),
        }
    }

    #[test]
    fn test_valid_row() {
        let record = ClientRecord::from_row_at(&row(), 2026);
        assert!(!record.is_invalid());
        assert_eq!(record.system_id, 101);
        assert_eq!(record.name, "Smith, John");
        assert_eq!(record.search_name, "John Smith");
        assert_eq!(record.mobile, "07700900123");
        assert_eq!(record.email, "john@example.com");
        assert_eq!(record.postcode, "SO14 7AB");
        assert_eq!(record.case_count, 2);
    }

    #[test]
    fn test_invalid_fields_are_defaulted_and_listed_in_column_order() {
        let mut raw = row();
        raw.client_reference = "".to_string();
        raw.gender = "M".to_string();
        raw.ni_number = "ZZ1".to_string();
        raw.date_of_birth = "yesterday".to_string();

        let record = ClientRecord::from_row_at(&raw, 2026);

        assert!(record.is_invalid());
        assert_eq!(record.client_reference, 0);
        assert_eq!(record.gender, Gender::Unknown);
        assert_eq!(record.ni_number, "");
        assert_eq!(record.date_of_birth, "");

        let fields: Vec<&str> = record.validation_errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["Agency Client Reference", "Gender", "NI Number", "Date of Birth"]
        );
        assert_eq!(record.validation_errors[2].value, "ZZ1");
        assert_eq!(record.validation_errors[2].reason, "Invalid length");
    }

    #[test]
    fn test_from_row_uses_current_year() {
        let record = ClientRecord::from_row(&row());
        assert_eq!(record.date_of_birth, "12/03/1980");
        assert!(!record.is_invalid());
    }
}
