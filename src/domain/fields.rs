//! Field rules for one row of the AdvicePro client export.
//!
//! Every rule is a pure function from the raw cell text to either the
//! normalized value or a [`FieldIssue`] carrying the reason shown in the
//! validation report. Callers substitute the field's safe default on error.

use crate::domain::model::Gender;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Reason a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue(pub &'static str);

pub type FieldResult<T> = std::result::Result<T, FieldIssue>;

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const MAX_AGE_YEARS: i32 = 150;

static NI_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-CEGHJ-PR-TW-Z][A-CEGHJ-NPR-TW-Z][0-9]{6}[A-DFM]$").unwrap()
});

static HOME_OFFICE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{7}$").unwrap());

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());

/// RFC 5322 style address, applied after lowercasing.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"#,
    )
    .unwrap()
});

// 只檢查開頭，與 AdvicePro 匯出的郵遞區號格式一致
static POSTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-HJ-Y]?[0-9]{1,2} ?[0-9][A-Z]{2}").unwrap());

/// Strip accents: decompose, then drop everything outside ASCII.
pub fn deaccent(value: &str) -> String {
    value.nfd().filter(|c| c.is_ascii()).collect()
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_integer(raw: &str) -> FieldResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| FieldIssue("Not a number"))
}

pub fn system_id(raw: &str) -> FieldResult<u64> {
    let value = parse_integer(raw)?;
    if value <= 0 {
        return Err(FieldIssue("Out of range"));
    }
    Ok(value as u64)
}

pub fn client_reference(raw: &str) -> FieldResult<u64> {
    if raw.is_empty() {
        return Err(FieldIssue("No Client ID"));
    }
    let value = parse_integer(raw)?;
    if value <= 0 {
        return Err(FieldIssue("Out of range"));
    }
    Ok(value as u64)
}

pub fn case_count(raw: &str) -> FieldResult<u32> {
    let value = parse_integer(raw)?;
    u32::try_from(value).map_err(|_| FieldIssue("Out of range"))
}

/// Normalized "Surname, Forename".
pub fn client_name(raw: &str) -> FieldResult<String> {
    let name = collapse_whitespace(deaccent(raw).trim());
    if name.is_empty() {
        return Err(FieldIssue("Empty"));
    }
    Ok(name)
}

/// "Surname, Forename" reordered to "Forename Surname".
pub fn search_name(name: &str) -> String {
    name.rsplit(", ").collect::<Vec<_>>().join(" ")
}

pub fn gender(raw: &str) -> FieldResult<Gender> {
    match raw {
        "Male" => Ok(Gender::Male),
        "Female" => Ok(Gender::Female),
        "[Not Specified]" => Ok(Gender::Unknown),
        _ => Err(FieldIssue("Not an allowed value")),
    }
}

fn compact_upper(raw: &str) -> String {
    raw.trim().to_uppercase().replace(' ', "")
}

pub fn ni_number(raw: &str) -> FieldResult<String> {
    let ni = compact_upper(raw);
    if ni.is_empty() {
        return Ok(ni);
    }
    if ni.chars().count() != 9 {
        return Err(FieldIssue("Invalid length"));
    }
    if !NI_NUMBER_RE.is_match(&ni) {
        return Err(FieldIssue("Malformed"));
    }
    Ok(ni)
}

pub fn home_office_reference(raw: &str) -> FieldResult<String> {
    let reference = compact_upper(raw);
    if reference.is_empty() || HOME_OFFICE_REF_RE.is_match(&reference) {
        Ok(reference)
    } else {
        Err(FieldIssue("Malformed"))
    }
}

/// UK mobile reduced to 11 digits with a leading zero.
pub fn mobile_number(raw: &str) -> FieldResult<String> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    let local = match raw.strip_prefix("+44") {
        Some(rest) => format!("0{}", rest),
        None => raw.to_string(),
    };
    let mut digits = NON_DIGIT_RE.replace_all(&local, "").into_owned();
    if !digits.starts_with('0') {
        digits.insert(0, '0');
    }
    digits.truncate(11);
    if digits.len() != 11 {
        return Err(FieldIssue("Invalid length"));
    }
    Ok(digits)
}

pub fn email(raw: &str) -> FieldResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(FieldIssue("Malformed"))
    }
}

pub fn postcode(raw: &str) -> FieldResult<String> {
    let postcode = raw.trim().to_uppercase();
    if postcode.is_empty() || POSTCODE_RE.is_match(&postcode) {
        Ok(postcode)
    } else {
        Err(FieldIssue("Malformed"))
    }
}

/// Date of birth re-rendered as zero-padded `DD/MM/YYYY`.
pub fn date_of_birth(raw: &str, current_year: i32) -> FieldResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let date =
        NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| FieldIssue("Not a valid date"))?;
    let age = current_year - date.year();
    if !(0..=MAX_AGE_YEARS).contains(&age) {
        return Err(FieldIssue("Invalid age"));
    }
    Ok(date.format(DATE_FORMAT).to_string())
}
