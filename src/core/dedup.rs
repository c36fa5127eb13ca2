//! Pairwise duplicate scoring.
//!
//! Each pair of records is judged in tiers, stopping at the first tier that
//! settles it:
//!
//! 1. different known genders, or a present-but-different NI number, Home
//!    Office reference or date of birth, rule the pair out (score 0);
//! 2. a shared agency client reference, NI number or Home Office reference
//!    is a certain match (score 1);
//! 3. shared mobile (8), email (8), non-year-only date of birth (1) and
//!    postcode (1) are weighted; more than 2 points settles the score at
//!    `min(points, 10) / 10`;
//! 4. otherwise the names are compared with [`token_sort_ratio`] and the
//!    ratio is scaled by the weak evidence: `ratio * (points + 1) / 300`.
//!
//! Only the last tier pays for the fuzzy comparison, and every time it does
//! the scorer's counter goes up.

use crate::core::fuzzy::token_sort_ratio;
use crate::domain::model::{ClientRecord, DuplicatePair};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_THRESHOLD: f64 = 0.3;

const MOBILE_WEIGHT: u32 = 8;
const EMAIL_WEIGHT: u32 = 8;
const DATE_OF_BIRTH_WEIGHT: u32 = 1;
const POSTCODE_WEIGHT: u32 = 1;
const CONFIRMED_MIN_POINTS: u32 = 2;
const MAX_POINTS: u32 = 10;

/// Prefix of a date of birth recorded when only the year is known.
const YEAR_ONLY_DOB_PREFIX: &str = "01/01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchReason {
    ClientReference,
    NiNumber,
    HomeOfficeReference,
    Mobile,
    Email,
    DateOfBirth,
    Postcode,
    Name,
}

impl MatchReason {
    pub fn label(self) -> &'static str {
        match self {
            MatchReason::ClientReference => "Agency Client Reference",
            MatchReason::NiNumber => "NI number",
            MatchReason::HomeOfficeReference => "Home Office reference",
            MatchReason::Mobile => "Mobile number",
            MatchReason::Email => "Email",
            MatchReason::DateOfBirth => "Date of birth",
            MatchReason::Postcode => "Postcode",
            MatchReason::Name => "Name",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub score: f64,
    pub reasons: Vec<MatchReason>,
}

impl Similarity {
    fn none() -> Self {
        Self {
            score: 0.0,
            reasons: Vec::new(),
        }
    }

    pub fn percent(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }

    pub fn joined_reasons(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Both present and different.
fn conflicts(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a != b
}

/// Both present and equal.
fn shared(a: &str, b: &str) -> bool {
    !a.is_empty() && a == b
}

#[derive(Debug)]
pub struct DuplicateScorer {
    threshold: f64,
    fuzzy_comparisons: AtomicU64,
}

impl Default for DuplicateScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl DuplicateScorer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            fuzzy_comparisons: AtomicU64::new(0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of pairs that needed the fuzzy name comparison so far.
    pub fn fuzzy_comparisons(&self) -> u64 {
        self.fuzzy_comparisons.load(Ordering::Relaxed)
    }

    pub fn similarity(&self, a: &ClientRecord, b: &ClientRecord) -> Similarity {
        if a.gender.is_known() && b.gender.is_known() && a.gender != b.gender {
            return Similarity::none();
        }

        // 不會改變的欄位不同，就一定不是同一人
        if conflicts(&a.ni_number, &b.ni_number)
            || conflicts(&a.home_office_reference, &b.home_office_reference)
            || conflicts(&a.date_of_birth, &b.date_of_birth)
        {
            return Similarity::none();
        }

        let mut reasons = Vec::new();

        if a.client_reference != 0 && a.client_reference == b.client_reference {
            reasons.push(MatchReason::ClientReference);
        }
        if shared(&a.ni_number, &b.ni_number) {
            reasons.push(MatchReason::NiNumber);
        }
        if shared(&a.home_office_reference, &b.home_office_reference) {
            reasons.push(MatchReason::HomeOfficeReference);
        }
        if !reasons.is_empty() {
            return Similarity {
                score: 1.0,
                reasons,
            };
        }

        let mut points = 0;
        if shared(&a.mobile, &b.mobile) {
            points += MOBILE_WEIGHT;
            reasons.push(MatchReason::Mobile);
        }
        if shared(&a.email, &b.email) {
            points += EMAIL_WEIGHT;
            reasons.push(MatchReason::Email);
        }
        if shared(&a.date_of_birth, &b.date_of_birth)
            && !a.date_of_birth.starts_with(YEAR_ONLY_DOB_PREFIX)
        {
            points += DATE_OF_BIRTH_WEIGHT;
            reasons.push(MatchReason::DateOfBirth);
        }
        if shared(&a.postcode, &b.postcode) {
            points += POSTCODE_WEIGHT;
            reasons.push(MatchReason::Postcode);
        }

        if points > CONFIRMED_MIN_POINTS {
            return Similarity {
                score: f64::from(points.min(MAX_POINTS)) / 10.0,
                reasons,
            };
        }

        let name_ratio = token_sort_ratio(&a.search_name, &b.search_name);
        self.fuzzy_comparisons.fetch_add(1, Ordering::Relaxed);
        reasons.push(MatchReason::Name);

        Similarity {
            score: f64::from(name_ratio) * f64::from(points + 1) / 300.0,
            reasons,
        }
    }

    fn pair_for(&self, target: &ClientRecord, candidate: &ClientRecord) -> Option<DuplicatePair> {
        let similarity = self.similarity(candidate, target);
        if similarity.score < self.threshold {
            return None;
        }
        Some(DuplicatePair {
            system_id_1: target.system_id,
            client_reference_1: target.client_reference,
            system_id_2: candidate.system_id,
            client_reference_2: candidate.client_reference,
            case_count_1: target.case_count,
            case_count_2: candidate.case_count,
            score_percent: similarity.percent(),
            reasons: similarity.joined_reasons(),
        })
    }

    fn pairs_from(&self, records: &[ClientRecord], i: usize) -> Vec<DuplicatePair> {
        let target = &records[i];
        records[i + 1..]
            .iter()
            .filter_map(|candidate| self.pair_for(target, candidate))
            .collect()
    }

    /// Compares every record with every later record, in input order.
    pub fn find_duplicates(&self, records: &[ClientRecord]) -> Vec<DuplicatePair> {
        (0..records.len())
            .flat_map(|i| self.pairs_from(records, i))
            .collect()
    }

    /// Same pairs in the same order as [`find_duplicates`](Self::find_duplicates),
    /// with the outer index range spread across the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn find_duplicates_parallel(&self, records: &[ClientRecord]) -> Vec<DuplicatePair> {
        use rayon::prelude::*;

        let per_target: Vec<Vec<DuplicatePair>> = (0..records.len())
            .into_par_iter()
            .map(|i| self.pairs_from(records, i))
            .collect();
        per_target.into_iter().flatten().collect()
    }
}
