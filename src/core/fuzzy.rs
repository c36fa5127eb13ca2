//! Token-order-insensitive name similarity.
//!
//! Both strings are reduced to lowercase ASCII alphanumeric tokens, the
//! tokens are sorted, and the sorted strings are compared with an indel
//! (insert/delete only) edit distance. The result is a percentage in
//! `0..=100`, so "Jon Smith" and "Smith Jon" score 100.

/// Lowercase, keep ASCII only, turn punctuation into spaces, then sort tokens.
fn sorted_tokens(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence of two byte strings.
fn longest_common_subsequence(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Indel similarity of two strings as a percentage, rounded half to even.
pub fn ratio(a: &str, b: &str) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    // indel 距離 = total - 2 * LCS
    let distance = total - 2 * longest_common_subsequence(a.as_bytes(), b.as_bytes());
    let similarity = (total - distance) as f64 / total as f64;
    (100.0 * similarity).round_ties_even() as u8
}

pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    ratio(&a, &b)
}
