//! Custom assertions for extraction results.
//!
//! Domain-specific assertions with failure messages that show the whole
//! result list.

use otpscan::RankedResult;
use std::collections::HashSet;

fn describe(results: &[RankedResult]) -> String {
    results
        .iter()
        .map(|r| format!("{} ({}, {:.2})", r.code, r.sender, r.score))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Asserts that `code` is the top-ranked result.
///
/// # Panics
/// Panics if the results are empty or start with a different code.
pub fn assert_top_code(results: &[RankedResult], code: &str) {
    assert!(
        results.first().is_some_and(|r| r.code == code),
        "Expected '{}' ranked first, got [{}]",
        code,
        describe(results)
    );
}

/// Asserts that `code` appears somewhere in the results.
pub fn assert_code_extracted(results: &[RankedResult], code: &str) {
    assert!(
        results.iter().any(|r| r.code == code),
        "Expected '{}' in results, got [{}]",
        code,
        describe(results)
    );
}

/// Asserts that nothing was extracted.
pub fn assert_no_codes(results: &[RankedResult]) {
    assert!(
        results.is_empty(),
        "Expected no codes, got [{}]",
        describe(results)
    );
}

/// Asserts that no two results share a `(code, sender)` key.
pub fn assert_unique_keys(results: &[RankedResult]) {
    let mut seen = HashSet::new();
    for r in results {
        assert!(
            seen.insert((r.code.clone(), r.sender.clone())),
            "Duplicate key ({}, {}) in [{}]",
            r.code,
            r.sender,
            describe(results)
        );
    }
}

/// Asserts that every code is 4–8 ASCII digits.
pub fn assert_numeric_codes(results: &[RankedResult]) {
    for r in results {
        assert!(
            (4..=8).contains(&r.code.len()) && r.code.bytes().all(|b| b.is_ascii_digit()),
            "Code '{}' is not 4-8 digits",
            r.code
        );
    }
}

/// Asserts that no later result outscores an earlier one by `tie_epsilon`
/// or more.
pub fn assert_ranked(results: &[RankedResult], tie_epsilon: f64) {
    for (i, earlier) in results.iter().enumerate() {
        for later in &results[i + 1..] {
            assert!(
                later.score < earlier.score + tie_epsilon,
                "'{}' ({:.2}) ranked below '{}' ({:.2})",
                later.code,
                later.score,
                earlier.code,
                earlier.score
            );
        }
    }
}
