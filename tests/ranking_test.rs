//! Ranking and deduplication tests.
//!
//! Score ordering comes first; recency only breaks near-ties.

use chrono::Duration;
use otpscan::extraction::rank_and_dedupe;
use otpscan::{DedupMode, ExtractionService, RankedResult, Tier};

mod common;
use common::*;

fn ranked(code: &str, sender: &str, score: f64, minutes: i64) -> RankedResult {
    RankedResult {
        code: code.to_string(),
        sender: sender.to_string(),
        subject: "Your code".to_string(),
        received_at: base_time() + Duration::minutes(minutes),
        score,
        priority: Tier::Medium,
        message_id: format!("{}-{}", sender, minutes),
    }
}

fn codes(results: &[RankedResult]) -> Vec<&str> {
    results.iter().map(|r| r.code.as_str()).collect()
}

#[test]
fn test_higher_score_beats_recency() {
    let results = rank_and_dedupe(
        vec![ranked("482913", "a", 5.0, 0), ranked("639105", "b", 3.0, 60)],
        DedupMode::CodeSender,
        0.1,
    );
    assert_eq!(codes(&results), vec!["482913", "639105"]);
}

#[test]
fn test_equal_scores_newest_first() {
    let results = rank_and_dedupe(
        vec![ranked("482913", "a", 5.0, 0), ranked("639105", "b", 5.0, 1)],
        DedupMode::CodeSender,
        0.1,
    );
    assert_eq!(codes(&results), vec!["639105", "482913"]);
}

#[test]
fn test_gap_beyond_epsilon_is_not_a_tie() {
    let results = rank_and_dedupe(
        vec![ranked("482913", "a", 5.25, 0), ranked("639105", "b", 5.0, 1)],
        DedupMode::CodeSender,
        0.1,
    );
    assert_eq!(codes(&results), vec!["482913", "639105"]);
}

#[test]
fn test_zero_epsilon_is_pure_score_order() {
    let results = rank_and_dedupe(
        vec![ranked("482913", "a", 5.01, 0), ranked("639105", "b", 5.0, 30)],
        DedupMode::CodeSender,
        0.0,
    );
    assert_eq!(codes(&results), vec!["482913", "639105"]);
}

#[test]
fn test_dedup_by_code_and_sender() {
    let results = rank_and_dedupe(
        vec![
            ranked("482913", "a", 4.0, 0),
            ranked("482913", "a", 6.0, 1),
            ranked("482913", "b", 5.0, 2),
        ],
        DedupMode::CodeSender,
        0.1,
    );
    assert_eq!(results.len(), 2);
    assert_unique_keys(&results);
    assert_eq!(results[0].sender, "a");
    assert_eq!(results[0].score, 6.0);
}

#[test]
fn test_dedup_by_code_only() {
    let results = rank_and_dedupe(
        vec![ranked("482913", "a", 4.0, 0), ranked("482913", "b", 5.0, 2)],
        DedupMode::Code,
        0.1,
    );
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].sender, "b");
}

#[test]
fn test_empty_input() {
    assert!(rank_and_dedupe(Vec::new(), DedupMode::CodeSender, 0.1).is_empty());
}

#[test]
fn test_service_breaks_ties_by_recency() {
    let older = TestMessageBuilder::new()
        .with_id("older")
        .with_sender("Comet")
        .with_body("Your verification code is 482913")
        .build();
    let newer = TestMessageBuilder::new()
        .with_id("newer")
        .with_sender("Nova")
        .with_body("Your verification code is 639105")
        .received_minutes_after(3)
        .build();

    let results = ExtractionService::default().extract(&[older, newer]);
    assert_eq!(codes(&results), vec!["639105", "482913"]);
    assert_eq!(results[0].score, results[1].score);
}

#[test]
fn test_service_prefers_stronger_evidence() {
    let strong = TestMessageBuilder::new()
        .with_id("strong")
        .with_subject("Your verification code")
        .with_body("Your verification code is 482913")
        .build();
    let weak = TestMessageBuilder::new()
        .with_id("weak")
        .with_sender("Nova")
        .with_subject("Account activity")
        .with_body("We noticed a new sign in to your account from device 639105 today.")
        .received_minutes_after(30)
        .build();

    let results = ExtractionService::default().extract(&[strong, weak]);
    assert_top_code(&results, "482913");
    assert_ranked(&results, 0.1);
}
