//! Deduplication and ranking of accepted codes across a batch.

use crate::config::DedupMode;
use crate::domain::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One surviving code, as handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub code: String,
    pub sender: String,
    pub subject: String,
    pub received_at: DateTime<Utc>,
    pub score: f64,
    /// Tier of the pattern that produced the winning occurrence
    pub priority: Tier,
    pub message_id: String,
}

impl RankedResult {
    fn dedup_key(&self, mode: DedupMode) -> (String, Option<String>) {
        match mode {
            DedupMode::CodeSender => (self.code.clone(), Some(self.sender.clone())),
            DedupMode::Code => (self.code.clone(), None),
        }
    }

}

/// Collapses duplicates and sorts the survivors.
///
/// Within a dedup key the survivor is chosen over the whole group: the
/// highest score is the anchor, and the newest result scoring within
/// `tie_epsilon` of it wins. The choice does not depend on input order. The
/// output is ordered by descending score, and scores within `tie_epsilon` of
/// the head of their group are ordered newest first.
pub fn rank_and_dedupe(
    results: Vec<RankedResult>,
    mode: DedupMode,
    tie_epsilon: f64,
) -> Vec<RankedResult> {
    let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();
    let mut groups: Vec<Vec<RankedResult>> = Vec::new();

    for result in results {
        let key = result.dedup_key(mode);
        match index.get(&key) {
            Some(&i) => groups[i].push(result),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![result]);
            }
        }
    }

    let mut survivors: Vec<RankedResult> = groups
        .into_iter()
        .filter_map(|group| pick_survivor(group, tie_epsilon))
        .collect();

    sort_ranked(&mut survivors, tie_epsilon);
    survivors
}

fn pick_survivor(group: Vec<RankedResult>, tie_epsilon: f64) -> Option<RankedResult> {
    let anchor = group.iter().map(|r| r.score).max_by(|a, b| a.total_cmp(b))?;
    group
        .into_iter()
        .filter(|r| r.score == anchor || anchor - r.score < tie_epsilon)
        .min_by(newest_then_highest)
}

/// Sorts by score, then reorders each near-tie group by recency.
///
/// Grouping is anchored on the highest score of each group, so the
/// comparison used for sorting stays a total order.
pub fn sort_ranked(results: &mut [RankedResult], tie_epsilon: f64) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| by_recency(a, b))
    });

    let mut start = 0;
    while start < results.len() {
        let anchor = results[start].score;
        let end = results[start + 1..]
            .iter()
            .position(|r| r.score != anchor && anchor - r.score >= tie_epsilon)
            .map_or(results.len(), |offset| start + 1 + offset);
        results[start..end].sort_by(newest_then_highest);
        start = end;
    }
}

fn newest_then_highest(a: &RankedResult, b: &RankedResult) -> Ordering {
    b.received_at
        .cmp(&a.received_at)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| by_recency(a, b))
}

fn by_recency(a: &RankedResult, b: &RankedResult) -> Ordering {
    b.received_at
        .cmp(&a.received_at)
        .then_with(|| a.message_id.cmp(&b.message_id))
        .then_with(|| a.code.cmp(&b.code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(code: &str, sender: &str, score: f64, minute: u32) -> RankedResult {
        RankedResult {
            code: code.to_string(),
            sender: sender.to_string(),
            subject: String::new(),
            received_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
            score,
            priority: Tier::High,
            message_id: format!("{}-{}", code, minute),
        }
    }

    fn codes(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_score_orders_first() {
        let ranked = rank_and_dedupe(
            vec![result("111222", "a", 3.0, 5), result("333444", "a", 5.0, 1)],
            DedupMode::CodeSender,
            0.1,
        );
        assert_eq!(codes(&ranked), vec!["333444", "111222"]);
    }

    #[test]
    fn test_near_tie_goes_to_newest() {
        let ranked = rank_and_dedupe(
            vec![result("111222", "a", 5.05, 1), result("333444", "a", 5.0, 9)],
            DedupMode::CodeSender,
            0.1,
        );
        assert_eq!(codes(&ranked), vec!["333444", "111222"]);
    }

    #[test]
    fn test_dedup_keeps_highest_score() {
        let ranked = rank_and_dedupe(
            vec![result("482913", "a", 4.0, 9), result("482913", "a", 7.0, 1)],
            DedupMode::CodeSender,
            0.1,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 7.0);
    }

    #[test]
    fn test_dedup_near_tie_keeps_newest() {
        let ranked = rank_and_dedupe(
            vec![result("482913", "a", 7.0, 1), result("482913", "a", 6.95, 9)],
            DedupMode::CodeSender,
            0.1,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].received_at.format("%M").to_string(), "09");
    }

    #[test]
    fn test_dedup_survivor_ignores_input_order() {
        // 6.95 ties the best score; 6.88 is too far below it.
        let group = [
            result("482913", "a", 7.0, 1),
            result("482913", "a", 6.95, 5),
            result("482913", "a", 6.88, 9),
        ];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let batch = order.iter().map(|&i| group[i].clone()).collect();
            let ranked = rank_and_dedupe(batch, DedupMode::CodeSender, 0.1);
            assert_eq!(ranked.len(), 1);
            assert_eq!(ranked[0].score, 6.95, "order {:?}", order);
        }
    }

    #[test]
    fn test_zero_epsilon_still_prefers_newest_on_equal_score() {
        let ranked = rank_and_dedupe(
            vec![
                result("482913", "a", 7.0, 1),
                result("482913", "a", 7.0, 3),
                result("551208", "b", 6.0, 8),
            ],
            DedupMode::CodeSender,
            0.0,
        );
        assert_eq!(codes(&ranked), vec!["482913", "551208"]);
        assert_eq!(ranked[0].received_at.format("%M").to_string(), "03");
    }

    #[test]
    fn test_dedup_modes() {
        let batch = vec![result("482913", "a", 5.0, 1), result("482913", "b", 5.0, 2)];
        assert_eq!(
            rank_and_dedupe(batch.clone(), DedupMode::CodeSender, 0.1).len(),
            2
        );
        let collapsed = rank_and_dedupe(batch, DedupMode::Code, 0.1);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].sender, "b");
    }

    #[test]
    fn test_group_anchor_is_stable() {
        // 5.0 and 4.95 tie; 4.88 is more than 0.1 below the group head.
        let mut results = vec![
            result("100001", "a", 4.88, 30),
            result("200002", "a", 5.0, 1),
            result("300003", "a", 4.95, 20),
        ];
        sort_ranked(&mut results, 0.1);
        assert_eq!(codes(&results), vec!["300003", "200002", "100001"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(result("482913", "a", 5.0, 1)).unwrap();
        assert_eq!(json["priority"], "high");
        assert_eq!(json["received_at"], "2024-05-01T10:01:00Z");
        assert!(json.get("message_id").is_some());
    }
}
