//! Per-message and per-batch reports.

use crate::domain::{ScoreBreakdown, Tier, Verdict};

/// What happened to one candidate inside one message.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateReport {
    pub code: String,
    pub tier: Tier,
    /// Character offset within the message's full content
    pub position: usize,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub verdict: Verdict,
}

/// Every candidate found in one message, accepted or not.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageAnalysis {
    pub message_id: String,
    pub sender: String,
    pub candidates: Vec<CandidateReport>,
}

impl MessageAnalysis {
    pub fn accepted(&self) -> impl Iterator<Item = &CandidateReport> {
        self.candidates.iter().filter(|c| c.verdict.is_valid())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &CandidateReport> {
        self.candidates.iter().filter(|c| !c.verdict.is_valid())
    }
}

/// Counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub messages: usize,
    pub skipped: usize,
    pub candidates: usize,
    pub accepted: usize,
    pub results: usize,
}

impl ExtractionSummary {
    pub fn found_code(&self) -> bool {
        self.results > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rejection;

    fn report(code: &str, verdict: Verdict) -> CandidateReport {
        CandidateReport {
            code: code.to_string(),
            tier: Tier::Low,
            position: 0,
            score: 1.0,
            breakdown: ScoreBreakdown::default(),
            verdict,
        }
    }

    #[test]
    fn test_accepted_and_rejected_split() {
        let analysis = MessageAnalysis {
            message_id: "m1".to_string(),
            sender: "a".to_string(),
            candidates: vec![
                report("482913", Verdict::Valid),
                report("2024", Verdict::Rejected(Rejection::Year)),
            ],
        };
        assert_eq!(analysis.accepted().count(), 1);
        assert_eq!(analysis.rejected().next().unwrap().code, "2024");
    }

    #[test]
    fn test_summary_found_code() {
        assert!(!ExtractionSummary::default().found_code());
        let summary = ExtractionSummary {
            results: 1,
            ..Default::default()
        };
        assert!(summary.found_code());
    }
}
