//! Composite score aggregator.
//!
//! Folds a candidate's accumulated signals into a single decision record.
//! Pure fan-in: no I/O, no side effects, and any subset of signals may be
//! missing. Weights are renormalized over whichever components are present
//! so a candidate is never penalized for an analysis stage that did not
//! run.

use chrono::Utc;

use crate::config::ScoringConfig;
use crate::types::{CandidateSignals, EvaluationResult, Verdict};

/// The composite score aggregator.
///
/// `passed` uses the caller-supplied template threshold (inclusive) when
/// one exists, else the configured global default. `verdict` always uses
/// the global rubric; the two are computed independently and may disagree
/// near a template-specific boundary.
#[derive(Debug, Clone, Default)]
pub struct CompositeAggregator {
    config: ScoringConfig,
}

impl CompositeAggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Aggregate signals into a decision record.
    ///
    /// # Arguments
    ///
    /// * `signals` - The candidate's accumulated signals, any of which may
    ///   be absent
    /// * `passing_threshold` - The assigned template's passing score, if
    ///   the candidate has one
    pub fn aggregate(
        &self,
        signals: &CandidateSignals,
        passing_threshold: Option<u8>,
    ) -> EvaluationResult {
        let interview_score = self.interview_score(signals);
        let growth_potential = self.growth_potential(signals);
        let retention_score = self.retention_score(signals);

        let threshold = passing_threshold.unwrap_or(self.config.default_passing_score);
        let passed = interview_score >= threshold;
        let verdict = self.verdict(interview_score);

        EvaluationResult {
            interview_score,
            growth_potential,
            retention_score,
            passed,
            verdict,
            evaluated_at: Utc::now(),
        }
    }

    /// Weighted mean of the present components, weights renormalized to
    /// sum 1 over those components. Falls back to the scaled mean of
    /// per-answer scores, then to 0.
    fn interview_score(&self, signals: &CandidateSignals) -> u8 {
        let w = &self.config.weights;
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;

        if let Some(technical) = signals.technical_score {
            weighted += technical * w.technical;
            weight_sum += w.technical;
        }
        if let Some(eq) = signals.eq_score {
            // EQ arrives on a 0-10 scale; normalize to 0-100.
            weighted += (eq / 10.0) * 100.0 * w.eq;
            weight_sum += w.eq;
        }
        if let Some(behavior) = signals.behavior_score {
            weighted += behavior * w.behavior;
            weight_sum += w.behavior;
        }
        if let Some(probability) = signals.hiring_probability_score {
            weighted += probability * w.hiring_probability;
            weight_sum += w.hiring_probability;
        }

        if weight_sum > 0.0 {
            return clamp_score(weighted / weight_sum);
        }

        // No weighted component: fall back to the interview answers.
        if !signals.answer_scores.is_empty() {
            tracing::debug!("no weighted signals present, scoring from interview answers");
            let sum: u32 = signals.answer_scores.iter().map(|s| *s as u32).sum();
            let mean = sum as f64 / signals.answer_scores.len() as f64;
            return clamp_score(mean * 10.0);
        }

        0
    }

    /// Mean of the present growth components; the configured default when
    /// none are present.
    fn growth_potential(&self, signals: &CandidateSignals) -> u8 {
        let mut components = Vec::new();

        if let Some(velocity) = signals.learning_velocity {
            // Learning velocity arrives on a 0-10 scale.
            components.push(velocity * 10.0);
        }

        let traits: Vec<f64> = [signals.openness, signals.conscientiousness]
            .into_iter()
            .flatten()
            .collect();
        if !traits.is_empty() {
            components.push(traits.iter().sum::<f64>() / traits.len() as f64);
        }

        if let Some(adaptability) = signals.adaptability {
            components.push(adaptability);
        }

        mean_or_default(&components, self.config.default_growth_potential)
    }

    /// Mean of the present retention components; the configured default
    /// when none are present.
    fn retention_score(&self, signals: &CandidateSignals) -> u8 {
        let components: Vec<f64> = [
            signals.emotional_stability,
            signals.team_collaboration,
            signals.culture_fit_score,
            signals.stress_tolerance,
        ]
        .into_iter()
        .flatten()
        .collect();

        mean_or_default(&components, self.config.default_retention_score)
    }

    fn verdict(&self, interview_score: u8) -> Verdict {
        let bands = &self.config.verdict_bands;
        if interview_score >= bands.strong_hire {
            Verdict::StrongHire
        } else if interview_score >= bands.hire {
            Verdict::Hire
        } else if interview_score >= bands.maybe {
            Verdict::Maybe
        } else {
            Verdict::Reject
        }
    }
}

fn mean_or_default(components: &[f64], default: u8) -> u8 {
    if components.is_empty() {
        default
    } else {
        clamp_score(components.iter().sum::<f64>() / components.len() as f64)
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
