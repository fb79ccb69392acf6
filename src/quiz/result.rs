//! Quiz finalization: ranked persona classification with confidence.

use serde::{Deserialize, Serialize};

use crate::core::PersonaId;
use crate::quiz::state::QuizState;

/// One persona's ranked score.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonaScore {
    pub persona: PersonaId,
    pub score: u32,
    /// Share of all awarded points, 0-100.
    pub confidence: f64,
}

/// Immutable classification derived from a finished (or abandoned) quiz.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuizResult {
    pub primary: PersonaId,
    /// Confidence of the primary persona, 0-100.
    pub confidence: f64,
    /// Non-zero scorers other than the primary, highest first.
    pub secondary: Vec<PersonaId>,
    /// All scoreable personas, ranked by score descending.
    pub ranked: Vec<PersonaScore>,
}

/// Rank the accumulated persona scores.
///
/// Pure and repeatable: recomputing from the same state yields an identical
/// result and never alters quiz state. The primary persona is the first in
/// [`PersonaId::ALL`] declaration order to reach the maximum score (the
/// documented tie-break); confidence is the primary's share of all points
/// awarded. A quiz with no points (every question skipped) resolves to
/// [`PersonaId::Unknown`] with zero confidence.
pub fn calculate_results(state: &QuizState) -> QuizResult {
    let total: u32 = state.total_points();
    let confidence_of = |score: u32| -> f64 {
        if total == 0 {
            0.0
        } else {
            f64::from(score) / f64::from(total) * 100.0
        }
    };

    // Stable sort keeps declaration order among equals.
    let mut ranked: Vec<PersonaScore> = PersonaId::ALL
        .iter()
        .map(|&persona| {
            let score = state.score_for(persona);
            PersonaScore {
                persona,
                score,
                confidence: confidence_of(score),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    if total == 0 {
        return QuizResult {
            primary: PersonaId::Unknown,
            confidence: 0.0,
            secondary: Vec::new(),
            ranked,
        };
    }

    let max = ranked[0].score;
    let primary = PersonaId::ALL
        .into_iter()
        .find(|&p| state.score_for(p) == max)
        .unwrap_or(PersonaId::Unknown);

    let secondary = ranked
        .iter()
        .filter(|s| s.persona != primary && s.score > 0)
        .map(|s| s.persona)
        .collect();

    QuizResult {
        primary,
        confidence: confidence_of(max),
        secondary,
        ranked,
    }
}
