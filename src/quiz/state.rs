//! Per-session quiz state and navigation.

use im::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::PersonaId;
use crate::errors::{EngineError, Result};
use crate::quiz::catalog::QuizCatalog;

/// Mutable quiz-session state.
///
/// Created zeroed, mutated once per answered or skipped question, and
/// finalized into a [`crate::quiz::QuizResult`]. The state can be rebuilt
/// from a [`QuizSnapshot`] without re-running any score mutation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizState {
    pub current_step: usize,
    pub total_steps: usize,
    pub email: Option<String>,
    pub has_consented: bool,
    answers: HashMap<String, String>,
    scores: HashMap<PersonaId, u32>,
    pub quiz_completed: bool,
}

/// The persisted subset of quiz state for mid-quiz resume.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub answers: HashMap<String, String>,
    pub scores: HashMap<PersonaId, u32>,
    pub current_step: usize,
    pub quiz_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub has_consented: bool,
}

impl QuizState {
    /// Fresh state for a catalog: step 0, all scores zero, nothing answered.
    pub fn new(catalog: &QuizCatalog) -> Self {
        Self {
            current_step: 0,
            total_steps: catalog.len(),
            email: None,
            has_consented: false,
            answers: HashMap::new(),
            scores: HashMap::new(),
            quiz_completed: false,
        }
    }

    /// Reset scores, answers, step and completion. Email and consent are
    /// kept; idempotent on an already-reset state.
    pub fn start_quiz(&mut self) {
        self.current_step = 0;
        self.answers = HashMap::new();
        self.scores = HashMap::new();
        self.quiz_completed = false;
    }

    /// Full return to initial state, as if the quiz was never started.
    pub fn reset_quiz(&mut self) {
        self.start_quiz();
        self.email = None;
        self.has_consented = false;
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = Some(email.into());
    }

    pub fn set_consent(&mut self, consented: bool) {
        self.has_consented = consented;
    }

    /// Record an answer and accumulate its persona weights.
    ///
    /// Re-answering overwrites: the previous option's weights are subtracted
    /// (saturating at zero) before the new option's are added, so the score
    /// map always reflects exactly the current answer set. Only a first
    /// answer advances the step cursor. Unknown question or answer ids fail
    /// fast; silently ignoring them would corrupt the score invariants.
    pub fn answer_question(
        &mut self,
        catalog: &QuizCatalog,
        question_id: &str,
        answer_id: &str,
    ) -> Result<()> {
        let option = catalog.option(question_id, answer_id)?;

        let previous = self.answers.get(question_id).cloned();
        if let Some(previous_answer) = &previous {
            if previous_answer == answer_id {
                return Ok(());
            }
            // Resolved against the same catalog the answer came from, so
            // this lookup cannot fail.
            let previous_option = catalog.option(question_id, previous_answer)?;
            for weight in &previous_option.weights {
                let current = self.scores.get(&weight.persona).copied().unwrap_or(0);
                self.scores
                    .insert(weight.persona, current.saturating_sub(weight.points));
            }
            debug!(
                "re-answered {question_id}: {previous_answer} -> {answer_id}, previous weights removed"
            );
        }

        for weight in &option.weights {
            let current = self.scores.get(&weight.persona).copied().unwrap_or(0);
            self.scores.insert(weight.persona, current + weight.points);
        }
        self.answers
            .insert(question_id.to_string(), answer_id.to_string());

        if previous.is_none() {
            self.advance();
        }
        Ok(())
    }

    /// Advance past a skippable question without touching scores.
    pub fn skip_question(&mut self, catalog: &QuizCatalog, question_id: &str) -> Result<()> {
        let question = catalog.question(question_id)?;
        if !question.skippable {
            return Err(EngineError::NotSkippable(question_id.to_string()));
        }
        self.advance();
        Ok(())
    }

    /// Bounds-checked step increment. Completing the final step sets the
    /// completion flag instead of advancing.
    pub fn go_to_next_step(&mut self) -> Result<()> {
        if self.quiz_completed {
            return Err(EngineError::StepOutOfBounds {
                step: self.current_step + 1,
                total: self.total_steps,
            });
        }
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        if self.current_step + 1 < self.total_steps {
            self.current_step += 1;
        } else {
            self.quiz_completed = true;
        }
    }

    /// Merge a persisted snapshot without re-running score mutations.
    /// Rehydration never double-counts: scores are taken verbatim.
    pub fn load_state(&mut self, snapshot: QuizSnapshot) {
        self.answers = snapshot.answers;
        self.scores = snapshot.scores;
        self.current_step = snapshot.current_step.min(self.total_steps.saturating_sub(1));
        self.quiz_completed = snapshot.quiz_completed;
        if snapshot.email.is_some() {
            self.email = snapshot.email;
        }
        self.has_consented = self.has_consented || snapshot.has_consented;
    }

    /// The persisted subset for mid-quiz resume.
    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            answers: self.answers.clone(),
            scores: self.scores.clone(),
            current_step: self.current_step,
            quiz_completed: self.quiz_completed,
            email: self.email.clone(),
            has_consented: self.has_consented,
        }
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn scores(&self) -> &HashMap<PersonaId, u32> {
        &self.scores
    }

    pub fn score_for(&self, persona: PersonaId) -> u32 {
        self.scores.get(&persona).copied().unwrap_or(0)
    }

    /// Sum of all persona points awarded so far.
    pub fn total_points(&self) -> u32 {
        self.scores.values().sum()
    }
}
