//! Persona quiz: weighted-choice classification of visitors.
//!
//! The quiz walks an ordered catalog of questions whose answer options carry
//! `(persona, points)` weight pairs and optional demographic mappings.
//! Answering accumulates persona scores; finalizing ranks personas into a
//! [`QuizResult`] with a confidence figure.

pub mod catalog;
pub mod result;
pub mod state;

pub use catalog::{builtin_catalog, DemographicWeight, PersonaWeight, QuizAnswerOption, QuizCatalog, QuizQuestion};
pub use result::{calculate_results, PersonaScore, QuizResult};
pub use state::{QuizSnapshot, QuizState};
