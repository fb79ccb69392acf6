// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod personalization;
pub mod quiz;
pub mod scoring;
pub mod session;
pub mod tracking;

// Re-export commonly used types
pub use crate::core::{
    DeviceType, EngagementLevel, InteractionEvent, LeadStage, PersonaId, ServiceInquiryState,
    VisitorProfile,
};

pub use crate::config::LeadmapConfig;
pub use crate::errors::{EngineError, Result};

pub use crate::quiz::{
    builtin_catalog, calculate_results, QuizCatalog, QuizResult, QuizSnapshot, QuizState,
};

pub use crate::scoring::{
    apply_qualifying_event, derive_lead_stage, promote, LeadScoreComponents, ScoreBucket,
};

pub use crate::personalization::{
    apply_rules, default_rules, evaluate_applicable_rules, ContentPatch, PersonalizationRule,
};

pub use crate::session::{PersonalizationSnapshot, SessionReport, SessionSnapshot, VisitorSession};

pub use crate::tracking::{engagement_level_for, track_behavior, update_engagement_score};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
