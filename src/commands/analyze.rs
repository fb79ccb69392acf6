//! Replay a recorded visitor session through the engine.
//!
//! The session script is the collaborator boundary: everything a site shell
//! would feed the engine live (consent, device, quiz interactions, tracked
//! events, business promotions) recorded as JSON and replayed in order.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::config::LeadmapConfig;
use crate::core::LeadStage;
use crate::io::output::{JsonWriter, MarkdownWriter, OutputWriter, TerminalWriter};
use crate::personalization::{validate_rules, PersonalizationRule};
use crate::session::{SessionSnapshot, VisitorSession};

pub struct AnalyzeConfig {
    pub session: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub resume: Option<PathBuf>,
    pub save_snapshot: Option<PathBuf>,
}

/// One quiz interaction in a session script.
#[derive(Debug, Deserialize)]
pub struct QuizStep {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub skip: bool,
}

/// One tracked event in a session script.
#[derive(Debug, Deserialize)]
pub struct EventStep {
    pub name: String,
    #[serde(default)]
    pub details: Option<Value>,
    /// Replay the event this many times (defaults to once).
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_repeat() -> u32 {
    1
}

/// A recorded visitor session.
#[derive(Debug, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub consent: bool,
    #[serde(default = "default_true")]
    pub personalization_enabled: bool,
    #[serde(default)]
    pub viewport_width: Option<u32>,
    #[serde(default)]
    pub traffic_source: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_subscriber: bool,
    #[serde(default)]
    pub ab_groups: BTreeMap<String, String>,
    #[serde(default)]
    pub quiz: Vec<QuizStep>,
    /// Finalize the quiz after replaying the quiz steps.
    #[serde(default = "default_true")]
    pub complete_quiz: bool,
    #[serde(default)]
    pub events: Vec<EventStep>,
    /// External business promotion applied at the end (e.g. "Customer").
    #[serde(default)]
    pub promote: Option<LeadStage>,
}

fn default_true() -> bool {
    true
}

impl SessionScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = crate::io::read_file(path)
            .with_context(|| format!("failed to read session script {}", path.display()))?;
        let script: SessionScript = serde_json::from_str(&content)
            .with_context(|| format!("invalid session script {}", path.display()))?;
        Ok(script)
    }
}

/// Replay a script into a fresh (or resumed) session.
pub fn replay(script: &SessionScript, mut session: VisitorSession) -> Result<VisitorSession> {
    session.set_consent(script.consent);
    session.set_personalization_enabled(script.personalization_enabled);
    if let Some(width) = script.viewport_width {
        session.set_viewport_width(width);
    }
    if let Some(source) = &script.traffic_source {
        session.set_traffic_source(source.clone());
    }
    if let Some(email) = &script.email {
        session.quiz.set_email(email.clone());
    }
    for (experiment, variant) in &script.ab_groups {
        session.assign_ab_group(experiment.clone(), variant.clone());
    }

    if !script.quiz.is_empty() {
        session.start_quiz();
        for step in &script.quiz {
            if step.skip {
                session.skip_question(&step.question)?;
            } else {
                let answer = step.answer.as_deref().ok_or_else(|| {
                    crate::errors::EngineError::session_script(format!(
                        "quiz step for '{}' has neither an answer nor skip",
                        step.question
                    ))
                })?;
                session.answer_question(&step.question, answer)?;
            }
        }
        if script.complete_quiz {
            session.complete_quiz();
        }
    }

    if script.email_subscriber {
        session.set_email_subscriber(true);
    }

    for event in &script.events {
        for _ in 0..event.repeat {
            session.track_event(&event.name, event.details.clone());
        }
    }

    if let Some(stage) = script.promote {
        session.promote_stage(stage);
    }

    Ok(session)
}

fn load_rules(path: &Path) -> Result<Vec<PersonalizationRule>> {
    let content = crate::io::read_file(path)?;
    let rules: Vec<PersonalizationRule> = serde_json::from_str(&content)
        .with_context(|| format!("invalid rules file {}", path.display()))?;
    validate_rules(&rules)?;
    Ok(rules)
}

fn load_config(path: Option<&Path>) -> Result<LeadmapConfig> {
    match path {
        Some(path) => Ok(LeadmapConfig::from_path(path)?),
        None => Ok(LeadmapConfig::load_or_default()?),
    }
}

pub fn analyze_session(options: AnalyzeConfig) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let script = SessionScript::from_path(&options.session)?;

    let mut session = VisitorSession::with_config(config);
    if let Some(rules_path) = &options.rules {
        session = session.with_rules(load_rules(rules_path)?);
    }
    if let Some(resume_path) = &options.resume {
        let content = crate::io::read_file(resume_path)?;
        let snapshot: SessionSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("invalid snapshot {}", resume_path.display()))?;
        session.load_snapshot(snapshot);
    }

    let session = replay(&script, session)?;
    let report = session.report();

    match &options.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_report_to(&report, options.format, file)?;
        }
        None => match options.format {
            OutputFormat::Terminal => TerminalWriter::new().write_report(&report)?,
            OutputFormat::Json => JsonWriter::new(std::io::stdout()).write_report(&report)?,
            OutputFormat::Markdown => {
                MarkdownWriter::new(std::io::stdout()).write_report(&report)?
            }
        },
    }

    if let Some(snapshot_path) = &options.save_snapshot {
        let snapshot = session.snapshot();
        crate::io::write_file(snapshot_path, &serde_json::to_string_pretty(&snapshot)?)?;
        log::info!("session snapshot written to {}", snapshot_path.display());
    }

    Ok(())
}

fn write_report_to(
    report: &crate::session::SessionReport,
    format: OutputFormat,
    file: File,
) -> Result<()> {
    match format {
        // The terminal writer prints straight to stdout; fall back to
        // markdown when redirected to a file.
        OutputFormat::Terminal | OutputFormat::Markdown => {
            MarkdownWriter::new(file).write_report(report)
        }
        OutputFormat::Json => JsonWriter::new(file).write_report(report),
    }
}
