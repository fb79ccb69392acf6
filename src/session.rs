//! Visitor session orchestration.
//!
//! `VisitorSession` wires the quiz engine, behavioral tracker, score
//! aggregator and rule engine together around one explicit
//! [`VisitorProfile`]. Nothing here is a global: a server-side embedding
//! keeps one session per visitor and serializes mutation per key, since
//! score increments are not commutative under concurrent read-modify-write.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LeadmapConfig;
use crate::core::{
    EngagementLevel, LeadStage, PersonaId, ServiceInquiryState, VisitorProfile,
};
use crate::errors::Result;
use crate::personalization::{
    apply_rules, default_rules, exit_content_for, hero_headline, smart_cta, ContentPatch,
    CtaVariant, ExitContent, PersonalizationRule,
};
use crate::quiz::{builtin_catalog, calculate_results, QuizCatalog, QuizResult, QuizSnapshot, QuizState};
use crate::scoring::{
    apply_qualifying_event, categories, derive_lead_stage, is_qualifying_event, promote,
    ScoreBucket,
};
use crate::tracking::track_behavior;

/// Behavioral lead-score category for a tracked event, if the event feeds
/// the behavioral bucket at all.
fn behavioral_category_for(event: &str) -> Option<&'static str> {
    match event {
        "video_milestone_75" | "video_completed" => Some(categories::VIDEO_ENGAGEMENT_75_PLUS),
        "tool_usage_completed" => Some(categories::TOOL_USAGE_COMPLETED),
        "resource_downloaded_with_email" => Some(categories::RESOURCE_DOWNLOADED_WITH_EMAIL),
        "pricing_page_extended_visit" | "pricing_page_view_extended" => {
            Some(categories::PRICING_PAGE_EXTENDED_VISIT)
        }
        "service_inquiry_completed" => Some(categories::SERVICE_INQUIRY_MADE),
        "calendar_booking_made" => Some(categories::CALENDAR_BOOKING_MADE),
        "multiple_persona_hub_visits" | "multiple_pricing_page_visits_logged" => {
            Some(categories::MULTIPLE_PAGE_VISITS_HIGH_VALUE)
        }
        _ => None,
    }
}

/// Engagement-quality category for a tracked event, if any.
fn engagement_quality_category_for(event: &str) -> Option<&'static str> {
    match event {
        "email_link_clicked" => Some("email_interaction_positive"),
        "social_media_post_interaction" => Some("social_media_engagement_high"),
        "community_post_created" | "community_comment_made" => {
            Some(categories::COMMUNITY_PARTICIPATION_ACTIVE)
        }
        "session_duration_long" => Some(categories::SESSION_DURATION_LONG),
        _ => None,
    }
}

/// The durable subset of personalization state: enough to resume without
/// re-deriving anything from the full interaction history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalizationSnapshot {
    pub current_persona: Option<PersonaId>,
    pub behavior_score: u32,
    pub engagement_level: EngagementLevel,
    pub consent_given: bool,
}

/// Full durable session snapshot: personalization state plus mid-quiz
/// progress and the lead-score ledger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub personalization: PersonalizationSnapshot,
    pub quiz: QuizSnapshot,
    pub lead_score: crate::scoring::LeadScoreComponents,
    pub lead_stage: LeadStage,
    pub service_inquiry_state: ServiceInquiryState,
    pub is_email_subscriber: bool,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub ab_test_groups: std::collections::BTreeMap<String, String>,
}

/// Everything a dashboard needs from one session, in one serializable value.
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub persona: Option<PersonaId>,
    pub quiz_result: Option<QuizResult>,
    pub engagement_score: u32,
    pub engagement_level: EngagementLevel,
    pub behavioral_subtotal: u32,
    pub demographic_subtotal: u32,
    pub engagement_quality_subtotal: u32,
    pub total_score: u32,
    pub lead_stage: LeadStage,
    pub service_inquiry_state: ServiceInquiryState,
    pub events_recorded: usize,
    pub patch: ContentPatch,
    pub hero_headline: String,
    pub hero_cta: CtaVariant,
    pub quiz_prompt_cta: CtaVariant,
    pub exit_content: ExitContent,
}

/// One visitor's engine state: profile, quiz progress, catalogs and config.
#[derive(Clone, Debug)]
pub struct VisitorSession {
    config: LeadmapConfig,
    catalog: QuizCatalog,
    rules: Vec<PersonalizationRule>,
    pub profile: VisitorProfile,
    pub quiz: QuizState,
    quiz_result: Option<QuizResult>,
    last_patch: ContentPatch,
}

impl VisitorSession {
    /// Session with the built-in catalog, rule set and default config.
    pub fn new() -> Self {
        Self::with_config(LeadmapConfig::default())
    }

    pub fn with_config(config: LeadmapConfig) -> Self {
        let catalog = builtin_catalog().clone();
        let quiz = QuizState::new(&catalog);
        Self {
            config,
            catalog,
            rules: default_rules().to_vec(),
            profile: VisitorProfile::new(),
            quiz,
            quiz_result: None,
            last_patch: ContentPatch::default(),
        }
    }

    /// Replace the rule set (e.g. rules loaded from a file).
    pub fn with_rules(mut self, rules: Vec<PersonalizationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the quiz catalog. Resets quiz progress.
    pub fn with_catalog(mut self, catalog: QuizCatalog) -> Self {
        self.quiz = QuizState::new(&catalog);
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &LeadmapConfig {
        &self.config
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &[PersonalizationRule] {
        &self.rules
    }

    pub fn quiz_result(&self) -> Option<&QuizResult> {
        self.quiz_result.as_ref()
    }

    /// The most recent rule-pass output.
    pub fn last_patch(&self) -> &ContentPatch {
        &self.last_patch
    }

    // ---- visitor context -------------------------------------------------

    pub fn set_consent(&mut self, consented: bool) {
        self.profile.consent_given = consented;
        self.quiz.set_consent(consented);
    }

    pub fn set_personalization_enabled(&mut self, enabled: bool) {
        self.profile.personalization_enabled = enabled;
    }

    /// Classify and store the device type from a viewport width.
    pub fn set_viewport_width(&mut self, width: u32) {
        self.profile.device_type = crate::core::DeviceType::from_viewport_width(width);
    }

    pub fn set_traffic_source(&mut self, source: impl Into<String>) {
        self.profile.traffic_source = Some(source.into());
    }

    pub fn assign_ab_group(&mut self, experiment: impl Into<String>, variant: impl Into<String>) {
        self.profile
            .ab_test_groups
            .insert(experiment.into(), variant.into());
    }

    /// Flag the visitor as an email subscriber and credit the
    /// engagement-quality bucket.
    pub fn set_email_subscriber(&mut self, subscribed: bool) {
        self.profile.is_email_subscriber = subscribed;
        if subscribed {
            self.profile
                .lead_score
                .engagement_quality
                .award(&self.config.engagement_quality, categories::EMAIL_SUBSCRIPTION);
            self.rescore();
        }
    }

    // ---- quiz ------------------------------------------------------------

    pub fn start_quiz(&mut self) {
        self.quiz.start_quiz();
        self.quiz_result = None;
    }

    /// Answer a question and track the interaction.
    pub fn answer_question(&mut self, question_id: &str, answer_id: &str) -> Result<()> {
        self.quiz
            .answer_question(&self.catalog, question_id, answer_id)?;
        track_behavior(
            &mut self.profile,
            &self.config,
            "question_answered",
            Some(serde_json::json!({ "question_id": question_id })),
        );
        Ok(())
    }

    /// Skip a skippable question and track the interaction.
    pub fn skip_question(&mut self, question_id: &str) -> Result<()> {
        self.quiz.skip_question(&self.catalog, question_id)?;
        track_behavior(
            &mut self.profile,
            &self.config,
            "question_skipped",
            Some(serde_json::json!({ "question_id": question_id })),
        );
        Ok(())
    }

    /// Finalize the quiz: classify, seed the lead score and re-run rules.
    ///
    /// The demographic bucket is rebuilt from the final answer map each time,
    /// so re-finalizing after changed answers never drifts. Classification of
    /// an empty quiz resolves to [`PersonaId::Unknown`] and seeds no
    /// alignment points.
    pub fn complete_quiz(&mut self) -> QuizResult {
        let result = calculate_results(&self.quiz);
        self.profile.determined_persona = Some(result.primary);

        // Demographic sub-score derives entirely from the quiz.
        let mut demographic = ScoreBucket::new();
        for (question_id, answer_id) in self.quiz.answers() {
            if let Ok(option) = self.catalog.option(question_id, answer_id) {
                for weight in &option.demographic_weights {
                    demographic.apply(
                        &self.config.demographic,
                        &weight.category,
                        weight.points as i32,
                    );
                }
            }
        }
        if !result.primary.is_fallback() {
            if result.confidence >= self.config.alignment.strong_min_confidence {
                demographic.award(&self.config.demographic, categories::PERSONA_ALIGNMENT_STRONG);
            } else if result.confidence >= self.config.alignment.medium_min_confidence {
                demographic.award(&self.config.demographic, categories::PERSONA_ALIGNMENT_MEDIUM);
            }
        }
        self.profile.lead_score.demographic = demographic;

        self.profile
            .lead_score
            .behavioral
            .award(&self.config.behavioral, categories::QUIZ_COMPLETION);

        track_behavior(
            &mut self.profile,
            &self.config,
            "quiz_completed",
            Some(serde_json::json!({
                "persona": result.primary.as_str(),
                "confidence": result.confidence,
            })),
        );
        info!(
            "quiz classified visitor as {} (confidence {:.1})",
            result.primary, result.confidence
        );

        self.quiz_result = Some(result.clone());
        self.rescore();
        self.refresh_rules();
        result
    }

    // ---- tracking and scoring --------------------------------------------

    /// Track a behavioral event and run every downstream update: lead-score
    /// buckets, service-inquiry state, stage derivation and a fresh rule
    /// pass. Returns `false` (and changes nothing) when the privacy gate is
    /// closed.
    pub fn track_event(&mut self, event: &str, details: Option<Value>) -> bool {
        if !track_behavior(&mut self.profile, &self.config, event, details) {
            return false;
        }

        if let Some(category) = behavioral_category_for(event) {
            self.profile
                .lead_score
                .behavioral
                .award(&self.config.behavioral, category);
        }
        if let Some(category) = engagement_quality_category_for(event) {
            self.profile
                .lead_score
                .engagement_quality
                .award(&self.config.engagement_quality, category);
        }
        // Three page views within the retained history counts as frequent.
        if event == "page_view" && self.profile.interaction_count("page_view") >= 3 {
            self.profile
                .lead_score
                .engagement_quality
                .award(&self.config.engagement_quality, categories::SITE_VISIT_FREQUENCY_HIGH);
        }

        self.update_service_inquiry(event);
        self.rescore();
        if is_qualifying_event(event) {
            let total = self.total_score();
            self.profile.lead_stage =
                apply_qualifying_event(self.profile.lead_stage, total, &self.config.stage_thresholds);
        }
        self.refresh_rules();
        true
    }

    fn update_service_inquiry(&mut self, event: &str) {
        let next = match event {
            "service_inquiry_started" => ServiceInquiryState::Started,
            "service_inquiry_completed" => ServiceInquiryState::Submitted,
            "calendar_booking_made" => ServiceInquiryState::ConsultBooked,
            _ => return,
        };
        if self.profile.service_inquiry_state != next {
            debug!(
                "service inquiry state {:?} -> {next:?}",
                self.profile.service_inquiry_state
            );
            self.profile.service_inquiry_state = next;
        }
    }

    /// External business promotion (purchase, advocacy). Monotonic.
    pub fn promote_stage(&mut self, stage: LeadStage) {
        let next = promote(self.profile.lead_stage, stage);
        if next != self.profile.lead_stage {
            info!("lead stage promoted {:?} -> {next:?}", self.profile.lead_stage);
            self.profile.lead_stage = next;
        }
    }

    /// Live grand total of the three capped sub-scores.
    pub fn total_score(&self) -> u32 {
        self.profile.lead_score.total_score(&self.config)
    }

    /// Re-derive the lead stage from the current total. Holds at or past
    /// `Opportunity` regardless of score.
    fn rescore(&mut self) {
        let total = self.total_score();
        let next = derive_lead_stage(total, self.profile.lead_stage, &self.config.stage_thresholds);
        if next != self.profile.lead_stage {
            debug!(
                "lead stage {:?} -> {next:?} (total {total})",
                self.profile.lead_stage
            );
            self.profile.lead_stage = next;
        }
    }

    /// Re-run the rule pass against current state.
    pub fn refresh_rules(&mut self) -> ContentPatch {
        let patch = apply_rules(&mut self.profile, &self.config, &self.rules);
        self.last_patch = patch.clone();
        patch
    }

    // ---- persistence -----------------------------------------------------

    /// Durable snapshot of personalization, quiz and scoring state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            personalization: PersonalizationSnapshot {
                current_persona: self.profile.determined_persona,
                behavior_score: self.profile.engagement_score,
                engagement_level: self.profile.engagement_level,
                consent_given: self.profile.consent_given,
            },
            quiz: self.quiz.snapshot(),
            lead_score: self.profile.lead_score.clone(),
            lead_stage: self.profile.lead_stage,
            service_inquiry_state: self.profile.service_inquiry_state,
            is_email_subscriber: self.profile.is_email_subscriber,
            ab_test_groups: self.profile.ab_test_groups.clone(),
        }
    }

    /// Rehydrate a persisted snapshot and mark the visitor as returning.
    /// Restoring replays no side effects: scores and stage are taken
    /// verbatim, nothing is re-tracked or re-awarded.
    pub fn load_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.profile.determined_persona = snapshot.personalization.current_persona;
        self.profile.engagement_score = snapshot.personalization.behavior_score.min(100);
        self.profile.engagement_level = snapshot.personalization.engagement_level;
        self.profile.consent_given = snapshot.personalization.consent_given;
        self.profile.lead_score = snapshot.lead_score;
        self.profile.lead_stage = snapshot.lead_stage;
        self.profile.service_inquiry_state = snapshot.service_inquiry_state;
        self.profile.is_email_subscriber = snapshot.is_email_subscriber;
        self.profile.ab_test_groups = snapshot.ab_test_groups;
        self.profile.is_first_time_visitor = false;
        self.quiz.load_state(snapshot.quiz);
    }

    // ---- reporting -------------------------------------------------------

    /// Assemble the read-only view dashboards consume.
    pub fn report(&self) -> SessionReport {
        let (hero_cta, quiz_prompt_cta) = smart_cta(self.profile.engagement_level);
        SessionReport {
            generated_at: Utc::now(),
            persona: self.profile.determined_persona,
            quiz_result: self.quiz_result.clone(),
            engagement_score: self.profile.engagement_score,
            engagement_level: self.profile.engagement_level,
            behavioral_subtotal: self
                .profile
                .lead_score
                .behavioral
                .subtotal(&self.config.behavioral),
            demographic_subtotal: self
                .profile
                .lead_score
                .demographic
                .subtotal(&self.config.demographic),
            engagement_quality_subtotal: self
                .profile
                .lead_score
                .engagement_quality
                .subtotal(&self.config.engagement_quality),
            total_score: self.total_score(),
            lead_stage: self.profile.lead_stage,
            service_inquiry_state: self.profile.service_inquiry_state,
            events_recorded: self.profile.interaction_history.len(),
            patch: self.last_patch.clone(),
            hero_headline: hero_headline(&self.profile).to_string(),
            hero_cta,
            quiz_prompt_cta,
            exit_content: exit_content_for(self.profile.determined_persona),
        }
    }
}

impl Default for VisitorSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consenting_session() -> VisitorSession {
        let mut session = VisitorSession::new();
        session.set_consent(true);
        session
    }

    #[test]
    fn test_quiz_completion_seeds_lead_score() {
        let mut session = consenting_session();
        session.start_quiz();
        session.answer_question("q1_status", "a3").unwrap(); // stage 8
        session.answer_question("q2_revenue", "b3").unwrap(); // budget 10
        let result = session.complete_quiz();
        assert_eq!(result.primary, PersonaId::Scale);

        let config = session.config().clone();
        let demographic = &session.profile.lead_score.demographic;
        assert_eq!(demographic.category_value("business_stage_appropriate"), 8);
        assert_eq!(demographic.category_value("budget_indication_positive"), 10);
        // Confidence is well above the strong threshold.
        assert_eq!(demographic.category_value(categories::PERSONA_ALIGNMENT_STRONG), 15);
        assert_eq!(
            session
                .profile
                .lead_score
                .behavioral
                .category_value(categories::QUIZ_COMPLETION),
            15
        );
        // 8 + 10 + 15 = 33 raw demographic, clamped to the 30-point cap.
        assert_eq!(
            session.profile.lead_score.demographic.subtotal(&config.demographic),
            30
        );
        assert_eq!(session.total_score(), 15 + 30);
    }

    #[test]
    fn test_refinalizing_quiz_does_not_drift() {
        let mut session = consenting_session();
        session.start_quiz();
        session.answer_question("q1_status", "a3").unwrap();
        session.complete_quiz();
        let first_total = session.total_score();
        session.complete_quiz();
        assert_eq!(session.total_score(), first_total);
    }

    #[test]
    fn test_empty_quiz_resolves_unknown_without_alignment() {
        let mut session = consenting_session();
        session.start_quiz();
        let result = session.complete_quiz();
        assert_eq!(result.primary, PersonaId::Unknown);
        assert_eq!(
            session
                .profile
                .lead_score
                .demographic
                .category_value(categories::PERSONA_ALIGNMENT_STRONG),
            0
        );
    }

    #[test]
    fn test_tracked_event_updates_all_layers() {
        let mut session = consenting_session();
        assert!(session.track_event("calendar_booking_made", None));
        assert_eq!(
            session
                .profile
                .lead_score
                .behavioral
                .category_value(categories::CALENDAR_BOOKING_MADE),
            25
        );
        assert_eq!(
            session.profile.service_inquiry_state,
            ServiceInquiryState::ConsultBooked
        );
        assert_eq!(session.profile.lead_stage, LeadStage::IdentifiedProspect);
    }

    #[test]
    fn test_gate_closed_changes_nothing() {
        let mut session = VisitorSession::new();
        assert!(!session.track_event("calendar_booking_made", None));
        assert_eq!(session.total_score(), 0);
        assert_eq!(
            session.profile.service_inquiry_state,
            ServiceInquiryState::None
        );
    }

    #[test]
    fn test_score_81_without_qualifying_event_stays_sql() {
        let mut session = consenting_session();
        // Max out behavioral (50) and demographic paths via direct awards.
        for category in [
            categories::QUIZ_COMPLETION,
            categories::SERVICE_INQUIRY_MADE,
            categories::CALENDAR_BOOKING_MADE,
        ] {
            let config = session.config().clone();
            session
                .profile
                .lead_score
                .behavioral
                .award(&config.behavioral, category);
        }
        let config = session.config().clone();
        for category in ["business_stage_appropriate", "budget_indication_positive", "persona_alignment_strong"] {
            session
                .profile
                .lead_score
                .demographic
                .award(&config.demographic, category);
        }
        session.set_email_subscriber(true);
        assert!(session.total_score() >= 81);
        assert_eq!(session.profile.lead_stage, LeadStage::SalesQualifiedLead);

        // The qualifying event is what promotes to Opportunity.
        session.track_event("service_inquiry_completed", None);
        assert_eq!(session.profile.lead_stage, LeadStage::Opportunity);
    }

    #[test]
    fn test_terminal_promotion_holds_against_score() {
        let mut session = consenting_session();
        session.promote_stage(LeadStage::Customer);
        assert_eq!(session.profile.lead_stage, LeadStage::Customer);
        session.track_event("page_view", None);
        assert_eq!(session.profile.lead_stage, LeadStage::Customer);
        // Promotions never regress.
        session.promote_stage(LeadStage::EngagedLead);
        assert_eq!(session.profile.lead_stage, LeadStage::Customer);
    }

    #[test]
    fn test_snapshot_round_trip_replays_no_side_effects() {
        let mut session = consenting_session();
        session.start_quiz();
        session.answer_question("q1_status", "a1").unwrap();
        session.track_event("video_completed", None);
        session.set_email_subscriber(true);
        let snapshot = session.snapshot();
        let total = session.total_score();
        let engagement = session.profile.engagement_score;

        let serialized = serde_json::to_string(&snapshot).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&serialized).unwrap();

        let mut restored = VisitorSession::new();
        restored.load_snapshot(parsed);
        assert_eq!(restored.total_score(), total);
        assert_eq!(restored.profile.engagement_score, engagement);
        assert!(!restored.profile.is_first_time_visitor);
        assert_eq!(restored.quiz.answers(), session.quiz.answers());

        // Loading twice must not double-count anything.
        restored.load_snapshot(session.snapshot());
        assert_eq!(restored.total_score(), total);
    }

    #[test]
    fn test_report_reflects_session_state() {
        let mut session = consenting_session();
        session.set_viewport_width(390);
        session.track_event("page_view", None);
        let report = session.report();
        // page_view plus the rule_applied audit event from the mobile rule.
        assert_eq!(report.events_recorded, 2);
        assert_eq!(report.engagement_level, EngagementLevel::Low);
        assert_eq!(report.hero_cta.action, "quiz");
        // Mobile rule applied in the last pass.
        assert_eq!(
            report.patch.slot_value("navigation:main-nav"),
            Some("simplified")
        );
    }
}
