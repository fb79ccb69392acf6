//! Lead-score aggregation and lifecycle-stage derivation.
//!
//! A lead score is the sum of three independently capped buckets: behavioral
//! (max 50), demographic (max 30) and engagement quality (max 20). Each
//! bucket tracks per-category contributions; a category saturates at its
//! configured point value and the bucket subtotal clamps to its cap, so the
//! grand total can never exceed 100. The total is always computed from the
//! buckets, never stored, which rules out drift.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::{BucketConfig, LeadmapConfig, StageThresholds};
use crate::core::LeadStage;

/// Well-known scoring category names. The vocabulary is open (unknown
/// categories fall back to the bucket's default points), but these are the
/// categories the engine itself awards.
pub mod categories {
    pub const QUIZ_COMPLETION: &str = "quiz_completion";
    pub const VIDEO_ENGAGEMENT_75_PLUS: &str = "video_engagement_75_plus";
    pub const TOOL_USAGE_COMPLETED: &str = "tool_usage_completed";
    pub const MULTIPLE_PAGE_VISITS_HIGH_VALUE: &str = "multiple_page_visits_high_value";
    pub const RESOURCE_DOWNLOADED_WITH_EMAIL: &str = "resource_downloaded_with_email";
    pub const PRICING_PAGE_EXTENDED_VISIT: &str = "pricing_page_extended_visit";
    pub const SERVICE_INQUIRY_MADE: &str = "service_inquiry_made";
    pub const CALENDAR_BOOKING_MADE: &str = "calendar_booking_made";

    pub const PERSONA_ALIGNMENT_STRONG: &str = "persona_alignment_strong";
    pub const PERSONA_ALIGNMENT_MEDIUM: &str = "persona_alignment_medium";
    pub const BUSINESS_STAGE_APPROPRIATE: &str = "business_stage_appropriate";
    pub const BUDGET_INDICATION_POSITIVE: &str = "budget_indication_positive";

    pub const EMAIL_SUBSCRIPTION: &str = "email_subscription";
    pub const SITE_VISIT_FREQUENCY_HIGH: &str = "site_visit_frequency_high";
    pub const SESSION_DURATION_LONG: &str = "session_duration_long";
    pub const COMMUNITY_PARTICIPATION_ACTIVE: &str = "community_participation_active";
}

/// Business events that qualify a lead for `Opportunity` once the score
/// threshold is also met.
pub const QUALIFYING_EVENTS: [&str; 2] = ["service_inquiry_completed", "calendar_booking_made"];

/// True if the event name is an Opportunity-qualifying business event.
pub fn is_qualifying_event(event: &str) -> bool {
    QUALIFYING_EVENTS.contains(&event)
}

/// Per-category contributions for one scoring bucket.
///
/// Contributions are stored category-capped; the subtotal clamps to the
/// bucket cap on read.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBucket {
    contributions: HashMap<String, u32>,
}

impl ScoreBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a point delta to a category. Positive deltas saturate at the
    /// category's configured cap; negative deltas saturate at zero. Returns
    /// the category's new value.
    pub fn apply(&mut self, config: &BucketConfig, category: &str, delta: i32) -> u32 {
        let cap = config.category_cap(category);
        let current = self.contributions.get(category).copied().unwrap_or(0);
        let next = if delta >= 0 {
            current.saturating_add(delta as u32).min(cap)
        } else {
            current.saturating_sub(delta.unsigned_abs())
        };
        self.contributions.insert(category.to_string(), next);
        next
    }

    /// Award the configured points for a category. Saturating: awarding the
    /// same category twice does not exceed its cap.
    pub fn award(&mut self, config: &BucketConfig, category: &str) -> u32 {
        let points = config.points_for(category) as i32;
        self.apply(config, category, points)
    }

    /// Current value for one category.
    pub fn category_value(&self, category: &str) -> u32 {
        self.contributions.get(category).copied().unwrap_or(0)
    }

    /// Bucket subtotal, clamped to the bucket cap.
    pub fn subtotal(&self, config: &BucketConfig) -> u32 {
        let raw: u32 = self.contributions.values().sum();
        raw.min(config.max_points)
    }

    /// Raw uncapped sum, exposed for reporting.
    pub fn raw_sum(&self) -> u32 {
        self.contributions.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Contributions in deterministic (sorted) order, for reports.
    pub fn entries(&self) -> Vec<(String, u32)> {
        let mut entries: Vec<_> = self
            .contributions
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort();
        entries
    }
}

/// The three capped sub-scores making up a lead score.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadScoreComponents {
    pub behavioral: ScoreBucket,
    pub demographic: ScoreBucket,
    pub engagement_quality: ScoreBucket,
}

impl LeadScoreComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a behavioral point delta for a category.
    pub fn apply_behavioral(&mut self, config: &LeadmapConfig, category: &str, delta: i32) -> u32 {
        self.behavioral.apply(&config.behavioral, category, delta)
    }

    /// Apply a demographic point delta for a category.
    pub fn apply_demographic(&mut self, config: &LeadmapConfig, category: &str, delta: i32) -> u32 {
        self.demographic.apply(&config.demographic, category, delta)
    }

    /// Apply an engagement-quality point delta for a category.
    pub fn apply_engagement_quality(
        &mut self,
        config: &LeadmapConfig,
        category: &str,
        delta: i32,
    ) -> u32 {
        self.engagement_quality
            .apply(&config.engagement_quality, category, delta)
    }

    /// Grand total: the live sum of the three clamped subtotals. Never
    /// independently settable.
    pub fn total_score(&self, config: &LeadmapConfig) -> u32 {
        self.behavioral.subtotal(&config.behavioral)
            + self.demographic.subtotal(&config.demographic)
            + self
                .engagement_quality
                .subtotal(&config.engagement_quality)
    }
}

/// Map a total score to the highest threshold stage reached among the
/// score-driven stages.
///
/// Stages at or past `Opportunity` hold regardless of score: `Opportunity`
/// is reachable only through [`apply_qualifying_event`], and the terminal
/// stages only through [`promote`].
pub fn derive_lead_stage(
    total_score: u32,
    current: LeadStage,
    thresholds: &StageThresholds,
) -> LeadStage {
    if current.holds_against_score() {
        return current;
    }
    if total_score >= thresholds.sales_qualified {
        LeadStage::SalesQualifiedLead
    } else if total_score >= thresholds.marketing_qualified {
        LeadStage::MarketingQualifiedLead
    } else if total_score >= thresholds.engaged_lead {
        LeadStage::EngagedLead
    } else if total_score >= thresholds.identified_prospect {
        LeadStage::IdentifiedProspect
    } else {
        LeadStage::AnonymousVisitor
    }
}

/// External promotion to a later stage. Monotonic: a promotion below the
/// current stage is ignored.
pub fn promote(current: LeadStage, target: LeadStage) -> LeadStage {
    current.max(target)
}

/// Side-channel promotion to `Opportunity`: requires both the qualifying
/// business event (the caller's responsibility to detect) and the score
/// threshold. Score alone stops at `SalesQualifiedLead`.
pub fn apply_qualifying_event(
    current: LeadStage,
    total_score: u32,
    thresholds: &StageThresholds,
) -> LeadStage {
    if current.is_terminal() {
        return current;
    }
    if total_score >= thresholds.opportunity {
        promote(current, LeadStage::Opportunity)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LeadmapConfig {
        LeadmapConfig::default()
    }

    #[test]
    fn test_category_award_saturates_at_category_cap() {
        let config = config();
        let mut bucket = ScoreBucket::new();
        bucket.award(&config.behavioral, categories::QUIZ_COMPLETION);
        assert_eq!(bucket.category_value(categories::QUIZ_COMPLETION), 15);
        // Second award saturates, no double-count.
        bucket.award(&config.behavioral, categories::QUIZ_COMPLETION);
        assert_eq!(bucket.category_value(categories::QUIZ_COMPLETION), 15);
    }

    #[test]
    fn test_subtotal_clamps_to_bucket_cap() {
        let config = config();
        let mut bucket = ScoreBucket::new();
        for category in [
            categories::QUIZ_COMPLETION,
            categories::SERVICE_INQUIRY_MADE,
            categories::CALENDAR_BOOKING_MADE,
        ] {
            bucket.award(&config.behavioral, category);
        }
        // 15 + 20 + 25 = 60 raw, clamped to the 50-point behavioral cap.
        assert_eq!(bucket.raw_sum(), 60);
        assert_eq!(bucket.subtotal(&config.behavioral), 50);
    }

    #[test]
    fn test_negative_delta_saturates_at_zero() {
        let config = config();
        let mut bucket = ScoreBucket::new();
        bucket.apply(&config.behavioral, categories::TOOL_USAGE_COMPLETED, 5);
        bucket.apply(&config.behavioral, categories::TOOL_USAGE_COMPLETED, -20);
        assert_eq!(bucket.category_value(categories::TOOL_USAGE_COMPLETED), 0);
    }

    #[test]
    fn test_total_never_exceeds_100() {
        let config = config();
        let mut components = LeadScoreComponents::new();
        for (category, _) in config.behavioral.points.iter() {
            components.apply_behavioral(&config, category, 1000);
        }
        for (category, _) in config.demographic.points.iter() {
            components.apply_demographic(&config, category, 1000);
        }
        for (category, _) in config.engagement_quality.points.iter() {
            components.apply_engagement_quality(&config, category, 1000);
        }
        assert_eq!(components.total_score(&config), 100);
    }

    #[test]
    fn test_stage_thresholds() {
        let thresholds = StageThresholds::default();
        let anon = LeadStage::AnonymousVisitor;
        assert_eq!(derive_lead_stage(0, anon, &thresholds), anon);
        assert_eq!(
            derive_lead_stage(21, anon, &thresholds),
            LeadStage::IdentifiedProspect
        );
        assert_eq!(derive_lead_stage(41, anon, &thresholds), LeadStage::EngagedLead);
        assert_eq!(
            derive_lead_stage(61, anon, &thresholds),
            LeadStage::MarketingQualifiedLead
        );
        assert_eq!(
            derive_lead_stage(81, anon, &thresholds),
            LeadStage::SalesQualifiedLead
        );
        // Score alone never derives Opportunity.
        assert_eq!(
            derive_lead_stage(100, anon, &thresholds),
            LeadStage::SalesQualifiedLead
        );
    }

    #[test]
    fn test_stage_regresses_below_opportunity_only() {
        let thresholds = StageThresholds::default();
        // Below Opportunity a score drop re-derives downward.
        assert_eq!(
            derive_lead_stage(10, LeadStage::SalesQualifiedLead, &thresholds),
            LeadStage::AnonymousVisitor
        );
        // At or past Opportunity the stage holds.
        assert_eq!(
            derive_lead_stage(0, LeadStage::Opportunity, &thresholds),
            LeadStage::Opportunity
        );
        assert_eq!(
            derive_lead_stage(0, LeadStage::Customer, &thresholds),
            LeadStage::Customer
        );
    }

    #[test]
    fn test_qualifying_event_requires_threshold() {
        let thresholds = StageThresholds::default();
        assert_eq!(
            apply_qualifying_event(LeadStage::EngagedLead, 50, &thresholds),
            LeadStage::EngagedLead
        );
        assert_eq!(
            apply_qualifying_event(LeadStage::SalesQualifiedLead, 85, &thresholds),
            LeadStage::Opportunity
        );
    }

    #[test]
    fn test_promote_is_monotonic() {
        assert_eq!(
            promote(LeadStage::Customer, LeadStage::Opportunity),
            LeadStage::Customer
        );
        assert_eq!(
            promote(LeadStage::Opportunity, LeadStage::Customer),
            LeadStage::Customer
        );
    }
}
