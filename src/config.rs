//! Scoring configuration: point tables, caps, thresholds and breakpoints.
//!
//! All tunable numbers live here so deployments can re-weight scoring without
//! touching engine code. `.leadmap.toml` overrides any subset of fields; the
//! defaults reproduce the production tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::{EngineError, Result};

/// Engagement-score increments per tracked event name, plus the level
/// breakpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Points added to the engagement score per event name.
    #[serde(default = "default_engagement_increments")]
    pub increments: BTreeMap<String, u32>,

    /// Increment for event names not present in the table. Never zero, so
    /// any tracked interaction moves the needle.
    #[serde(default = "default_unrecognized_increment")]
    pub default_increment: u32,

    /// Scores below this are `Low`.
    #[serde(default = "default_medium_breakpoint")]
    pub medium_breakpoint: u32,

    /// Scores below this (and at or above `medium_breakpoint`) are `Medium`;
    /// everything else is `High`.
    #[serde(default = "default_high_breakpoint")]
    pub high_breakpoint: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            increments: default_engagement_increments(),
            default_increment: default_unrecognized_increment(),
            medium_breakpoint: default_medium_breakpoint(),
            high_breakpoint: default_high_breakpoint(),
        }
    }
}

impl EngagementConfig {
    /// Increment for an event name, falling back to the default increment.
    pub fn increment_for(&self, event: &str) -> u32 {
        self.increments
            .get(event)
            .copied()
            .unwrap_or(self.default_increment.max(1))
    }
}

fn default_engagement_increments() -> BTreeMap<String, u32> {
    [
        ("page_view", 1),
        ("content_engagement", 3),
        ("video_watch", 5),
        ("download", 7),
        ("form_submit", 10),
        ("service_inquiry", 15),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_unrecognized_increment() -> u32 {
    1
}
fn default_medium_breakpoint() -> u32 {
    30
}
fn default_high_breakpoint() -> u32 {
    70
}

/// One lead-score bucket: a cap and the point value awarded per category.
///
/// A category's configured point value doubles as its contribution cap, so
/// repeated awards for the same category saturate instead of accumulating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Upper bound for the whole bucket's sub-total.
    pub max_points: u32,

    /// Points awarded (and cap) per named category.
    pub points: BTreeMap<String, u32>,

    /// Points for categories not in the table (0 disables them).
    #[serde(default)]
    pub default_points: u32,
}

impl BucketConfig {
    /// Award size for a category, falling back to `default_points`.
    pub fn points_for(&self, category: &str) -> u32 {
        self.points
            .get(category)
            .copied()
            .unwrap_or(self.default_points)
    }

    /// Per-category contribution cap: the configured point value, or the
    /// bucket cap for unconfigured categories.
    pub fn category_cap(&self, category: &str) -> u32 {
        self.points
            .get(category)
            .copied()
            .unwrap_or(self.max_points)
    }
}

fn default_behavioral_bucket() -> BucketConfig {
    BucketConfig {
        max_points: 50,
        points: [
            ("quiz_completion", 15),
            ("video_engagement_75_plus", 10),
            ("tool_usage_completed", 8),
            ("multiple_page_visits_high_value", 5),
            ("resource_downloaded_with_email", 7),
            ("pricing_page_extended_visit", 12),
            ("service_inquiry_made", 20),
            ("calendar_booking_made", 25),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        default_points: 1,
    }
}

fn default_demographic_bucket() -> BucketConfig {
    BucketConfig {
        max_points: 30,
        points: [
            ("persona_alignment_strong", 15),
            ("persona_alignment_medium", 7),
            ("business_stage_appropriate", 10),
            ("budget_indication_positive", 15),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        default_points: 0,
    }
}

fn default_engagement_quality_bucket() -> BucketConfig {
    BucketConfig {
        max_points: 20,
        points: [
            ("email_interaction_positive", 8),
            ("social_media_engagement_high", 5),
            ("community_participation_active", 7),
            ("site_visit_frequency_high", 4),
            ("session_duration_long", 3),
            ("email_subscription", 5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        default_points: 0,
    }
}

/// Ascending score thresholds for the score-driven lead stages.
///
/// `Opportunity` shares the top threshold but is only reachable through an
/// explicit qualifying event; it is never derived from score alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageThresholds {
    #[serde(default = "default_identified_prospect")]
    pub identified_prospect: u32,
    #[serde(default = "default_engaged_lead")]
    pub engaged_lead: u32,
    #[serde(default = "default_marketing_qualified")]
    pub marketing_qualified: u32,
    #[serde(default = "default_sales_qualified")]
    pub sales_qualified: u32,
    #[serde(default = "default_opportunity")]
    pub opportunity: u32,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            identified_prospect: default_identified_prospect(),
            engaged_lead: default_engaged_lead(),
            marketing_qualified: default_marketing_qualified(),
            sales_qualified: default_sales_qualified(),
            opportunity: default_opportunity(),
        }
    }
}

fn default_identified_prospect() -> u32 {
    21
}
fn default_engaged_lead() -> u32 {
    41
}
fn default_marketing_qualified() -> u32 {
    61
}
fn default_sales_qualified() -> u32 {
    81
}
fn default_opportunity() -> u32 {
    81
}

/// Persona-alignment demographic awards derived from quiz confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Confidence (0-100) at or above which alignment counts as strong.
    #[serde(default = "default_strong_confidence")]
    pub strong_min_confidence: f64,
    /// Confidence at or above which alignment counts as medium.
    #[serde(default = "default_medium_confidence")]
    pub medium_min_confidence: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            strong_min_confidence: default_strong_confidence(),
            medium_min_confidence: default_medium_confidence(),
        }
    }
}

fn default_strong_confidence() -> f64 {
    60.0
}
fn default_medium_confidence() -> f64 {
    30.0
}

/// History retention limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Interaction events kept on a profile; oldest are evicted beyond this.
    #[serde(default = "default_max_interaction_events")]
    pub max_interaction_events: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_interaction_events: default_max_interaction_events(),
        }
    }
}

fn default_max_interaction_events() -> usize {
    100
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadmapConfig {
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default = "default_behavioral_bucket")]
    pub behavioral: BucketConfig,
    #[serde(default = "default_demographic_bucket")]
    pub demographic: BucketConfig,
    #[serde(default = "default_engagement_quality_bucket")]
    pub engagement_quality: BucketConfig,
    #[serde(default)]
    pub stage_thresholds: StageThresholds,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl Default for LeadmapConfig {
    fn default() -> Self {
        Self {
            engagement: EngagementConfig::default(),
            behavioral: default_behavioral_bucket(),
            demographic: default_demographic_bucket(),
            engagement_quality: default_engagement_quality_bucket(),
            stage_thresholds: StageThresholds::default(),
            alignment: AlignmentConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}

impl LeadmapConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: LeadmapConfig = toml::from_str(&content)
            .map_err(|e| EngineError::configuration(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.leadmap.toml` from the working directory if present, otherwise
    /// fall back to defaults.
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new(".leadmap.toml");
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate internal consistency of the tables.
    pub fn validate(&self) -> Result<()> {
        if self.engagement.medium_breakpoint >= self.engagement.high_breakpoint {
            return Err(EngineError::configuration(format!(
                "engagement breakpoints must be ascending (medium {} >= high {})",
                self.engagement.medium_breakpoint, self.engagement.high_breakpoint
            )));
        }
        if self.engagement.default_increment == 0 {
            return Err(EngineError::configuration(
                "engagement default_increment must be at least 1",
            ));
        }
        let thresholds = [
            self.stage_thresholds.identified_prospect,
            self.stage_thresholds.engaged_lead,
            self.stage_thresholds.marketing_qualified,
            self.stage_thresholds.sales_qualified,
        ];
        if !thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err(EngineError::configuration(
                "stage thresholds must be strictly ascending",
            ));
        }
        if self.stage_thresholds.opportunity < self.stage_thresholds.sales_qualified {
            return Err(EngineError::configuration(
                "opportunity threshold cannot be below sales_qualified",
            ));
        }
        let cap_total =
            self.behavioral.max_points + self.demographic.max_points + self.engagement_quality.max_points;
        if cap_total > 100 {
            return Err(EngineError::configuration(format!(
                "bucket caps sum to {cap_total}, exceeding the 100-point total"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LeadmapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.behavioral.max_points, 50);
        assert_eq!(config.demographic.max_points, 30);
        assert_eq!(config.engagement_quality.max_points, 20);
    }

    #[test]
    fn test_engagement_increment_lookup() {
        let config = EngagementConfig::default();
        assert_eq!(config.increment_for("form_submit"), 10);
        assert_eq!(config.increment_for("service_inquiry"), 15);
        // Unrecognized names always contribute at least 1.
        assert_eq!(config.increment_for("never_seen_before"), 1);
    }

    #[test]
    fn test_bucket_category_caps() {
        let bucket = default_behavioral_bucket();
        assert_eq!(bucket.points_for("calendar_booking_made"), 25);
        assert_eq!(bucket.category_cap("calendar_booking_made"), 25);
        assert_eq!(bucket.points_for("mystery_event"), 1);
        assert_eq!(bucket.category_cap("mystery_event"), 50);
    }

    #[test]
    fn test_invalid_breakpoints_rejected() {
        let mut config = LeadmapConfig::default();
        config.engagement.medium_breakpoint = 80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cap_overflow_rejected() {
        let mut config = LeadmapConfig::default();
        config.behavioral.max_points = 90;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LeadmapConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: LeadmapConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.behavioral.max_points, config.behavioral.max_points);
        assert_eq!(
            parsed.engagement.increments["form_submit"],
            config.engagement.increments["form_submit"]
        );
    }
}
