//! Consent-gated behavioral tracking.
//!
//! Tracking is the privacy boundary of the engine: without consent and an
//! enabled personalization flag every call is a silent no-op, not an error.
//! Event names are an open vocabulary so external collaborators (performance
//! monitors, error trackers, A/B frameworks) can funnel in new event types
//! without touching this module.

use log::{debug, trace};
use serde_json::Value;

use crate::config::{EngagementConfig, LeadmapConfig};
use crate::core::{EngagementLevel, InteractionEvent, VisitorProfile};

/// Bucket an engagement score against the configured breakpoints.
pub fn engagement_level_for(score: u32, config: &EngagementConfig) -> EngagementLevel {
    if score < config.medium_breakpoint {
        EngagementLevel::Low
    } else if score < config.high_breakpoint {
        EngagementLevel::Medium
    } else {
        EngagementLevel::High
    }
}

/// Set the engagement score, clamped to [0, 100], and re-derive the level.
pub fn update_engagement_score(profile: &mut VisitorProfile, config: &LeadmapConfig, score: i64) {
    profile.engagement_score = score.clamp(0, 100) as u32;
    profile.engagement_level = engagement_level_for(profile.engagement_score, &config.engagement);
}

/// Record a behavioral event against the profile.
///
/// Appends a timestamped interaction (bounded retention, oldest evicted) and
/// bumps the engagement score by the configured increment for the event name
/// (default increment for unrecognized names, never zero). Returns `false`
/// when the privacy gate swallowed the event.
pub fn track_behavior(
    profile: &mut VisitorProfile,
    config: &LeadmapConfig,
    event: &str,
    details: Option<Value>,
) -> bool {
    if !profile.consent_given || !profile.personalization_enabled {
        trace!("dropping '{event}': consent or personalization gate closed");
        return false;
    }

    let interaction = match details {
        Some(details) => InteractionEvent::with_details(event, details),
        None => InteractionEvent::new(event),
    };
    profile.push_interaction(interaction, config.retention.max_interaction_events);

    let increment = config.engagement.increment_for(event);
    let previous_level = profile.engagement_level;
    let target = i64::from(profile.engagement_score) + i64::from(increment);
    update_engagement_score(profile, config, target);
    if profile.engagement_level != previous_level {
        debug!(
            "engagement level {} -> {} (score {})",
            previous_level.label(),
            profile.engagement_level.label(),
            profile.engagement_score
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeadmapConfig;

    fn consenting_profile() -> VisitorProfile {
        let mut profile = VisitorProfile::new();
        profile.consent_given = true;
        profile
    }

    #[test]
    fn test_tracking_without_consent_is_silent_noop() {
        let config = LeadmapConfig::default();
        let mut profile = VisitorProfile::new();
        assert!(!track_behavior(&mut profile, &config, "page_view", None));
        assert_eq!(profile.engagement_score, 0);
        assert!(profile.interaction_history.is_empty());
    }

    #[test]
    fn test_tracking_with_personalization_disabled_is_silent_noop() {
        let config = LeadmapConfig::default();
        let mut profile = consenting_profile();
        profile.personalization_enabled = false;
        assert!(!track_behavior(&mut profile, &config, "page_view", None));
        assert!(profile.interaction_history.is_empty());
    }

    #[test]
    fn test_form_submit_scores_ten_and_stays_low() {
        let config = LeadmapConfig::default();
        let mut profile = consenting_profile();
        assert!(track_behavior(&mut profile, &config, "form_submit", None));
        assert_eq!(profile.engagement_score, 10);
        // Breakpoint table: low < 30, so 10 stays Low.
        assert_eq!(profile.engagement_level, EngagementLevel::Low);
        assert!(profile.has_interaction("form_submit"));
    }

    #[test]
    fn test_unrecognized_event_always_moves_the_needle() {
        let config = LeadmapConfig::default();
        let mut profile = consenting_profile();
        track_behavior(&mut profile, &config, "totally_new_tracker_event", None);
        assert_eq!(profile.engagement_score, 1);
    }

    #[test]
    fn test_score_clamps_at_100() {
        let config = LeadmapConfig::default();
        let mut profile = consenting_profile();
        for _ in 0..20 {
            track_behavior(&mut profile, &config, "service_inquiry", None);
        }
        assert_eq!(profile.engagement_score, 100);
        assert_eq!(profile.engagement_level, EngagementLevel::High);
    }

    #[test]
    fn test_level_breakpoints() {
        let config = EngagementConfig::default();
        assert_eq!(engagement_level_for(0, &config), EngagementLevel::Low);
        assert_eq!(engagement_level_for(29, &config), EngagementLevel::Low);
        assert_eq!(engagement_level_for(30, &config), EngagementLevel::Medium);
        assert_eq!(engagement_level_for(69, &config), EngagementLevel::Medium);
        assert_eq!(engagement_level_for(70, &config), EngagementLevel::High);
        assert_eq!(engagement_level_for(100, &config), EngagementLevel::High);
    }

    #[test]
    fn test_negative_update_clamps_at_zero() {
        let config = LeadmapConfig::default();
        let mut profile = consenting_profile();
        update_engagement_score(&mut profile, &config, -50);
        assert_eq!(profile.engagement_score, 0);
        assert_eq!(profile.engagement_level, EngagementLevel::Low);
    }
}
