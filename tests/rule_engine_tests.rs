use leadmap::personalization::{
    apply_rules, default_rules, evaluate_applicable_rules, ActionType, ConditionType, Operator,
    PersonalizationRule, RuleAction, RuleCondition,
};
use leadmap::{DeviceType, LeadmapConfig, PersonaId, VisitorProfile, VisitorSession};
use pretty_assertions::assert_eq;
use serde_json::json;

fn consenting_profile() -> VisitorProfile {
    let mut profile = VisitorProfile::new();
    profile.consent_given = true;
    profile
}

#[test]
fn test_builtin_launch_rule_fires_on_high_engagement() {
    let mut profile = consenting_profile();
    profile.determined_persona = Some(PersonaId::Launch);
    profile.engagement_score = 75;

    let applicable = evaluate_applicable_rules(&profile, default_rules(), 0);
    let ids: Vec<&str> = applicable.iter().map(|r| r.id.as_str()).collect();
    assert!(ids.contains(&"launch-high-engagement"));

    let config = LeadmapConfig::default();
    let patch = apply_rules(&mut profile, &config, default_rules());
    assert_eq!(
        patch.slot_value("content:hero-section"),
        Some("launch-program-focused")
    );
    assert_eq!(
        patch.slot_value("cta:primary-cta"),
        Some("Start Your Launch Journey")
    );
}

#[test]
fn test_rule_with_unmet_condition_never_applies() {
    let mut profile = consenting_profile();
    profile.determined_persona = Some(PersonaId::Launch);
    profile.engagement_score = 10; // below the > 70 condition

    let applicable = evaluate_applicable_rules(&profile, default_rules(), 0);
    assert!(!applicable.iter().any(|r| r.id == "launch-high-engagement"));
}

#[test]
fn test_inactive_rule_with_met_conditions_never_applies() {
    let mut profile = consenting_profile();
    profile.device_type = DeviceType::Mobile;
    let rules: Vec<PersonalizationRule> = default_rules()
        .iter()
        .cloned()
        .map(|mut rule| {
            if rule.id == "mobile-simplified" {
                rule.active = false;
            }
            rule
        })
        .collect();
    let applicable = evaluate_applicable_rules(&profile, &rules, 0);
    assert!(!applicable.iter().any(|r| r.id == "mobile-simplified"));
}

#[test]
fn test_shared_slot_resolves_to_higher_priority() {
    let mut profile = consenting_profile();
    let config = LeadmapConfig::default();
    let rules = vec![
        PersonalizationRule::new("underdog", "lower priority", 5).action(RuleAction::new(
            ActionType::Content,
            "hero-banner",
            "underdog-variant",
        )),
        PersonalizationRule::new("favorite", "higher priority", 10).action(RuleAction::new(
            ActionType::Content,
            "hero-banner",
            "favorite-variant",
        )),
    ];
    let patch = apply_rules(&mut profile, &config, &rules);
    // Exactly one variant is visible in the contested slot.
    assert_eq!(patch.slots.len(), 1);
    assert_eq!(patch.slot_value("content:hero-banner"), Some("favorite-variant"));
    assert_eq!(patch.slots["content:hero-banner"].rule_id, "favorite");
}

#[test]
fn test_rule_pass_is_idempotent() {
    let mut profile = consenting_profile();
    profile.device_type = DeviceType::Mobile;
    let config = LeadmapConfig::default();
    let first = apply_rules(&mut profile, &config, default_rules());
    let second = apply_rules(&mut profile, &config, default_rules());
    assert_eq!(first.slots, second.slots);
    assert_eq!(first.applied_rule_ids, second.applied_rule_ids);
}

#[test]
fn test_lead_score_condition_uses_live_total() {
    let rules = vec![PersonalizationRule::new("warm-lead", "warm lead banner", 7)
        .condition(RuleCondition::new(
            ConditionType::LeadScore,
            Operator::GreaterThan,
            json!(20),
        ))
        .action(RuleAction::new(ActionType::Content, "banner", "warm-lead"))];
    let mut session = VisitorSession::new().with_rules(rules);
    session.set_consent(true);

    session.track_event("page_view", None);
    assert_eq!(session.last_patch().slot_value("content:banner"), None);

    // calendar_booking_made awards 25 behavioral points.
    session.track_event("calendar_booking_made", None);
    assert_eq!(
        session.last_patch().slot_value("content:banner"),
        Some("warm-lead")
    );
}

#[test]
fn test_device_rule_end_to_end_through_session() {
    let mut session = VisitorSession::new();
    session.set_consent(true);
    session.set_viewport_width(375);
    session.track_event("page_view", None);
    let patch = session.last_patch();
    assert_eq!(patch.slot_value("navigation:main-nav"), Some("simplified"));
    assert_eq!(patch.slot_value("content:hero"), Some("mobile-optimized"));
}

#[test]
fn test_applied_rules_emit_audit_events() {
    let mut session = VisitorSession::new();
    session.set_consent(true);
    session.set_viewport_width(375);
    session.track_event("page_view", None);
    assert!(session.profile.has_interaction("rule_applied"));
}

#[test]
fn test_unrecognized_rule_parts_are_resilient() {
    let profile = consenting_profile();
    // A rule definition from a future version with unknown attribute and
    // operator deserializes and simply never matches.
    let rule: PersonalizationRule = serde_json::from_value(json!({
        "id": "future",
        "name": "future rule",
        "priority": 99,
        "active": true,
        "conditions": [
            { "type": "weather", "operator": "drizzles", "value": true }
        ],
        "actions": [
            { "type": "content", "target": "hero", "value": "umbrella" }
        ],
    }))
    .unwrap();
    let applicable = evaluate_applicable_rules(&profile, std::slice::from_ref(&rule), 0);
    assert!(applicable.is_empty());
}
