//! Rule evaluation and application.
//!
//! Evaluation is synchronous, stateless between triggers, and re-runs from
//! scratch whenever persona, score or engagement level changes. Applying
//! rules produces a [`ContentPatch`]; the engine never mutates a rendering
//! surface.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::config::LeadmapConfig;
use crate::core::VisitorProfile;
use crate::personalization::rules::{
    ConditionType, Operator, PersonalizationRule, RuleCondition,
};
use crate::tracking::track_behavior;

/// A slot claimed by an applied rule.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotAssignment {
    pub value: String,
    pub rule_id: String,
    pub priority: u32,
}

/// Declarative output of a rule pass: named slot → selected variant.
///
/// Slot conflicts resolve first-applied-wins: rules apply in descending
/// priority order and a claimed slot is never overwritten, so the
/// highest-priority rule owns every slot it targets.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentPatch {
    pub slots: BTreeMap<String, SlotAssignment>,
    pub applied_rule_ids: Vec<String>,
}

impl ContentPatch {
    /// Variant assigned to a slot, if any rule claimed it.
    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(|a| a.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.applied_rule_ids.is_empty()
    }
}

fn compare_numeric(actual: f64, operator: Operator, expected: &Value) -> bool {
    let Some(expected) = expected.as_f64() else {
        return false;
    };
    match operator {
        Operator::Equals => actual == expected,
        Operator::NotEquals => actual != expected,
        Operator::GreaterThan => actual > expected,
        Operator::LessThan => actual < expected,
        _ => false,
    }
}

fn compare_string(actual: &str, operator: Operator, expected: &Value) -> bool {
    match operator {
        Operator::Equals => expected.as_str() == Some(actual),
        Operator::NotEquals => expected.as_str().is_some_and(|e| e != actual),
        Operator::In => expected
            .as_array()
            .is_some_and(|values| values.iter().any(|v| v.as_str() == Some(actual))),
        _ => false,
    }
}

/// Evaluate one condition against the profile. Unrecognized attributes or
/// operator/value combinations evaluate false: a rule referencing a future
/// attribute simply does not apply, it never errors.
pub fn evaluate_condition(profile: &VisitorProfile, condition: &RuleCondition) -> bool {
    match condition.condition_type {
        ConditionType::Persona => match profile.determined_persona {
            Some(persona) => compare_string(persona.as_str(), condition.operator, &condition.value),
            None => false,
        },
        ConditionType::Engagement => compare_numeric(
            f64::from(profile.engagement_score),
            condition.operator,
            &condition.value,
        ),
        ConditionType::LeadScore => {
            // Needs the live total, which only the full evaluation path
            // supplies; a bare condition check cannot know it.
            false
        }
        ConditionType::Behavior => match condition.operator {
            // Membership: the named event type appears in history.
            Operator::Contains => condition
                .value
                .as_str()
                .is_some_and(|event| profile.has_interaction(event)),
            // Count comparison over the whole history.
            Operator::GreaterThan | Operator::LessThan | Operator::Equals => compare_numeric(
                profile.interaction_history.len() as f64,
                condition.operator,
                &condition.value,
            ),
            _ => false,
        },
        ConditionType::Device => {
            compare_string(profile.device_type.as_str(), condition.operator, &condition.value)
        }
        ConditionType::Unrecognized => false,
    }
}

/// Evaluate a `lead_score` condition with the live total supplied.
fn evaluate_condition_with_total(
    profile: &VisitorProfile,
    condition: &RuleCondition,
    total_score: u32,
) -> bool {
    if condition.condition_type == ConditionType::LeadScore {
        return compare_numeric(f64::from(total_score), condition.operator, &condition.value);
    }
    evaluate_condition(profile, condition)
}

/// Filter the rule set to active rules whose conditions all hold, sorted by
/// descending priority (declaration order on ties).
pub fn evaluate_applicable_rules<'r>(
    profile: &VisitorProfile,
    rules: &'r [PersonalizationRule],
    total_score: u32,
) -> Vec<&'r PersonalizationRule> {
    let mut applicable: Vec<&PersonalizationRule> = rules
        .iter()
        .filter(|rule| rule.active)
        .filter(|rule| {
            rule.conditions
                .iter()
                .all(|c| evaluate_condition_with_total(profile, c, total_score))
        })
        .collect();
    applicable.sort_by(|a, b| b.priority.cmp(&a.priority));
    applicable
}

/// Run a full rule pass and produce the content patch.
///
/// Gated like tracking: with consent withheld or personalization disabled
/// the patch is empty. Each applied rule records a `rule_applied` audit
/// event on the profile. Applying the same pass twice yields the same patch.
pub fn apply_rules(
    profile: &mut VisitorProfile,
    config: &LeadmapConfig,
    rules: &[PersonalizationRule],
) -> ContentPatch {
    if !profile.consent_given || !profile.personalization_enabled {
        return ContentPatch::default();
    }

    let total_score = profile.lead_score.total_score(config);
    let applicable = evaluate_applicable_rules(profile, rules, total_score);

    let mut patch = ContentPatch::default();
    let mut applied: Vec<String> = Vec::new();
    for rule in applicable {
        for action in &rule.actions {
            let slot = action.slot();
            // First-applied wins: never overwrite a claimed slot.
            patch.slots.entry(slot).or_insert_with(|| SlotAssignment {
                value: action.value.clone(),
                rule_id: rule.id.clone(),
                priority: rule.priority,
            });
        }
        applied.push(rule.id.clone());
    }

    for rule_id in &applied {
        debug!("applied personalization rule {rule_id}");
        track_behavior(
            profile,
            config,
            "rule_applied",
            Some(json!({ "rule_id": rule_id })),
        );
    }
    patch.applied_rule_ids = applied;
    patch
}
