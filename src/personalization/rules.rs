//! Rule definitions: typed conditions, actions and the built-in rule set.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{EngineError, Result};

/// Attribute a condition tests. Unrecognized attributes from partial or
/// future rule files deserialize to `Unrecognized`, which never matches.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Exact match against the determined persona.
    Persona,
    /// Numeric comparison against the engagement score.
    Engagement,
    /// Numeric comparison against the total lead score.
    LeadScore,
    /// Membership (or count comparison) against the interaction history.
    Behavior,
    /// Exact match against the classified device type.
    Device,
    #[serde(other)]
    Unrecognized,
}

/// Comparison operator. Unrecognized operators never match.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    In,
    #[serde(other)]
    Unrecognized,
}

/// One condition of a rule. All conditions of a rule must hold (conjunction;
/// there is no rule-level OR).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RuleCondition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub operator: Operator,
    pub value: Value,
}

impl RuleCondition {
    pub fn new(condition_type: ConditionType, operator: Operator, value: Value) -> Self {
        Self {
            condition_type,
            operator,
            value,
        }
    }
}

/// Kind of UI effect an action produces. The engine only records the effect
/// in a patch; rendering is the caller's concern.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Content,
    Cta,
    Navigation,
    Recommendation,
    Redirect,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Content => "content",
            ActionType::Cta => "cta",
            ActionType::Navigation => "navigation",
            ActionType::Recommendation => "recommendation",
            ActionType::Redirect => "redirect",
        }
    }
}

/// One effect of a rule: set `target` (a named UI slot) to `value`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub target: String,
    pub value: String,
}

impl RuleAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            value: value.into(),
        }
    }

    /// Slot key in the content patch: one visible variant per slot.
    pub fn slot(&self) -> String {
        format!("{}:{}", self.action_type.as_str(), self.target)
    }
}

/// A declarative condition → action rule.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalizationRule {
    pub id: String,
    pub name: String,
    pub conditions: Vec<RuleCondition>,
    pub actions: Vec<RuleAction>,
    pub priority: u32,
    pub active: bool,
}

impl PersonalizationRule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, priority: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            conditions: Vec::new(),
            actions: Vec::new(),
            priority,
            active: true,
        }
    }

    pub fn condition(mut self, condition: RuleCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn action(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Validate a rule set: unique ids, at least one action per rule, and no
/// conditions that can never match.
pub fn validate_rules(rules: &[PersonalizationRule]) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for rule in rules {
        if !seen.insert(rule.id.as_str()) {
            return Err(EngineError::rule_validation(format!(
                "duplicate rule id: {}",
                rule.id
            )));
        }
        if rule.actions.is_empty() {
            return Err(EngineError::rule_validation(format!(
                "rule '{}' has no actions",
                rule.id
            )));
        }
        for condition in &rule.conditions {
            if condition.condition_type == ConditionType::Unrecognized {
                return Err(EngineError::rule_validation(format!(
                    "rule '{}' has a condition with an unrecognized attribute",
                    rule.id
                )));
            }
            if condition.operator == Operator::Unrecognized {
                return Err(EngineError::rule_validation(format!(
                    "rule '{}' has a condition with an unrecognized operator",
                    rule.id
                )));
            }
        }
    }
    Ok(())
}

/// The built-in production rule set.
pub fn default_rules() -> &'static [PersonalizationRule] {
    static RULES: Lazy<Vec<PersonalizationRule>> = Lazy::new(|| {
        vec![
            PersonalizationRule::new(
                "launch-high-engagement",
                "Highly engaged launcher: focus the launch program",
                10,
            )
            .condition(RuleCondition::new(
                ConditionType::Persona,
                Operator::Equals,
                json!("launch"),
            ))
            .condition(RuleCondition::new(
                ConditionType::Engagement,
                Operator::GreaterThan,
                json!(70),
            ))
            .action(RuleAction::new(
                ActionType::Content,
                "hero-section",
                "launch-program-focused",
            ))
            .action(RuleAction::new(
                ActionType::Cta,
                "primary-cta",
                "Start Your Launch Journey",
            ))
            .action(RuleAction::new(
                ActionType::Recommendation,
                "sidebar",
                "launch-program-preview",
            )),
            PersonalizationRule::new(
                "scale-pricing-visits",
                "Scaler browsing pricing: offer a strategy call",
                9,
            )
            .condition(RuleCondition::new(
                ConditionType::Persona,
                Operator::Equals,
                json!("scale"),
            ))
            .condition(RuleCondition::new(
                ConditionType::Behavior,
                Operator::Contains,
                json!("pricing_page_visit"),
            ))
            .action(RuleAction::new(
                ActionType::Cta,
                "pricing-cta",
                "Book Scale Strategy Call",
            ))
            .action(RuleAction::new(
                ActionType::Content,
                "testimonials",
                "scaling-success-stories",
            )),
            PersonalizationRule::new(
                "master-video-completion",
                "Learner finishing videos: surface the mastery path",
                8,
            )
            .condition(RuleCondition::new(
                ConditionType::Persona,
                Operator::Equals,
                json!("master"),
            ))
            .condition(RuleCondition::new(
                ConditionType::Behavior,
                Operator::Contains,
                json!("video_completed"),
            ))
            .action(RuleAction::new(
                ActionType::Recommendation,
                "next-content",
                "master-program-preview",
            ))
            .action(RuleAction::new(
                ActionType::Content,
                "sidebar",
                "advanced-learning-path",
            )),
            PersonalizationRule::new(
                "return-visitor-advanced",
                "Return visitors: prioritize advanced content",
                6,
            )
            .condition(RuleCondition::new(
                ConditionType::Behavior,
                Operator::GreaterThan,
                json!(1),
            ))
            .action(RuleAction::new(
                ActionType::Content,
                "content-priority",
                "advanced-first",
            ))
            .action(RuleAction::new(
                ActionType::Navigation,
                "quick-access",
                "show-advanced",
            )),
            PersonalizationRule::new("mobile-simplified", "Mobile visitors: simplify the shell", 5)
                .condition(RuleCondition::new(
                    ConditionType::Device,
                    Operator::Equals,
                    json!("mobile"),
                ))
                .action(RuleAction::new(ActionType::Navigation, "main-nav", "simplified"))
                .action(RuleAction::new(ActionType::Content, "hero", "mobile-optimized")),
        ]
    });
    &RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        assert!(validate_rules(default_rules()).is_ok());
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let rules = vec![
            PersonalizationRule::new("r1", "first", 1)
                .action(RuleAction::new(ActionType::Content, "a", "b")),
            PersonalizationRule::new("r1", "second", 2)
                .action(RuleAction::new(ActionType::Content, "c", "d")),
        ];
        assert!(validate_rules(&rules).is_err());
    }

    #[test]
    fn test_unknown_condition_type_deserializes_as_unrecognized() {
        let condition: RuleCondition = serde_json::from_value(json!({
            "type": "moon_phase",
            "operator": "equals",
            "value": "full",
        }))
        .unwrap();
        assert_eq!(condition.condition_type, ConditionType::Unrecognized);
    }

    #[test]
    fn test_rule_json_round_trip() {
        let rules = default_rules();
        let serialized = serde_json::to_string(rules).unwrap();
        let parsed: Vec<PersonalizationRule> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.as_slice(), rules);
    }
}
