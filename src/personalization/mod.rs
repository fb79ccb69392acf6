//! Declarative personalization: condition/action rules over visitor state.
//!
//! Rules are static configuration re-evaluated from scratch on every
//! relevant state change. Applying rules never touches a rendering surface;
//! the output is a declarative [`ContentPatch`] a presentation layer applies.

pub mod content;
pub mod engine;
pub mod rules;

pub use content::{exit_content_for, hero_headline, smart_cta, CtaVariant, ExitContent};
pub use engine::{apply_rules, evaluate_applicable_rules, ContentPatch, SlotAssignment};
pub use rules::{
    default_rules, validate_rules, ActionType, ConditionType, Operator, PersonalizationRule,
    RuleAction, RuleCondition,
};
