//! Core domain types shared across the engine.

use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::scoring::LeadScoreComponents;

/// Visitor archetype determined by the persona quiz.
///
/// The five concrete personas are scoreable; `Unknown` is the fallback when a
/// quiz produces no signal, and `DefaultExit` keys the generic exit-intent
/// content for visitors that never took the quiz.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    Launch,
    Scale,
    Master,
    Invest,
    Connect,
    Unknown,
    DefaultExit,
}

impl PersonaId {
    /// Scoreable personas in tie-break order. Classification ties resolve to
    /// the first persona in this list reaching the maximum score.
    pub const ALL: [PersonaId; 5] = [
        PersonaId::Launch,
        PersonaId::Scale,
        PersonaId::Master,
        PersonaId::Invest,
        PersonaId::Connect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PersonaId::Launch => "Launch",
            PersonaId::Scale => "Scale",
            PersonaId::Master => "Master",
            PersonaId::Invest => "Invest",
            PersonaId::Connect => "Connect",
            PersonaId::Unknown => "Unknown",
            PersonaId::DefaultExit => "Default Exit",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Launch => "launch",
            PersonaId::Scale => "scale",
            PersonaId::Master => "master",
            PersonaId::Invest => "invest",
            PersonaId::Connect => "connect",
            PersonaId::Unknown => "unknown",
            PersonaId::DefaultExit => "default_exit",
        }
    }

    /// True for the two non-scoreable fallback identifiers.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PersonaId::Unknown | PersonaId::DefaultExit)
    }

    /// Parse a persona identifier as it appears in rule files and session
    /// scripts.
    pub fn parse(s: &str) -> Option<PersonaId> {
        match s {
            "launch" => Some(PersonaId::Launch),
            "scale" => Some(PersonaId::Scale),
            "master" => Some(PersonaId::Master),
            "invest" => Some(PersonaId::Invest),
            "connect" => Some(PersonaId::Connect),
            "unknown" => Some(PersonaId::Unknown),
            "default_exit" => Some(PersonaId::DefaultExit),
            _ => None,
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device class derived from the reported viewport width.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
    Unknown,
}

impl DeviceType {
    /// Classify a viewport width: below 768px is mobile, below 1024px is
    /// tablet, anything wider is desktop.
    pub fn from_viewport_width(width: u32) -> DeviceType {
        if width < 768 {
            DeviceType::Mobile
        } else if width < 1024 {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Unknown => "unknown",
        }
    }
}

/// Coarse bucketing of the behavioral engagement score.
///
/// The canonical scale is three-level; tables keyed by engagement level
/// (CTA variants, rule conditions) all use this enum.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    pub fn label(&self) -> &'static str {
        match self {
            EngagementLevel::Low => "low",
            EngagementLevel::Medium => "medium",
            EngagementLevel::High => "high",
        }
    }
}

/// Lead lifecycle stage, ordered from cold to advocate.
///
/// The first five stages are derived from the lead score; `Opportunity`
/// additionally requires a qualifying business event, and the last two are
/// terminal states set by external promotion only.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub enum LeadStage {
    #[default]
    AnonymousVisitor,
    IdentifiedProspect,
    EngagedLead,
    MarketingQualifiedLead,
    SalesQualifiedLead,
    Opportunity,
    Customer,
    Advocate,
}

impl LeadStage {
    pub fn label(&self) -> &'static str {
        match self {
            LeadStage::AnonymousVisitor => "Anonymous Visitor",
            LeadStage::IdentifiedProspect => "Identified Prospect",
            LeadStage::EngagedLead => "Engaged Lead",
            LeadStage::MarketingQualifiedLead => "Marketing Qualified Lead",
            LeadStage::SalesQualifiedLead => "Sales Qualified Lead",
            LeadStage::Opportunity => "Opportunity",
            LeadStage::Customer => "Customer",
            LeadStage::Advocate => "Advocate",
        }
    }

    /// Terminal stages are never left, regardless of score movement.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStage::Customer | LeadStage::Advocate)
    }

    /// Stages at or past `Opportunity` hold even if the score decays.
    pub fn holds_against_score(&self) -> bool {
        *self >= LeadStage::Opportunity
    }
}

/// Progress of a visitor through the service-inquiry funnel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceInquiryState {
    #[default]
    None,
    Started,
    Submitted,
    ConsultBooked,
}

/// A single tracked interaction, append-only on the visitor profile.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InteractionEvent {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl InteractionEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(event_type: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            details: Some(details),
        }
    }
}

/// The aggregate runtime entity for one visitor.
///
/// All scoring and rule-engine operations take the profile explicitly; there
/// is no ambient global, so a server-side embedding can keep one profile per
/// session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisitorProfile {
    pub is_first_time_visitor: bool,
    pub determined_persona: Option<PersonaId>,
    /// Behavioral engagement score, clamped to [0, 100].
    pub engagement_score: u32,
    pub engagement_level: EngagementLevel,
    pub traffic_source: Option<String>,
    pub device_type: DeviceType,
    pub interaction_history: Vector<InteractionEvent>,
    pub is_email_subscriber: bool,
    pub service_inquiry_state: ServiceInquiryState,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ab_test_groups: BTreeMap<String, String>,
    /// Privacy gate: tracking is a silent no-op until consent is given.
    pub consent_given: bool,
    pub personalization_enabled: bool,
    pub lead_score: LeadScoreComponents,
    pub lead_stage: LeadStage,
}

impl VisitorProfile {
    /// A fresh anonymous profile with personalization enabled but no consent.
    pub fn new() -> Self {
        Self {
            is_first_time_visitor: true,
            determined_persona: None,
            engagement_score: 0,
            engagement_level: EngagementLevel::Low,
            traffic_source: None,
            device_type: DeviceType::Unknown,
            interaction_history: Vector::new(),
            is_email_subscriber: false,
            service_inquiry_state: ServiceInquiryState::None,
            ab_test_groups: BTreeMap::new(),
            consent_given: false,
            personalization_enabled: true,
            lead_score: LeadScoreComponents::default(),
            lead_stage: LeadStage::AnonymousVisitor,
        }
    }

    /// Append an interaction, evicting the oldest entries beyond `retention`.
    pub fn push_interaction(&mut self, event: InteractionEvent, retention: usize) {
        self.interaction_history.push_back(event);
        while self.interaction_history.len() > retention {
            self.interaction_history.pop_front();
        }
    }

    /// Membership test used by `behavior` rule conditions.
    pub fn has_interaction(&self, event_type: &str) -> bool {
        self.interaction_history
            .iter()
            .any(|e| e.event_type == event_type)
    }

    /// Count of interactions of a given type, for frequency conditions.
    pub fn interaction_count(&self, event_type: &str) -> usize {
        self.interaction_history
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl Default for VisitorProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_stage_ordering() {
        assert!(LeadStage::AnonymousVisitor < LeadStage::IdentifiedProspect);
        assert!(LeadStage::SalesQualifiedLead < LeadStage::Opportunity);
        assert!(LeadStage::Opportunity < LeadStage::Customer);
        assert!(LeadStage::Customer.is_terminal());
        assert!(LeadStage::Advocate.is_terminal());
        assert!(!LeadStage::SalesQualifiedLead.is_terminal());
        assert!(LeadStage::Opportunity.holds_against_score());
        assert!(!LeadStage::SalesQualifiedLead.holds_against_score());
    }

    #[test]
    fn test_device_classification_breakpoints() {
        assert_eq!(DeviceType::from_viewport_width(320), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport_width(767), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport_width(768), DeviceType::Tablet);
        assert_eq!(DeviceType::from_viewport_width(1023), DeviceType::Tablet);
        assert_eq!(DeviceType::from_viewport_width(1024), DeviceType::Desktop);
    }

    #[test]
    fn test_interaction_history_is_bounded() {
        let mut profile = VisitorProfile::new();
        for i in 0..150 {
            profile.push_interaction(InteractionEvent::new(format!("event_{i}")), 100);
        }
        assert_eq!(profile.interaction_history.len(), 100);
        // Oldest entries were evicted first.
        assert_eq!(profile.interaction_history[0].event_type, "event_50");
        assert!(profile.has_interaction("event_149"));
        assert!(!profile.has_interaction("event_49"));
    }

    #[test]
    fn test_persona_parse_round_trip() {
        for persona in PersonaId::ALL {
            assert_eq!(PersonaId::parse(persona.as_str()), Some(persona));
        }
        assert_eq!(PersonaId::parse("default_exit"), Some(PersonaId::DefaultExit));
        assert_eq!(PersonaId::parse("nonsense"), None);
    }
}
