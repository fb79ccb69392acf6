//! Content variant catalogs consumed by the presentation layer.
//!
//! These tables are data, not rendering: the engine selects a variant from
//! visitor state and the caller decides what to do with it. All tables use
//! the canonical three-level engagement scale (the legacy four-level CTA
//! table's `very_high` row was removed when the scales were unified).

use serde::Serialize;

use crate::core::{EngagementLevel, PersonaId, VisitorProfile};

/// A call-to-action variant: display text plus the action it triggers.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CtaVariant {
    pub text: &'static str,
    pub action: &'static str,
}

/// Exit-intent recovery content for one persona.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ExitContent {
    pub headline: &'static str,
    pub offer: &'static str,
    pub cta_text: &'static str,
}

/// Hero headline for the visitor's persona; undetermined visitors get the
/// default headline while cold and the returning-visitor headline once their
/// engagement rises.
pub fn hero_headline(profile: &VisitorProfile) -> &'static str {
    match profile.determined_persona {
        Some(PersonaId::Launch) => "Launch Your First Product With Confidence",
        Some(PersonaId::Scale) => "Break Revenue Plateaus & Scale to 7-Figures",
        Some(PersonaId::Master) => "Achieve True Ecosystem Mastery",
        Some(PersonaId::Invest) => "Build & Optimize Your Business Portfolio",
        Some(PersonaId::Connect) => "Connect with Premium Clients & Partners",
        Some(PersonaId::Unknown) => "Discover Your Unique Path in the Ecosystem",
        Some(PersonaId::DefaultExit) => "One Last Thing Before You Go...",
        None if profile.engagement_level == EngagementLevel::Low => {
            "Transform Your Journey with Systematic Success"
        }
        None => "Welcome Back! Let's Continue Your Success",
    }
}

/// Hero and quiz-prompt CTAs keyed by engagement level.
pub fn smart_cta(level: EngagementLevel) -> (CtaVariant, CtaVariant) {
    match level {
        EngagementLevel::Low => (
            CtaVariant {
                text: "Discover Your Path",
                action: "quiz",
            },
            CtaVariant {
                text: "Take the Quiz",
                action: "quiz",
            },
        ),
        EngagementLevel::Medium => (
            CtaVariant {
                text: "Explore Solutions",
                action: "pathways",
            },
            CtaVariant {
                text: "Get My Persona Insights",
                action: "quiz",
            },
        ),
        EngagementLevel::High => (
            CtaVariant {
                text: "View Program Details",
                action: "services",
            },
            CtaVariant {
                text: "Unlock My Roadmap",
                action: "quiz",
            },
        ),
    }
}

/// Exit-intent content for a persona; `None` falls back to the generic
/// default-exit offer.
pub fn exit_content_for(persona: Option<PersonaId>) -> ExitContent {
    match persona {
        Some(PersonaId::Launch) => ExitContent {
            headline: "Wait! Get Your Free Product Selection Risk Assessment",
            offer: "Our checklist helps prevent costly mistakes when selecting your first product.",
            cta_text: "Protect My Investment",
        },
        Some(PersonaId::Scale) => ExitContent {
            headline: "Before You Go - Get Your Business Bottleneck Analysis",
            offer: "Pinpoint the top growth blockers in your business with our free diagnostic.",
            cta_text: "Find My Bottlenecks",
        },
        Some(PersonaId::Master) => ExitContent {
            headline: "Complete Your Knowledge Gap Analysis",
            offer: "Receive a personalized learning roadmap to turn theory into action.",
            cta_text: "Get My Learning Path",
        },
        Some(PersonaId::Invest) => ExitContent {
            headline: "Get Your Investment Due Diligence Checklist",
            offer: "Evaluate business opportunities with a professional-grade framework.",
            cta_text: "Access Due Diligence",
        },
        Some(PersonaId::Connect) => ExitContent {
            headline: "Discover Your Service Business Growth Opportunities",
            offer: "Identify key areas for client acquisition and premium positioning.",
            cta_text: "Analyze My Business",
        },
        Some(PersonaId::Unknown) => ExitContent {
            headline: "Unlock Your Potential!",
            offer: "Grab our exclusive guide to navigating the ecosystem effectively.",
            cta_text: "Download Free Guide",
        },
        Some(PersonaId::DefaultExit) | None => ExitContent {
            headline: "Don't Leave Empty Handed!",
            offer: "Get our free success-factors checklist and start your journey right.",
            cta_text: "Get My Free Checklist",
        },
    }
}
