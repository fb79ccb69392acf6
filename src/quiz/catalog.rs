//! Static quiz catalog: questions, answer options and their weights.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::PersonaId;
use crate::errors::{EngineError, Result};

/// A `(persona, points)` weight pair on an answer option.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaWeight {
    pub persona: PersonaId,
    pub points: u32,
}

/// A demographic mapping on an answer option, feeding the lead score's
/// demographic bucket directly at quiz finalization (bypassing persona
/// scoring).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemographicWeight {
    pub category: String,
    pub points: u32,
}

/// One selectable answer for a quiz question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizAnswerOption {
    pub id: String,
    pub text: String,
    pub weights: Vec<PersonaWeight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub demographic_weights: Vec<DemographicWeight>,
}

impl QuizAnswerOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            weights: Vec::new(),
            demographic_weights: Vec::new(),
        }
    }

    pub fn weight(mut self, persona: PersonaId, points: u32) -> Self {
        self.weights.push(PersonaWeight { persona, points });
        self
    }

    pub fn demographic(mut self, category: impl Into<String>, points: u32) -> Self {
        self.demographic_weights.push(DemographicWeight {
            category: category.into(),
            points,
        });
        self
    }
}

/// An ordered quiz prompt. `is_sensitive` affects presentation only, never
/// scoring.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<QuizAnswerOption>,
    #[serde(default)]
    pub skippable: bool,
    #[serde(default)]
    pub is_sensitive: bool,
}

impl QuizQuestion {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options: Vec::new(),
            skippable: false,
            is_sensitive: false,
        }
    }

    pub fn option(mut self, option: QuizAnswerOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    pub fn find_option(&self, answer_id: &str) -> Option<&QuizAnswerOption> {
        self.options.iter().find(|o| o.id == answer_id)
    }
}

/// The ordered question set a quiz session walks through.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizCatalog {
    questions: Vec<QuizQuestion>,
}

impl QuizCatalog {
    /// Build a catalog, rejecting duplicate question or option ids.
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self> {
        let mut seen = std::collections::BTreeSet::new();
        for question in &questions {
            if !seen.insert(question.id.clone()) {
                return Err(EngineError::configuration(format!(
                    "duplicate quiz question id: {}",
                    question.id
                )));
            }
            let mut option_ids = std::collections::BTreeSet::new();
            for option in &question.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(EngineError::configuration(format!(
                        "duplicate option id '{}' in question '{}'",
                        option.id, question.id
                    )));
                }
            }
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn question(&self, question_id: &str) -> Result<&QuizQuestion> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))
    }

    /// Resolve a question/answer pair, failing fast on either id.
    pub fn option(&self, question_id: &str, answer_id: &str) -> Result<&QuizAnswerOption> {
        let question = self.question(question_id)?;
        question
            .find_option(answer_id)
            .ok_or_else(|| EngineError::UnknownAnswer {
                question_id: question_id.to_string(),
                answer_id: answer_id.to_string(),
            })
    }
}

/// The built-in ten-question production catalog.
pub fn builtin_catalog() -> &'static QuizCatalog {
    static CATALOG: Lazy<QuizCatalog> = Lazy::new(|| {
        use PersonaId::*;
        QuizCatalog::new(vec![
            QuizQuestion::new("q1_status", "What best describes your current selling status?")
                .option(
                    QuizAnswerOption::new("a1", "I haven't started selling yet / Just launched")
                        .weight(Launch, 5)
                        .weight(Master, 1)
                        .demographic("business_stage_appropriate", 2),
                )
                .option(
                    QuizAnswerOption::new("a2", "Selling for a few months, some initial sales")
                        .weight(Launch, 3)
                        .weight(Scale, 2)
                        .demographic("business_stage_appropriate", 4),
                )
                .option(
                    QuizAnswerOption::new("a3", "Established seller with consistent revenue")
                        .weight(Scale, 5)
                        .weight(Invest, 1)
                        .demographic("business_stage_appropriate", 8),
                )
                .option(
                    QuizAnswerOption::new("a4", "I'm primarily looking to learn the ecosystem")
                        .weight(Master, 5),
                )
                .option(
                    QuizAnswerOption::new("a5", "I offer services to sellers").weight(Connect, 5),
                )
                .option(
                    QuizAnswerOption::new("a6", "I'm looking to buy or invest in businesses")
                        .weight(Invest, 5)
                        .demographic("business_stage_appropriate", 10),
                ),
            QuizQuestion::new("q2_revenue", "What's your primary monthly revenue (if selling)?")
                .option(
                    QuizAnswerOption::new("b1", "$0 - $1,000 (or N/A)")
                        .weight(Launch, 4)
                        .weight(Master, 2)
                        .demographic("budget_indication_positive", 2),
                )
                .option(
                    QuizAnswerOption::new("b2", "$1,000 - $15,000")
                        .weight(Launch, 2)
                        .weight(Scale, 3)
                        .demographic("budget_indication_positive", 5),
                )
                .option(
                    QuizAnswerOption::new("b3", "$15,000 - $50,000")
                        .weight(Scale, 5)
                        .demographic("budget_indication_positive", 10),
                )
                .option(
                    QuizAnswerOption::new("b4", "$50,000+")
                        .weight(Scale, 4)
                        .weight(Invest, 3)
                        .demographic("budget_indication_positive", 15),
                )
                .option(
                    QuizAnswerOption::new("b5", "Not applicable (I provide services/invest)")
                        .weight(Connect, 3)
                        .weight(Invest, 3),
                )
                .skippable(),
            QuizQuestion::new("q3_learning_style", "How do you prefer to learn new strategies?")
                .option(
                    QuizAnswerOption::new("c1", "Step-by-step guides and checklists")
                        .weight(Launch, 4),
                )
                .option(
                    QuizAnswerOption::new("c2", "Deep conceptual understanding and frameworks")
                        .weight(Master, 5),
                )
                .option(
                    QuizAnswerOption::new("c3", "Proven systems and optimization techniques")
                        .weight(Scale, 4),
                )
                .option(
                    QuizAnswerOption::new("c4", "Data-driven analysis and case studies")
                        .weight(Invest, 3)
                        .weight(Scale, 2),
                )
                .option(
                    QuizAnswerOption::new("c5", "Networking and expert consultations")
                        .weight(Connect, 4)
                        .weight(Invest, 2),
                ),
            QuizQuestion::new("q4_biggest_challenge", "What's your biggest current challenge?")
                .option(
                    QuizAnswerOption::new("d1", "Finding the right product / Getting started")
                        .weight(Launch, 5),
                )
                .option(
                    QuizAnswerOption::new("d2", "Scaling my current sales / Breaking plateaus")
                        .weight(Scale, 5),
                )
                .option(
                    QuizAnswerOption::new("d3", "Turning theory into practice").weight(Master, 5),
                )
                .option(
                    QuizAnswerOption::new("d4", "Evaluating opportunities / Due diligence")
                        .weight(Invest, 5),
                )
                .option(
                    QuizAnswerOption::new("d5", "Finding ideal clients / Demonstrating my value")
                        .weight(Connect, 5),
                )
                .option(
                    QuizAnswerOption::new("d6", "Information overload / Knowing who to trust")
                        .weight(Launch, 2)
                        .weight(Master, 2),
                ),
            QuizQuestion::new(
                "q5_capital",
                "How much capital do you have available for inventory or investment?",
            )
            .option(
                QuizAnswerOption::new("e1", "Less than $5,000")
                    .weight(Launch, 4)
                    .weight(Master, 2)
                    .demographic("budget_indication_positive", 3),
            )
            .option(
                QuizAnswerOption::new("e2", "$5,000 - $15,000")
                    .weight(Launch, 5)
                    .demographic("budget_indication_positive", 7),
            )
            .option(
                QuizAnswerOption::new("e3", "$15,000 - $50,000")
                    .weight(Scale, 4)
                    .demographic("budget_indication_positive", 10),
            )
            .option(
                QuizAnswerOption::new("e4", "$50,000 - $500,000")
                    .weight(Invest, 5)
                    .weight(Scale, 2)
                    .demographic("budget_indication_positive", 12),
            )
            .option(
                QuizAnswerOption::new("e5", "$500,000+")
                    .weight(Invest, 5)
                    .demographic("budget_indication_positive", 15),
            )
            .option(
                QuizAnswerOption::new("e6", "Not applicable / Prefer not to say")
                    .weight(Connect, 2)
                    .weight(Master, 1),
            )
            .skippable()
            .sensitive(),
            QuizQuestion::new(
                "q6_role_preference",
                "What's your preferred role in business operations?",
            )
            .option(
                QuizAnswerOption::new("f1", "Hands-on implementer, doing most tasks myself")
                    .weight(Launch, 4)
                    .weight(Master, 2),
            )
            .option(
                QuizAnswerOption::new("f2", "System builder, optimizing and delegating")
                    .weight(Scale, 5),
            )
            .option(
                QuizAnswerOption::new("f3", "Strategic overseer, focused on high-level decisions")
                    .weight(Invest, 4),
            )
            .option(
                QuizAnswerOption::new("f4", "External expert, providing specialized support")
                    .weight(Connect, 5),
            )
            .option(
                QuizAnswerOption::new("f5", "Student or researcher, focused on learning first")
                    .weight(Master, 4),
            ),
            QuizQuestion::new(
                "q7_decision_making",
                "How do you typically make important business decisions?",
            )
            .option(
                QuizAnswerOption::new("g1", "Cautiously, after extensive research and validation")
                    .weight(Launch, 3)
                    .weight(Invest, 3),
            )
            .option(
                QuizAnswerOption::new("g2", "Data-driven, based on performance metrics and ROI")
                    .weight(Scale, 4)
                    .weight(Invest, 2),
            )
            .option(
                QuizAnswerOption::new("g3", "From a deep understanding of underlying principles")
                    .weight(Master, 4),
            )
            .option(
                QuizAnswerOption::new("g4", "Through expert advice and proven frameworks")
                    .weight(Connect, 3)
                    .weight(Launch, 2),
            )
            .option(
                QuizAnswerOption::new("g5", "Quickly, prioritizing action and iteration")
                    .weight(Scale, 2),
            ),
            QuizQuestion::new(
                "q8_timeline",
                "What's your ideal timeline for seeing significant results?",
            )
            .option(QuizAnswerOption::new("h1", "Within 3 months").weight(Launch, 4))
            .option(
                QuizAnswerOption::new("h2", "3-6 months")
                    .weight(Scale, 3)
                    .weight(Invest, 3),
            )
            .option(
                QuizAnswerOption::new("h3", "6-12 months")
                    .weight(Scale, 2)
                    .weight(Master, 3),
            )
            .option(
                QuizAnswerOption::new("h4", "Long-term, foundational understanding first")
                    .weight(Master, 4),
            )
            .option(
                QuizAnswerOption::new("h5", "Varies per client or project").weight(Connect, 4),
            ),
            QuizQuestion::new(
                "q9_support_preference",
                "How do you prefer to get support or guidance?",
            )
            .option(
                QuizAnswerOption::new("i1", "Structured programs with clear milestones")
                    .weight(Launch, 4)
                    .weight(Scale, 2),
            )
            .option(
                QuizAnswerOption::new("i2", "Community forums and peer discussions")
                    .weight(Master, 3)
                    .weight(Connect, 2),
            )
            .option(
                QuizAnswerOption::new("i3", "Expert coaching and one-on-one consultations")
                    .weight(Scale, 3)
                    .weight(Invest, 3),
            )
            .option(
                QuizAnswerOption::new("i4", "Self-paced learning with comprehensive resources")
                    .weight(Master, 4),
            )
            .option(
                QuizAnswerOption::new("i5", "Direct connections to relevant experts")
                    .weight(Connect, 4)
                    .weight(Invest, 2),
            ),
            QuizQuestion::new("q10_long_term_goal", "What's your primary long-term goal?")
                .option(
                    QuizAnswerOption::new("j1", "Build a profitable first product and grow")
                        .weight(Launch, 5),
                )
                .option(
                    QuizAnswerOption::new("j2", "Create a system-driven seven-figure business")
                        .weight(Scale, 5),
                )
                .option(
                    QuizAnswerOption::new("j3", "Achieve comprehensive ecosystem mastery")
                        .weight(Master, 5),
                )
                .option(
                    QuizAnswerOption::new("j4", "Develop a portfolio of business investments")
                        .weight(Invest, 5),
                )
                .option(
                    QuizAnswerOption::new("j5", "Become a recognized, sought-after provider")
                        .weight(Connect, 5),
                ),
        ])
        .expect("builtin catalog ids are unique")
    });
    &CATALOG
}
