use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FillBlank => "fill_blank",
        }
    }

    /// Fields a question of this type must carry.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            QuestionType::MultipleChoice => &["id", "question", "options", "correct_answer"],
            QuestionType::TrueFalse | QuestionType::FillBlank => {
                &["id", "question", "correct_answer"]
            }
        }
    }
}

impl FromStr for QuestionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "fill_blank" => Ok(QuestionType::FillBlank),
            _ => Err(()),
        }
    }
}

/// One generated question, kept exactly as the model produced it.
///
/// Expected keys are `id`, `question`, `type`, `options` (multiple choice
/// only), `correct_answer` and `explanation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct QuizQuestion(Map<String, Value>);

impl QuizQuestion {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The raw `type` value, when it is a string.
    pub fn declared_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn question_type(&self) -> Option<QuestionType> {
        self.declared_type()?.parse().ok()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}
