use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestionText,

    #[error("option {0} cannot be empty")]
    EmptyOption(AnswerChoice),

    #[error("invalid answer letter: {0}")]
    InvalidAnswer(String),

    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),
}

//
// ─── ANSWER CHOICE ─────────────────────────────────────────────────────────────
//

/// One of the four fixed option slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerChoice {
    A,
    B,
    C,
    D,
}

impl AnswerChoice {
    /// All choices in option-slot order.
    pub const ALL: [AnswerChoice; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Index of the matching option slot (A=0 .. D=3).
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
}

impl fmt::Display for AnswerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerChoice {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(QuestionError::InvalidAnswer(other.to_string())),
        }
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(QuestionError::InvalidDifficulty(other.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with four fixed option slots.
///
/// Questions are immutable once built; they are created at seed time or
/// through explicit insertion and never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    category_id: CategoryId,
    question_text: String,
    options: [String; 4],
    correct_answer: AnswerChoice,
    explanation: Option<String>,
    difficulty: Difficulty,
    subject: Option<String>,
    grade_level: Option<String>,
    time_estimate: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    /// Text of the option in the given slot.
    #[must_use]
    pub fn option(&self, choice: AnswerChoice) -> &str {
        &self.options[choice.index()]
    }

    /// All four option texts in slot order A..D.
    #[must_use]
    pub fn options(&self) -> [&str; 4] {
        [
            &self.options[0],
            &self.options[1],
            &self.options[2],
            &self.options[3],
        ]
    }

    #[must_use]
    pub fn correct_answer(&self) -> AnswerChoice {
        self.correct_answer
    }

    /// Whether the given selection matches the correct slot.
    #[must_use]
    pub fn is_correct(&self, choice: AnswerChoice) -> bool {
        self.correct_answer == choice
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn grade_level(&self) -> Option<&str> {
        self.grade_level.as_deref()
    }

    #[must_use]
    pub fn time_estimate(&self) -> Option<&str> {
        self.time_estimate.as_deref()
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Caller-supplied question fields, before a backend has assigned an id.
///
/// The typed `correct_answer` and `difficulty` fields make malformed letter
/// or difficulty values unrepresentable at this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub category_id: CategoryId,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerChoice,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub time_estimate: Option<String>,
}

impl QuestionDraft {
    /// Checks that the question text and all four options are non-blank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyQuestionText` or
    /// `QuestionError::EmptyOption` naming the offending slot.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question_text.trim().is_empty() {
            return Err(QuestionError::EmptyQuestionText);
        }
        let options = [
            (AnswerChoice::A, &self.option_a),
            (AnswerChoice::B, &self.option_b),
            (AnswerChoice::C, &self.option_c),
            (AnswerChoice::D, &self.option_d),
        ];
        for (choice, text) in options {
            if text.trim().is_empty() {
                return Err(QuestionError::EmptyOption(choice));
            }
        }
        Ok(())
    }

    /// Validates the draft and attaches a backend-assigned id.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from [`QuestionDraft::validate`].
    pub fn build(self, id: QuestionId) -> Result<Question, QuestionError> {
        self.validate()?;

        let trim_opt = |value: Option<String>| {
            value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        };

        Ok(Question {
            id,
            category_id: self.category_id,
            question_text: self.question_text.trim().to_owned(),
            options: [
                self.option_a.trim().to_owned(),
                self.option_b.trim().to_owned(),
                self.option_c.trim().to_owned(),
                self.option_d.trim().to_owned(),
            ],
            correct_answer: self.correct_answer,
            explanation: trim_opt(self.explanation),
            difficulty: self.difficulty,
            subject: trim_opt(self.subject),
            grade_level: trim_opt(self.grade_level),
            time_estimate: trim_opt(self.time_estimate),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            category_id: CategoryId::new(1),
            question_text: "What is 15 + 27?".into(),
            option_a: "32".into(),
            option_b: "42".into(),
            option_c: "52".into(),
            option_d: "62".into(),
            correct_answer: AnswerChoice::B,
            explanation: Some("15 + 27 = 42".into()),
            difficulty: Difficulty::Easy,
            subject: Some("Mathematics".into()),
            grade_level: Some("Elementary".into()),
            time_estimate: Some("2 minutes".into()),
        }
    }

    #[test]
    fn build_happy_path() {
        let q = draft().build(QuestionId::new(1)).unwrap();
        assert_eq!(q.option(AnswerChoice::B), "42");
        assert!(q.is_correct(AnswerChoice::B));
        assert!(!q.is_correct(AnswerChoice::A));
        assert_eq!(q.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn build_rejects_empty_question_text() {
        let mut d = draft();
        d.question_text = "  ".into();
        let err = d.build(QuestionId::new(1)).unwrap_err();
        assert_eq!(err, QuestionError::EmptyQuestionText);
    }

    #[test]
    fn build_rejects_empty_option_naming_slot() {
        let mut d = draft();
        d.option_c = String::new();
        let err = d.build(QuestionId::new(1)).unwrap_err();
        assert_eq!(err, QuestionError::EmptyOption(AnswerChoice::C));
    }

    #[test]
    fn answer_choice_str_roundtrip() {
        for choice in AnswerChoice::ALL {
            let parsed: AnswerChoice = choice.as_str().parse().unwrap();
            assert_eq!(parsed, choice);
        }
        assert!("E".parse::<AnswerChoice>().is_err());
    }

    #[test]
    fn difficulty_str_roundtrip() {
        for diff in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let parsed: Difficulty = diff.as_str().parse().unwrap();
            assert_eq!(parsed, diff);
        }
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn build_filters_blank_metadata() {
        let mut d = draft();
        d.explanation = Some("   ".into());
        d.grade_level = None;
        let q = d.build(QuestionId::new(2)).unwrap();
        assert_eq!(q.explanation(), None);
        assert_eq!(q.grade_level(), None);
        assert_eq!(q.subject(), Some("Mathematics"));
    }
}
