use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlashcardError {
    #[error("flashcard prompt cannot be empty")]
    EmptyPrompt,

    #[error("flashcard answer cannot be empty")]
    EmptyAnswer,
}

/// A two-sided study card: a prompt on the front, an answer on the back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    prompt: String,
    answer: String,
}

impl Flashcard {
    /// Creates a flashcard, trimming both sides.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError` if either side is blank.
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Result<Self, FlashcardError> {
        let prompt = prompt.into();
        let answer = answer.into();
        if prompt.trim().is_empty() {
            return Err(FlashcardError::EmptyPrompt);
        }
        if answer.trim().is_empty() {
            return Err(FlashcardError::EmptyAnswer);
        }
        Ok(Self {
            prompt: prompt.trim().to_owned(),
            answer: answer.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_both_sides() {
        let card = Flashcard::new("  What is a mitochondrion?  ", " The cell's power plant ")
            .unwrap();
        assert_eq!(card.prompt(), "What is a mitochondrion?");
        assert_eq!(card.answer(), "The cell's power plant");
    }

    #[test]
    fn rejects_blank_sides() {
        assert_eq!(
            Flashcard::new("  ", "answer").unwrap_err(),
            FlashcardError::EmptyPrompt
        );
        assert_eq!(
            Flashcard::new("prompt", "").unwrap_err(),
            FlashcardError::EmptyAnswer
        );
    }
}
