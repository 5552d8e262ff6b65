mod category;
mod flashcard;
mod ids;
mod progress;
mod question;
mod session;

pub use category::{Category, CategoryError};
pub use flashcard::{Flashcard, FlashcardError};
pub use ids::{CategoryId, ParseIdError, QuestionId};
pub use progress::{ProgressError, ProgressStats};
pub use question::{AnswerChoice, Difficulty, Question, QuestionDraft, QuestionError};
pub use session::{QuizScore, QuizSession, QuizSessionError};
