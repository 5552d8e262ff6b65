#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod flashcard_service;
pub mod progress_service;
pub mod question_store;
pub mod quiz_service;
pub mod study_timer;

pub use study_core::Clock;

pub use app_services::{AppServices, BootstrapConfig};
pub use error::{BootstrapError, FlashcardDeckError, QuizError};
pub use flashcard_service::FlashcardService;
pub use progress_service::ProgressService;
pub use question_store::{InsertOutcome, MAX_QUIZ_QUESTIONS, QuestionStore};
pub use quiz_service::{QuizPhase, QuizService, QuizView};
pub use study_timer::StudyTimer;
