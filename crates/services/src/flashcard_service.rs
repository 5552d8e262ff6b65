use rand::seq::SliceRandom;

use study_core::model::Flashcard;

use crate::error::FlashcardDeckError;

/// Steps through a deck of flashcards with wrap-around navigation.
///
/// Cards always show their prompt first; moving to another card hides the
/// answer again. Shuffling reorders in place and jumps back to the first
/// card.
#[derive(Debug)]
pub struct FlashcardService {
    cards: Vec<Flashcard>,
    current: usize,
    showing_answer: bool,
}

impl FlashcardService {
    /// Creates a deck session over the given cards.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardDeckError::Empty` if no cards are provided.
    pub fn new(cards: Vec<Flashcard>) -> Result<Self, FlashcardDeckError> {
        if cards.is_empty() {
            return Err(FlashcardDeckError::Empty);
        }
        Ok(Self {
            cards,
            current: 0,
            showing_answer: false,
        })
    }

    /// A deck session over the built-in starter cards.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            cards: builtin_cards(),
            current: 0,
            showing_answer: false,
        }
    }

    #[must_use]
    pub fn current_card(&self) -> &Flashcard {
        &self.cards[self.current]
    }

    /// 1-based position of the current card.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_showing_answer(&self) -> bool {
        self.showing_answer
    }

    /// Text of the side currently facing the user.
    #[must_use]
    pub fn visible_side(&self) -> &str {
        let card = self.current_card();
        if self.showing_answer {
            card.answer()
        } else {
            card.prompt()
        }
    }

    /// Turns the current card over.
    pub fn flip(&mut self) {
        self.showing_answer = !self.showing_answer;
    }

    /// Advances to the next card, wrapping past the last one.
    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.cards.len();
        self.showing_answer = false;
    }

    /// Steps back to the previous card, wrapping past the first one.
    pub fn previous(&mut self) {
        self.current = (self.current + self.cards.len() - 1) % self.cards.len();
        self.showing_answer = false;
    }

    /// Reorders the deck randomly and returns to the first card.
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
        self.current = 0;
        self.showing_answer = false;
    }
}

fn builtin_cards() -> Vec<Flashcard> {
    [
        (
            "What organelle produces most of a cell's ATP?",
            "The mitochondrion",
        ),
        (
            "What process do plants use to turn sunlight into energy?",
            "Photosynthesis",
        ),
        ("In what year did World War II end?", "1945"),
        (
            "Which ancient civilization built the pyramids at Giza?",
            "The Egyptians",
        ),
        ("What is the chemical symbol for sodium?", "Na"),
        ("What is the pH of a neutral solution?", "7"),
    ]
    .into_iter()
    .filter_map(|(prompt, answer)| Flashcard::new(prompt, answer).ok())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_card_deck() -> FlashcardService {
        let cards = vec![
            Flashcard::new("p1", "a1").unwrap(),
            Flashcard::new("p2", "a2").unwrap(),
            Flashcard::new("p3", "a3").unwrap(),
        ];
        FlashcardService::new(cards).unwrap()
    }

    #[test]
    fn empty_deck_is_rejected() {
        assert_eq!(
            FlashcardService::new(Vec::new()).unwrap_err(),
            FlashcardDeckError::Empty
        );
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut deck = three_card_deck();
        assert_eq!(deck.position(), 1);

        deck.previous();
        assert_eq!(deck.position(), 3);

        deck.next();
        assert_eq!(deck.position(), 1);
        deck.next();
        deck.next();
        deck.next();
        assert_eq!(deck.position(), 1);
    }

    #[test]
    fn flip_reveals_and_navigation_hides() {
        let mut deck = three_card_deck();
        assert_eq!(deck.visible_side(), "p1");

        deck.flip();
        assert!(deck.is_showing_answer());
        assert_eq!(deck.visible_side(), "a1");

        deck.next();
        assert!(!deck.is_showing_answer());
        assert_eq!(deck.visible_side(), "p2");
    }

    #[test]
    fn shuffle_keeps_the_same_cards_and_resets_position() {
        let mut deck = three_card_deck();
        deck.next();
        deck.flip();

        deck.shuffle();
        assert_eq!(deck.position(), 1);
        assert!(!deck.is_showing_answer());
        assert_eq!(deck.total(), 3);

        let mut prompts: Vec<&str> = deck.cards.iter().map(Flashcard::prompt).collect();
        prompts.sort_unstable();
        assert_eq!(prompts, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn builtin_deck_is_usable() {
        let deck = FlashcardService::builtin();
        assert!(deck.total() >= 3);
        assert!(!deck.current_card().prompt().is_empty());
    }
}
