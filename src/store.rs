use crate::card::Card;
use itertools::Itertools;
use log::*;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateTerm(String),
    DuplicateDefinition(String),
    NoSuchCard(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateTerm(term) => write!(f, "The card \"{term}\" already exists."),
            StoreError::DuplicateDefinition(definition) => {
                write!(f, "The definition \"{definition}\" already exists.")
            }
            StoreError::NoSuchCard(term) => {
                write!(f, "Can't remove \"{term}\": there is no such card.")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Outcome of a single quiz answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong {
        expected: String,
        /// terms of other cards whose definition is the given answer
        correct_for: Vec<String>,
    },
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "Correct!"),
            Verdict::Wrong {
                expected,
                correct_for,
            } => {
                write!(f, "Wrong. The right answer is \"{expected}\"")?;
                for term in correct_for {
                    write!(f, ", but your definition is correct for \"{term}\"")?;
                }
                write!(f, ".")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hardest {
    NoErrors,
    Cards { terms: Vec<String>, errors: u32 },
}

impl fmt::Display for Hardest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hardest::NoErrors => write!(f, "There are no cards with errors."),
            Hardest::Cards { terms, errors } if terms.len() == 1 => write!(
                f,
                "The hardest card is \"{}\". You have {errors} errors answering it.",
                terms[0]
            ),
            Hardest::Cards { terms, errors } => write!(
                f,
                "The hardest cards are {}. You have {errors} errors answering them.",
                terms.iter().map(|t| format!("\"{t}\"")).join(", ")
            ),
        }
    }
}

/// Ordered deck of cards; terms and definitions are unique
#[derive(Debug, Default, Clone)]
pub struct CardStore {
    cards: Vec<Card>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn lookup_by_term(&self, term: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.term == term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.lookup_by_term(term).is_some()
    }

    pub fn contains_definition(&self, definition: &str) -> bool {
        self.cards.iter().any(|card| card.definition == definition)
    }

    pub fn add(&mut self, term: &str, definition: &str) -> Result<(), StoreError> {
        if self.contains_term(term) {
            return Err(StoreError::DuplicateTerm(term.to_owned()));
        }
        if self.contains_definition(definition) {
            return Err(StoreError::DuplicateDefinition(definition.to_owned()));
        }
        debug!("add {term:?}");
        self.cards.push(Card::new(term, definition));
        Ok(())
    }

    pub fn remove(&mut self, term: &str) -> Result<Card, StoreError> {
        let index = self
            .lookup_by_term(term)
            .ok_or_else(|| StoreError::NoSuchCard(term.to_owned()))?;
        debug!("remove {term:?}");
        Ok(self.cards.remove(index))
    }

    /// Replace the card with the same term in place, or append.
    ///
    /// A definition held by a card with another term is rejected.
    pub fn upsert(&mut self, card: Card) -> Result<(), StoreError> {
        if self
            .cards
            .iter()
            .any(|c| c.term != card.term && c.definition == card.definition)
        {
            return Err(StoreError::DuplicateDefinition(card.definition));
        }
        match self.lookup_by_term(&card.term) {
            Some(index) => self.cards[index] = card,
            None => self.cards.push(card),
        }
        Ok(())
    }

    /// Judge `answer` for the card at `index` without touching its error count.
    ///
    /// # Panics
    /// if `index` is out of bounds
    pub fn check_answer(&self, index: usize, answer: &str) -> Verdict {
        let card = &self.cards[index];
        if card.definition == answer {
            return Verdict::Correct;
        }
        let correct_for = self
            .cards
            .iter()
            .filter(|c| c.term != card.term && c.definition == answer)
            .map(|c| c.term.clone())
            .collect();
        Verdict::Wrong {
            expected: card.definition.clone(),
            correct_for,
        }
    }

    pub fn record_failure(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            card.error_count = card.error_count.saturating_add(1);
        }
    }

    /// uniformly random index, `None` on an empty deck
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.cards.is_empty() {
            None
        } else {
            Some(rng.random_range(0..self.cards.len()))
        }
    }

    pub fn reset_stats(&mut self) {
        for card in &mut self.cards {
            card.error_count = 0;
        }
    }

    pub fn hardest(&self) -> Hardest {
        let max = self
            .cards
            .iter()
            .map(|card| card.error_count)
            .max()
            .unwrap_or(0);
        if max == 0 {
            return Hardest::NoErrors;
        }
        let terms = self
            .cards
            .iter()
            .filter(|card| card.error_count == max)
            .map(|card| card.term.clone())
            .collect();
        Hardest::Cards { terms, errors: max }
    }
}
