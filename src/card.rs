use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub term: String,
    pub definition: String,
    /// wrong answers since the last `reset stats`
    pub error_count: u32,
}

impl Card {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            error_count: 0,
        }
    }

    pub fn with_errors(mut self, error_count: u32) -> Self {
        self.error_count = error_count;
        self
    }
}

/// One line of a deck file: `term|definition|errorCount`
#[derive(Debug, Serialize, Deserialize)]
pub struct CardRecord {
    pub term: String,
    pub definition: String,
    pub error_count: u32,
}

impl From<&Card> for CardRecord {
    fn from(card: &Card) -> Self {
        Self {
            term: card.term.clone(),
            definition: card.definition.clone(),
            error_count: card.error_count,
        }
    }
}

impl From<CardRecord> for Card {
    fn from(record: CardRecord) -> Self {
        Self {
            term: record.term,
            definition: record.definition,
            error_count: record.error_count,
        }
    }
}
