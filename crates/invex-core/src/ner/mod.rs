//! Named entity recognition seam.

mod heuristic;

pub use heuristic::HeuristicRecognizer;

use serde::{Deserialize, Serialize};

use crate::error::NerError;

/// Semantic category of a recognized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Countries, states, cities.
    GeoPoliticalEntity,
    /// Buildings, streets, airports.
    Facility,
    /// Companies and institutions.
    Organization,
    Person,
    /// Non-political places (regions, bodies of water).
    Location,
    Other,
}

/// An entity found in text, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub category: EntityCategory,
    pub start: usize,
    pub end: usize,
}

impl Entity {
    pub fn new(text: impl Into<String>, category: EntityCategory, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            category,
            start,
            end,
        }
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Maps text to labelled entities.
pub trait EntityRecognizer: Send + Sync {
    fn entities(&self, text: &str) -> Result<Vec<Entity>, NerError>;
}

/// Returns a fixed entity list regardless of input.
pub struct StaticRecognizer {
    entities: Vec<Entity>,
}

impl StaticRecognizer {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }
}

impl EntityRecognizer for StaticRecognizer {
    fn entities(&self, _text: &str) -> Result<Vec<Entity>, NerError> {
        Ok(self.entities.clone())
    }
}
