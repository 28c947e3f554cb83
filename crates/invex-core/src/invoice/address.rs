//! Address resolution from named entities.

use std::sync::Arc;

use tracing::debug;

use crate::error::NerError;
use crate::ner::{Entity, EntityCategory, EntityRecognizer};

/// Entity categories that make up an address.
pub const ADDRESS_CATEGORIES: [EntityCategory; 3] = [
    EntityCategory::GeoPoliticalEntity,
    EntityCategory::Facility,
    EntityCategory::Organization,
];

/// Builds a free-form address from the place-like entities in a text.
#[derive(Clone)]
pub struct AddressResolver {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl AddressResolver {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Join the address-category entities of `text` with single spaces, in
    /// text order. `None` when there are none.
    pub fn resolve(&self, text: &str) -> Result<Option<String>, NerError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let entities = self.recognizer.entities(text)?;
        debug!("NER returned {} entities", entities.len());
        Ok(join_address(entities))
    }
}

fn join_address(entities: Vec<Entity>) -> Option<String> {
    let mut kept: Vec<Entity> = entities
        .into_iter()
        .filter(|e| ADDRESS_CATEGORIES.contains(&e.category))
        .collect();
    kept.sort_by_key(|e| e.start);
    kept.dedup_by(|b, a| a.start == b.start && a.end == b.end);

    let address = kept
        .iter()
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}
