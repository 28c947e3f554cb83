//! Dependency-free entity recognizer built on capitalization, suffix cues
//! and a place gazetteer.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::{Entity, EntityCategory, EntityRecognizer};
use crate::error::NerError;

lazy_static! {
    // Capitalized words joined by spaces or tabs, never across a line break.
    static ref ORGANIZATION: Regex = Regex::new(
        r"\b(?:[A-Z][\w&'\-]*[ \t]+)+(?:Inc|Ltd|LLC|GmbH|Corp|Corporation|Company|Co|Limited|PLC|AG|S\.A)\b\.?"
    ).unwrap();

    static ref FACILITY: Regex = Regex::new(
        r"\b(?:[A-Z][\w'\-]*[ \t]+)+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Plaza|Building|Tower|Center|Centre|Airport|Park|Way)\b\.?"
    ).unwrap();

    static ref DEFAULT_PLACES: Regex = gazetteer_regex(PLACES.iter().copied())
        .unwrap();
}

/// Built-in gazetteer: countries, US states, major cities.
const PLACES: &[&str] = &[
    // Countries
    "United States", "USA", "United Kingdom", "UK", "England", "Scotland", "Ireland",
    "Canada", "Mexico", "Brazil", "Argentina", "Germany", "France", "Spain", "Portugal",
    "Italy", "Netherlands", "Belgium", "Switzerland", "Austria", "Poland", "Sweden",
    "Norway", "Denmark", "Finland", "Czech Republic", "Greece", "Turkey", "India",
    "China", "Japan", "Singapore", "Australia", "New Zealand", "South Africa",
    "Nigeria", "Kenya", "Egypt", "United Arab Emirates", "Israel",
    // US states
    "Alabama", "Alaska", "Arizona", "California", "Colorado", "Connecticut", "Florida",
    "Georgia", "Illinois", "Massachusetts", "Michigan", "Minnesota", "Nevada",
    "New Jersey", "New York", "North Carolina", "Ohio", "Oregon", "Pennsylvania",
    "Texas", "Utah", "Virginia", "Washington",
    // Cities
    "London", "Manchester", "Dublin", "Paris", "Berlin", "Munich", "Hamburg", "Madrid",
    "Barcelona", "Lisbon", "Rome", "Milan", "Amsterdam", "Brussels", "Zurich", "Geneva",
    "Vienna", "Warsaw", "Krakow", "Prague", "Stockholm", "Oslo", "Copenhagen", "Helsinki",
    "Toronto", "Vancouver", "Montreal", "Chicago", "Boston", "San Francisco", "Los Angeles",
    "Seattle", "Austin", "Houston", "Dallas", "Miami", "Atlanta", "Denver", "Mumbai",
    "Delhi", "Bangalore", "Tokyo", "Shanghai", "Beijing", "Hong Kong", "Sydney",
    "Melbourne", "Auckland", "Dubai", "Cape Town", "Nairobi", "Lagos",
];

/// Case-sensitive whole-word alternation over place names, longest first so
/// "New York" wins over a shorter overlapping entry.
fn gazetteer_regex<'a>(places: impl Iterator<Item = &'a str>) -> Result<Regex, regex::Error> {
    let mut names: Vec<&str> = places.filter(|p| !p.trim().is_empty()).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    names.dedup();

    let alternation = names
        .iter()
        .map(|name| regex::escape(name.trim()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation))
}

/// Recognizes organizations, facilities and geo-political entities.
///
/// - Organization: capitalized words ending in a corporate suffix.
/// - Facility: capitalized words ending in a street or building word.
/// - Geo-political entity: a gazetteer hit.
///
/// Overlapping candidates keep the earliest span, longest on ties.
pub struct HeuristicRecognizer {
    places: Regex,
}

impl HeuristicRecognizer {
    /// Recognizer with the built-in gazetteer.
    pub fn new() -> Self {
        Self {
            places: DEFAULT_PLACES.clone(),
        }
    }

    /// Recognizer with the built-in gazetteer plus `extra` place names.
    pub fn with_places<I, S>(extra: I) -> Result<Self, NerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra: Vec<S> = extra.into_iter().collect();
        if extra.is_empty() {
            return Ok(Self::new());
        }

        let places = gazetteer_regex(
            PLACES
                .iter()
                .copied()
                .chain(extra.iter().map(|s| s.as_ref())),
        )
        .map_err(|e| NerError::Backend(format!("invalid gazetteer: {}", e)))?;

        Ok(Self { places })
    }
}

impl Default for HeuristicRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    fn entities(&self, text: &str) -> Result<Vec<Entity>, NerError> {
        let mut candidates = Vec::new();
        for (regex, category) in [
            (&*ORGANIZATION, EntityCategory::Organization),
            (&*FACILITY, EntityCategory::Facility),
            (&self.places, EntityCategory::GeoPoliticalEntity),
        ] {
            candidates.extend(
                regex
                    .find_iter(text)
                    .map(|m| Entity::new(m.as_str(), category, m.start(), m.end())),
            );
        }

        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut entities: Vec<Entity> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !entities.iter().any(|kept| kept.overlaps(&candidate)) {
                entities.push(candidate);
            }
        }

        trace!("Heuristic NER found {} entities", entities.len());
        Ok(entities)
    }
}
