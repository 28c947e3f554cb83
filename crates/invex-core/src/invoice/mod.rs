//! Invoice field extraction: pattern rules, address resolution, validation.

mod address;
mod fields;
pub mod patterns;
mod validator;

pub use address::{AddressResolver, ADDRESS_CATEGORIES};
pub use fields::{extract_field, extract_fields};
pub use patterns::{FieldPatternSet, FieldPatternSetBuilder};
pub use validator::{is_valid, validate};
