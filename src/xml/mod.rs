//! XML wire-format engine.
//!
//! The API speaks XML; everything above this module speaks either typed
//! models or the JSON tree these converters produce. Two tree generations
//! exist at the boundary: the attribute-wrapped form (map elements) and
//! the flattened form (notes, users, preferences); see [`flatten`].

pub mod flatten;
pub mod formatter;
pub mod parser;

pub use flatten::flatten;
pub use formatter::{escape_xml, write_document};
pub use parser::{parse_document, ATTR_KEY, TEXT_KEY};
