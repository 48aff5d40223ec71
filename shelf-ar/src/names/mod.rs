//! Name Model
//!
//! Dictionaries, name parsing with surname-first rendering, and the text
//! helpers (folding, inflection stems) every pass compares names with.

pub mod dictionary;
pub mod name;
pub mod text;

pub use dictionary::{Gender, NameDictionary};
pub use name::AuthorName;
pub use text::{fold, split_names, surname_stem};
