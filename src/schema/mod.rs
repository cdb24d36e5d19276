pub mod derive;
pub mod types;

pub use derive::derive_columns;
pub use types::{is_missing, Affinity, Column, MISSING_MARKERS};
