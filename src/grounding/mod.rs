//! Pre/post-processing around a single GUI-grounding inference call.
//!
//! resize plan → prompt → (model) → parser → resolver → script

pub mod parser;
pub mod prompt;
pub mod resize;
pub mod resolve;
pub mod script;
pub mod types;
