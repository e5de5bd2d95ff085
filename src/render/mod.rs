//! Markup output for built hierarchies

mod aliases;
mod latex;
mod names;

pub use aliases::TypeAliases;
pub use latex::{LatexRenderer, OUTPUT_EXTENSION};
pub use names::NameRules;
