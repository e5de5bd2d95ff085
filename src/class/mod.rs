pub mod types;
pub mod scanner;
pub mod processor;

// Re-export the main API for easier access
pub use types::{BindKind, Bound, ClassNode, Hierarchy, Variable};
pub use scanner::ClassScanner;
pub use processor::{BuildStats, HierarchyBuilder};
