mod hierarchy_builder;
mod stats;

// Re-export from submodules
pub use hierarchy_builder::HierarchyBuilder;
pub use stats::BuildStats;
