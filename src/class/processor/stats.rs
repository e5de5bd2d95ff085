use serde::Serialize;

/// Statistics for building category hierarchies
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Number of categories built
    pub categories: usize,

    /// Number of types in the built hierarchies, roots included
    pub types: usize,

    /// Number of variables that will be rendered
    pub documented_variables: usize,

    /// Number of source files read (declarations and definitions)
    pub files_read: usize,

    /// Number of types that declare no parameters of their own
    pub types_without_parameters: usize,
}

impl BuildStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another stats instance into this one
    pub fn merge(&mut self, other: &Self) {
        self.categories += other.categories;
        self.types += other.types;
        self.documented_variables += other.documented_variables;
        self.files_read += other.files_read;
        self.types_without_parameters += other.types_without_parameters;
    }

    /// Average number of documented variables per type
    pub fn avg_variables_per_type(&self) -> f64 {
        if self.types == 0 {
            return 0.0;
        }

        self.documented_variables as f64 / self.types as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_counts() {
        let mut total = BuildStats {
            categories: 1,
            types: 3,
            documented_variables: 9,
            files_read: 6,
            types_without_parameters: 0,
        };
        total.merge(&BuildStats {
            categories: 1,
            types: 1,
            documented_variables: 3,
            files_read: 2,
            types_without_parameters: 1,
        });
        assert_eq!(total.types, 4);
        assert_eq!(total.types_without_parameters, 1);
        assert_eq!(total.avg_variables_per_type(), 3.0);
        assert_eq!(BuildStats::new().avg_variables_per_type(), 0.0);
    }
}
