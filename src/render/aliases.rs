use std::collections::HashMap;

use log::warn;
use once_cell::sync::Lazy;

use crate::class::types::{is_container, Variable};
use crate::utils::markup;

/// Raw declared type -> how the manual describes it
static BUILTIN_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Double", "estimable"),
        ("vector<Double>", "estimable vector"),
        ("map<unsigned,Double>", "estimable vector"),
        ("map<string,Double>", "estimable vector"),
        ("double", "real number"),
        ("vector<double>", "vector of real numbers"),
        ("map<unsigned,double>", "vector of real numbers"),
        ("unsigned", "non-negative integer"),
        ("vector<unsigned>", "vector of non-negative integers"),
        ("int", "integer"),
        ("vector<int>", "vector of integers"),
        ("bool", "boolean"),
        ("vector<bool>", "vector of booleans"),
        ("string", "string"),
        ("vector<string>", "vector of strings"),
        ("vector<vector<string>>", "vector of vectors of strings"),
        ("parameters::Table*", "table"),
        ("Table*", "table"),
    ])
});

/// Read-only type alias table handed to the renderer
#[derive(Debug, Clone)]
pub struct TypeAliases {
    entries: HashMap<String, String>,
}

impl Default for TypeAliases {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TypeAliases {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ALIASES
                .iter()
                .map(|(raw, display)| (raw.to_string(), display.to_string()))
                .collect(),
        }
    }

    /// Add or replace aliases, e.g. from the configuration file
    pub fn extend<I, K, V>(&mut self, aliases: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    /// Display type of a variable
    ///
    /// The estimable/addressable flags win over the alias table; a type with
    /// no alias is emitted as its raw token.
    pub fn display_type(&self, var: &Variable) -> String {
        let flagged = if var.is_estimable {
            Some("estimable")
        } else if var.is_addressable {
            Some("addressable")
        } else {
            None
        };
        if let Some(flag) = flagged {
            return if is_container(&var.type_name) {
                format!("{flag} vector")
            } else {
                flag.to_string()
            };
        }

        match self.get(&var.type_name) {
            Some(display) => display.to_string(),
            None => {
                warn!("No alias for type {} of {}, using it verbatim", var.type_name, var.symbol);
                markup::escape(&var.type_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::types::BindKind;
    use test_case::test_case;

    fn var(type_name: &str) -> Variable {
        Variable::new(BindKind::Parameter, "PARAM_X", "x_", "x", type_name)
    }

    #[test_case("Double", "estimable" ; "estimable scalar alias")]
    #[test_case("vector<unsigned>", "vector of non-negative integers" ; "vector alias")]
    #[test_case("parameters::Table*", "table" ; "table")]
    #[test_case("niwa::Selectivity*", "niwa::Selectivity*" ; "raw type leaks")]
    #[test_case("my_type", r"my\_type" ; "raw type is escaped")]
    fn alias_lookup(raw: &str, expected: &str) {
        assert_eq!(TypeAliases::builtin().display_type(&var(raw)), expected);
    }

    #[test_case("double", false, "estimable" ; "estimable scalar")]
    #[test_case("vector<double>", false, "estimable vector" ; "estimable vector")]
    #[test_case("double", true, "addressable" ; "addressable scalar")]
    #[test_case("map<string,Double>", true, "addressable vector" ; "addressable map")]
    fn flags_win_over_aliases(raw: &str, addressable: bool, expected: &str) {
        let mut v = var(raw);
        v.is_estimable = !addressable;
        v.is_addressable = addressable;
        assert_eq!(TypeAliases::builtin().display_type(&v), expected);
    }

    #[test]
    fn configured_aliases_override_builtin() {
        let mut aliases = TypeAliases::builtin();
        aliases.extend([("double", "real")]);
        assert_eq!(aliases.get("double"), Some("real"));
        assert_eq!(aliases.get("bool"), Some("boolean"));
    }
}
