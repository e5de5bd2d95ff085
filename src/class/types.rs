use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Symbol of the framework-level label every configurable object carries
pub const LABEL_SYMBOL: &str = "PARAM_LABEL";

/// Symbol of the framework-level type every configurable object carries
pub const TYPE_SYMBOL: &str = "PARAM_TYPE";

/// How a variable entered the documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindKind {
    /// `parameters_.Bind<T>(...)`
    Parameter,
    /// `parameters_.BindTable(...)`
    Table,
    /// Registered as addressable without a matching bind
    Placeholder,
    /// The `label` / `type` entries seeded on every root
    Synthetic,
}

/// Numeric bound on a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub value: String,
    pub inclusive: bool,
}

impl Bound {
    pub fn new(value: impl Into<String>, inclusive: bool) -> Self {
        Self {
            value: value.into(),
            inclusive,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.inclusive { "inclusive" } else { "exclusive" };
        write!(f, "{} ({})", self.value, kind)
    }
}

/// One documented configuration parameter
///
/// Text fields hold render-ready markup: translated names and literal text
/// are escaped when extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Symbolic key, e.g. `PARAM_AGE`
    pub symbol: String,
    /// Backing member variable, e.g. `age_`
    pub member: String,
    /// Display name; empty when the variable is not rendered at this level
    pub name: String,
    /// Raw declared type token, e.g. `vector<unsigned>`
    pub type_name: String,
    pub description: String,
    /// Example value
    pub value: String,
    pub default: Option<String>,
    pub lower_bound: Option<Bound>,
    pub upper_bound: Option<Bound>,
    pub allowed_values: Option<Vec<String>>,
    /// A container bind may be left out of the configuration
    #[serde(default)]
    pub is_optional: bool,
    pub is_estimable: bool,
    pub is_addressable: bool,
    pub kind: BindKind,
}

impl Variable {
    pub fn new(
        kind: BindKind,
        symbol: impl Into<String>,
        member: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            member: member.into(),
            name: name.into(),
            type_name: type_name.into(),
            description: String::new(),
            value: String::new(),
            default: None,
            lower_bound: None,
            upper_bound: None,
            allowed_values: None,
            is_optional: false,
            is_estimable: false,
            is_addressable: false,
            kind,
        }
    }

    /// The string-typed `label` / `type` entries present on every object
    pub fn synthetic(symbol: &str, name: &str, description: &str) -> Self {
        let mut var = Self::new(BindKind::Synthetic, symbol, "", name, "string");
        var.description = description.to_string();
        var
    }

    /// Whether this variable produces output at its level
    pub fn is_rendered(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Whether a raw type holds several values, e.g. `vector<double>`
pub fn is_container(type_name: &str) -> bool {
    ["vector<", "map<", "OrderedMap<"]
        .iter()
        .any(|prefix| type_name.starts_with(prefix))
}

/// One configurable type in a category's hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    /// Empty for the category root
    pub parent_name: String,
    /// Every variable visible on this type, keyed by symbol; includes inherited ones
    pub variables: BTreeMap<String, Variable>,
    /// Symbols documented at this level, in render order
    pub variable_order: Vec<String>,
    /// Subtypes, kept sorted by name
    pub children: BTreeMap<String, ClassNode>,
    /// Declaration file this type was read from
    pub file_path: Option<PathBuf>,
}

impl ClassNode {
    /// Create a category root seeded with the synthetic `label` / `type` entries,
    /// then layer the root's own variables on top
    pub fn root(
        name: impl Into<String>,
        synthetic: [Variable; 2],
        own: Vec<Variable>,
    ) -> Self {
        let mut node = Self {
            name: name.into(),
            ..Self::default()
        };
        for var in synthetic {
            node.variable_order.push(var.symbol.clone());
            node.variables.insert(var.symbol.clone(), var);
        }
        node.layer(own);
        node
    }

    /// Create a subtype of `parent`
    ///
    /// The child sees a snapshot of every parent variable; the synthetic
    /// `label` / `type` names are cleared on the snapshot since subtypes do not
    /// redeclare them. Only the child's own variables are documented at its level.
    pub fn derive(parent: &ClassNode, name: impl Into<String>, own: Vec<Variable>) -> Self {
        let mut variables = parent.variables.clone();
        for symbol in [LABEL_SYMBOL, TYPE_SYMBOL] {
            if let Some(var) = variables.get_mut(symbol) {
                var.name.clear();
            }
        }

        let mut node = Self {
            name: name.into(),
            parent_name: parent.name.clone(),
            variables,
            ..Self::default()
        };
        node.layer(own);
        node
    }

    /// Attach a finished subtype
    pub fn with_child(mut self, child: ClassNode) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    /// Variables documented at this level, in render order
    pub fn ordered_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variable_order
            .iter()
            .filter_map(|symbol| self.variables.get(symbol))
    }

    /// Number of nodes in this subtree, this one included
    pub fn type_count(&self) -> usize {
        1 + self.children.values().map(ClassNode::type_count).sum::<usize>()
    }

    /// Number of rendered variables in this subtree
    pub fn documented_count(&self) -> usize {
        self.ordered_variables().filter(|v| v.is_rendered()).count()
            + self
                .children
                .values()
                .map(ClassNode::documented_count)
                .sum::<usize>()
    }

    fn layer(&mut self, own: Vec<Variable>) {
        for var in own {
            if !self.variable_order.contains(&var.symbol) {
                self.variable_order.push(var.symbol.clone());
            }
            self.variables.insert(var.symbol.clone(), var);
        }
    }
}

/// The class tree built for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    /// Catalog folder, e.g. `Likelihoods`
    pub category: String,
    pub root: ClassNode,
}
