use std::fmt::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::aliases::TypeAliases;
use super::names::NameRules;
use crate::class::types::{ClassNode, Hierarchy, Variable};
use crate::config::Category;
use crate::error::Result;
use crate::utils::file_utils;

/// Extension of the generated markup files
pub const OUTPUT_EXTENSION: &str = "tex";

/// Emits the manual's LaTeX syntax section for one category
#[derive(Debug, Clone, Copy)]
pub struct LatexRenderer<'a> {
    aliases: &'a TypeAliases,
    names: &'a NameRules,
}

impl<'a> LatexRenderer<'a> {
    pub fn new(aliases: &'a TypeAliases, names: &'a NameRules) -> Self {
        Self { aliases, names }
    }

    /// `<output_dir>/<Root>.tex`
    pub fn output_path(output_dir: &Path, hierarchy: &Hierarchy) -> PathBuf {
        output_dir.join(format!("{}.{}", hierarchy.root.name, OUTPUT_EXTENSION))
    }

    /// Render and write one category; returns the written file
    pub fn write(&self, hierarchy: &Hierarchy, category: &Category, output_dir: &Path) -> Result<PathBuf> {
        let path = Self::output_path(output_dir, hierarchy);
        let content = self.render(hierarchy, category);
        file_utils::write_string_to_file(&path, &content)?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn render(&self, hierarchy: &Hierarchy, category: &Category) -> String {
        let root = &hierarchy.root;
        let root_command = self.names.command(&root.name);
        let mut s = String::new();

        let _ = writeln!(
            s,
            r"\defComLab{{{}}}{{Define an object of type \emph{{{}}}}}",
            root_command,
            self.names.label(&root.name)
        );
        let _ = writeln!(s);
        self.render_variables(&mut s, root);

        for child in root.children.values() {
            self.render_subtree(&mut s, child, &root_command, category);
        }
        s
    }

    /// A subsection for `node`, then one for each of its descendants
    fn render_subtree(&self, s: &mut String, node: &ClassNode, root_command: &str, category: &Category) {
        if category.is_suppressed(&node.name) {
            debug!("Suppressing {} in {}", node.name, category.folder);
            return;
        }

        let _ = writeln!(
            s,
            r"\subsubsection[{}]{{\commandlabsubarg{{{}}}{{type}}{{{}}}}}",
            self.names.label(&node.name),
            root_command,
            self.names.command(&node.name)
        );
        let _ = writeln!(s);
        self.render_variables(s, node);

        for child in node.children.values() {
            self.render_subtree(s, child, root_command, category);
        }
    }

    fn render_variables(&self, s: &mut String, node: &ClassNode) {
        for var in node.ordered_variables().filter(|v| v.is_rendered()) {
            self.render_variable(s, var);
        }
    }

    fn render_variable(&self, s: &mut String, var: &Variable) {
        let _ = writeln!(s, r"\defSub{{{}}} {{{}}}", var.name, var.description);
        let _ = writeln!(s, r"\defType{{{}}}", self.aliases.display_type(var));
        if let Some(default) = var.default.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(s, r"\defDefault{{{}}}", default);
        }
        if !var.value.is_empty() {
            let _ = writeln!(s, r"\defValue{{{}}}", var.value);
        }
        if let Some(bound) = &var.lower_bound {
            let _ = writeln!(s, r"\defLowerBound{{{}}}", bound);
        }
        if let Some(bound) = &var.upper_bound {
            let _ = writeln!(s, r"\defUpperBound{{{}}}", bound);
        }
        if let Some(values) = &var.allowed_values {
            let _ = writeln!(s, r"\defAllowedValues{{{}}}", values.join(", "));
        }
        let _ = writeln!(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::types::{BindKind, Bound, LABEL_SYMBOL, TYPE_SYMBOL};
    use crate::config::default_name_rules;
    use pretty_assertions::assert_eq;

    fn hierarchy() -> Hierarchy {
        let synthetic = [
            Variable::synthetic(LABEL_SYMBOL, "label", "The label of the object"),
            Variable::synthetic(TYPE_SYMBOL, "type", "The type of the object"),
        ];
        let mut units = Variable::new(BindKind::Parameter, "PARAM_UNITS", "units_", "units", "string");
        units.description = "Units".into();
        units.default = Some("kgs".into());
        units.allowed_values = Some(vec!["kgs".into(), "tonnes".into()]);
        let root = ClassNode::root("MCMC", synthetic, vec![units]);

        let mut step = Variable::new(BindKind::Parameter, "PARAM_STEP", "step_", "step", "Double");
        step.description = "Step size".into();
        step.value = "0.5".into();
        step.lower_bound = Some(Bound::new("0", false));
        step.upper_bound = Some(Bound::new("1", true));
        let random_walk = ClassNode::derive(&root, "RandomWalkMetropolisHastings", vec![step]);
        let independence = ClassNode::derive(&root, "IndependenceMetropolis", Vec::new());

        Hierarchy {
            category: "MCMC".into(),
            root: root.with_child(random_walk).with_child(independence),
        }
    }

    #[test]
    fn renders_category_with_subsections() {
        let aliases = TypeAliases::builtin();
        let names = NameRules::new(default_name_rules());
        let category = Category::new("MCMC").suppressing("IndependenceMetropolis");
        let text = LatexRenderer::new(&aliases, &names).render(&hierarchy(), &category);

        let expected = r"\defComLab{mcmc}{Define an object of type \emph{MCMC}}

\defSub{label} {The label of the object}
\defType{string}

\defSub{type} {The type of the object}
\defType{string}

\defSub{units} {Units}
\defType{string}
\defDefault{kgs}
\defAllowedValues{kgs, tonnes}

\subsubsection[Random Walk Metropolis Hastings]{\commandlabsubarg{mcmc}{type}{random\_walk\_metropolis\_hastings}}

\defSub{step} {Step size}
\defType{estimable}
\defValue{0.5}
\defLowerBound{0 (exclusive)}
\defUpperBound{1 (inclusive)}

";
        assert_eq!(text, expected);
    }

    #[test]
    fn writes_root_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("syntax");
        let aliases = TypeAliases::builtin();
        let names = NameRules::default();
        let path = LatexRenderer::new(&aliases, &names)
            .write(&hierarchy(), &Category::new("MCMC"), &out)
            .unwrap();
        assert_eq!(path, out.join("MCMC.tex"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("independence"));
    }
}
