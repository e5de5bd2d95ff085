use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, trace, warn};

use super::tokenizer::{brace_delta, strip_comments};
use crate::error::Result;
use crate::utils::file_utils;

/// Member name -> raw declared type for one type (plus whatever it inherits)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberTable {
    members: BTreeMap<String, String>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the framework-level members every configurable object has
    pub fn with_framework_members() -> Self {
        let mut table = Self::new();
        table.insert("label_", "string");
        table.insert("type_", "string");
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        self.members.insert(name.into(), type_name.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.members.get(name).map(String::as_str)
    }

    /// Layer this table's declarations over `base`; own declarations win
    pub fn layered_over(&self, base: &MemberTable) -> MemberTable {
        let mut members = base.members.clone();
        members.extend(self.members.clone());
        MemberTable { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutsideClass,
    /// Saw `class Name ...` without its opening brace yet
    AwaitingBrace,
    InsideClass { depth: i32 },
    Done,
}

/// Extracts member-variable declarations of one type from a declaration file
#[derive(Debug)]
pub struct MemberScanner {
    class_name: String,
}

impl MemberScanner {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
        }
    }

    /// Whether `line` starts the definition (not a forward declaration) of this class
    fn opens_class(&self, line: &str) -> bool {
        let Some(rest) = line.strip_prefix("class") else {
            return false;
        };
        if !rest.starts_with(char::is_whitespace) || line.ends_with(';') {
            return false;
        }
        let rest = rest.trim_start();
        let Some(name) = rest.get(..self.class_name.len()) else {
            return false;
        };
        name.eq_ignore_ascii_case(&self.class_name)
            && !rest[self.class_name.len()..]
                .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Scan a declaration file on disk
    pub fn scan_file(&self, header: impl AsRef<Path>) -> Result<MemberTable> {
        let header = header.as_ref();
        debug!("Loading members of {} from {}", self.class_name, header.display());
        let content = file_utils::read_file_to_string(header)?;
        let table = self.scan(&content);
        if table.is_empty() {
            warn!("No members of {} found in {}", self.class_name, header.display());
        }
        Ok(table)
    }

    /// Scan the text of a declaration file
    pub fn scan(&self, content: &str) -> MemberTable {
        let mut table = MemberTable::new();
        let mut state = State::OutsideClass;
        let mut in_comment = false;

        for raw in content.lines() {
            let line = strip_comments(raw, &mut in_comment);
            let line = line.trim();

            state = match state {
                State::OutsideClass if self.opens_class(line) => {
                    trace!("Class {} opens: {}", self.class_name, line);
                    if line.ends_with('{') {
                        State::InsideClass { depth: 1 }
                    } else {
                        State::AwaitingBrace
                    }
                }
                State::AwaitingBrace if line.contains('{') => State::InsideClass {
                    depth: brace_delta(line).max(1),
                },
                State::InsideClass { depth } => {
                    // declarations live at the top level of the class body
                    if depth == 1 {
                        if let Some((type_name, name)) = member_declaration(line) {
                            trace!("Storing member {} : {}", name, type_name);
                            table.insert(name, type_name);
                        }
                    }
                    let depth = depth + brace_delta(line);
                    if depth <= 0 {
                        State::Done
                    } else {
                        State::InsideClass { depth }
                    }
                }
                other => other,
            };

            if state == State::Done {
                break;
            }
        }

        debug!("Found {} members in {}", table.len(), self.class_name);
        table
    }
}

/// Parse one class-body line as a `(type, name)` member declaration
///
/// Lines that are access labels, method declarations, templates or anything
/// that does not reduce to exactly two tokens are not declarations.
pub fn member_declaration(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty()
        || line.starts_with('#')
        || line.contains('(')
        || line.contains(')')
        || line.contains("template")
        || is_access_label(line)
        || !line.ends_with(';')
    {
        return None;
    }

    let line = line.trim_end_matches(';');
    let line = match line.find('=') {
        Some(at) => &line[..at],
        None => line,
    };
    let line = match line.find('{') {
        Some(at) => &line[..at],
        None => line,
    };

    let normalized = normalize_type_spacing(line);
    let mut tokens = normalized.split_whitespace();
    let (Some(type_name), Some(name), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };

    // `Model *model_` declares a pointer member named `model_`
    let sigils: String = name.chars().take_while(|c| matches!(c, '*' | '&')).collect();
    let name = &name[sigils.len()..];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    Some((format!("{type_name}{sigils}"), name.to_string()))
}

fn is_access_label(line: &str) -> bool {
    matches!(
        line.trim_end_matches(':').trim(),
        "public" | "protected" | "private" | "signals" | "slots"
    ) && line.ends_with(':')
}

/// Collapse whitespace inside generic types
///
/// `vector< vector<string> >` becomes `vector<vector<string>>` and
/// `map<string, Double>` becomes `map<string,Double>`, while the space that
/// separates a type from the member name survives.
pub fn normalize_type_spacing(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            let prev = out.chars().last();
            let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
            let after_opener = matches!(prev, Some('<') | Some(',')) || prev.is_some_and(char::is_whitespace);
            let before_closer = matches!(next, Some('>') | Some(','));
            if after_opener || before_closer {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const HEADER: &str = r#"
#ifndef LIKELIHOODS_MULTINOMIAL_H_
#define LIKELIHOODS_MULTINOMIAL_H_

namespace niwa {
namespace likelihoods {

class MultinomialHelper;

class Multinomial : public niwa::Likelihood {
public:
  // methods
  Multinomial(shared_ptr<Model> model);
  virtual ~Multinomial() = default;
  template <typename T> void Apply(T value);

protected:
  // members
  Double                      b_;
  vector< vector<string> >    category_labels_;
  map<string, Double>         proportions_;
  parameters::Table*          table_ = nullptr;
  Selectivity                 *selectivity_;
  unsigned int                wide_count_;
  struct Fishery {
    string    label_;
  };
  vector<unsigned>            ages_;
};

} /* namespace likelihoods */
} /* namespace niwa */
#endif
"#;

    #[test]
    fn extracts_members_of_the_named_class() {
        let table = MemberScanner::new("Multinomial").scan(HEADER);
        assert_eq!(table.get("b_"), Some("Double"));
        assert_eq!(table.get("category_labels_"), Some("vector<vector<string>>"));
        assert_eq!(table.get("proportions_"), Some("map<string,Double>"));
        assert_eq!(table.get("table_"), Some("parameters::Table*"));
        assert_eq!(table.get("selectivity_"), Some("Selectivity*"));
        assert_eq!(table.get("ages_"), Some("vector<unsigned>"));
    }

    #[test]
    fn skips_non_declarations() {
        let table = MemberScanner::new("Multinomial").scan(HEADER);
        // three tokens
        assert_eq!(table.get("wide_count_"), None);
        // nested struct members are not members of the class
        assert_eq!(table.get("label_"), None);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn forward_declaration_does_not_open_the_class() {
        let table = MemberScanner::new("MultinomialHelper").scan(HEADER);
        assert!(table.is_empty());
    }

    #[test]
    fn brace_on_following_line() {
        let header = "class Process\n  : public base::Object\n{\npublic:\n  string units_;\n};\n";
        let table = MemberScanner::new("Process").scan(header);
        assert_eq!(table.get("units_"), Some("string"));
    }

    #[test]
    fn similarly_named_class_is_ignored() {
        let header = "class ProcessExtra {\n  string units_;\n};\n";
        assert!(MemberScanner::new("Process").scan(header).is_empty());
    }

    #[test_case("vector< vector<string> > names_", "vector<vector<string>> names_" ; "nested generic")]
    #[test_case("map<string, Double>  values_", "map<string,Double> values_" ; "comma spacing")]
    #[test_case("Double b_", "Double b_" ; "plain")]
    fn normalizes_generic_spacing(input: &str, expected: &str) {
        assert_eq!(normalize_type_spacing(input), expected);
    }

    #[test_case("public:" ; "access label")]
    #[test_case("void DoBuild() override;" ; "method")]
    #[test_case("unsigned int count_;" ; "three tokens")]
    #[test_case("" ; "blank")]
    fn rejects(line: &str) {
        assert_eq!(member_declaration(line), None);
    }

    #[test]
    fn layering_prefers_own_declarations() {
        let mut base = MemberTable::with_framework_members();
        base.insert("a_", "double");
        let mut own = MemberTable::new();
        own.insert("a_", "Double");
        let layered = own.layered_over(&base);
        assert_eq!(layered.get("a_"), Some("Double"));
        assert_eq!(layered.get("label_"), Some("string"));
    }
}
