use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, trace, warn};

use super::member_scanner::MemberTable;
use super::statement::{is_statement_start, parse_statement, Modifier, Statement};
use super::tokenizer::{brace_delta, split_arguments, strip_comments, unquote};
use crate::class::types::{is_container, BindKind, Bound, Variable};
use crate::error::{ExtractError, Result, SourceLocation};
use crate::translation::TranslationTable;
use crate::utils::{file_utils, markup};

/// A statement reassembled from one or more physical lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalStatement {
    pub text: String,
    /// Where the statement starts
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    /// Inside the constructor signature or its initializer list
    BeforeBrace,
    Body { depth: i32 },
    Done,
}

/// Turns the parameter-declaring statements of one constructor into variables
#[derive(Debug)]
pub struct ConstructorExtractor<'a> {
    class_name: &'a str,
    translations: &'a TranslationTable,
    members: &'a MemberTable,
    /// Variables visible from the parent type, keyed by symbol
    inherited: &'a BTreeMap<String, Variable>,
}

impl<'a> ConstructorExtractor<'a> {
    pub fn new(
        class_name: &'a str,
        translations: &'a TranslationTable,
        members: &'a MemberTable,
        inherited: &'a BTreeMap<String, Variable>,
    ) -> Self {
        Self {
            class_name,
            translations,
            members,
            inherited,
        }
    }

    /// Extract the variables declared by the constructor in a definition file
    pub fn extract_file(&self, source: impl AsRef<Path>) -> Result<Vec<Variable>> {
        let source = source.as_ref();
        debug!("Loading parameters of {} from {}", self.class_name, source.display());
        let content = file_utils::read_file_to_string(source)?;
        self.extract(&content, source)
    }

    /// Extract the variables declared by the constructor in `content`
    ///
    /// Variables come back in statement order. Inherited variables touched by
    /// a registration are copied into the result with the new flag set.
    pub fn extract(&self, content: &str, file: &Path) -> Result<Vec<Variable>> {
        let Some(statements) = self.collect_statements(content, file)? else {
            warn!(
                "No constructor {0}::{0} found in {1}",
                self.class_name,
                file.display()
            );
            return Ok(Vec::new());
        };

        let mut own = Vec::new();
        for statement in &statements {
            match parse_statement(&statement.text, &statement.location)? {
                Some(Statement::Bind { args, modifiers, .. }) => {
                    let var = self.bind(&args, &modifiers, &statement.location)?;
                    upsert(&mut own, var);
                }
                Some(Statement::BindTable { args }) => {
                    let var = self.bind_table(&args, &statement.location)?;
                    upsert(&mut own, var);
                }
                Some(Statement::Register { args }) => {
                    self.register(&args, &mut own, &statement.location)?;
                }
                None => {}
            }
        }

        debug!("Loaded {} parameters for {}", own.len(), self.class_name);
        Ok(own)
    }

    /// Reassemble the recognized statements of the constructor body
    ///
    /// Returns `None` when the file has no constructor for this type.
    pub fn collect_statements(
        &self,
        content: &str,
        file: &Path,
    ) -> Result<Option<Vec<LogicalStatement>>> {
        let mut statements = Vec::new();
        let mut pending: Option<LogicalStatement> = None;
        let mut state = State::Outside;
        let mut in_comment = false;

        for (index, raw) in content.lines().enumerate() {
            let stripped = strip_comments(raw, &mut in_comment);
            let line = stripped.trim();

            state = match state {
                State::Outside if self.opens_constructor(line) => {
                    trace!("Constructor of {} starts at line {}", self.class_name, index + 1);
                    enter_body(line).unwrap_or(State::BeforeBrace)
                }
                State::BeforeBrace => enter_body(line).unwrap_or(State::BeforeBrace),
                State::Body { depth } => {
                    match pending.as_mut() {
                        Some(statement) => {
                            statement.text.push(' ');
                            statement.text.push_str(line);
                        }
                        None if is_statement_start(line) => {
                            pending = Some(LogicalStatement {
                                text: line.to_string(),
                                location: SourceLocation::new(file, index + 1),
                            });
                        }
                        None => {}
                    }
                    if pending.as_ref().is_some_and(|s| s.text.ends_with(';')) {
                        statements.extend(pending.take());
                    }

                    let depth = depth + brace_delta(line);
                    if depth > 0 {
                        State::Body { depth }
                    } else {
                        if let Some(statement) = pending.take() {
                            return Err(ExtractError::malformed(
                                &statement.location,
                                "statement not terminated before the constructor ends",
                            ));
                        }
                        State::Done
                    }
                }
                other => other,
            };

            if state == State::Done {
                return Ok(Some(statements));
            }
        }

        match state {
            State::Outside => Ok(None),
            _ => {
                warn!(
                    "Constructor of {} in {} is not closed",
                    self.class_name,
                    file.display()
                );
                Ok(Some(statements))
            }
        }
    }

    /// Whether `line` starts this type's own constructor, e.g. `Multinomial::Multinomial(`
    fn opens_constructor(&self, line: &str) -> bool {
        let needle = format!("{0}::{0}", self.class_name).to_ascii_lowercase();
        let lower = line.to_ascii_lowercase();
        lower
            .strip_prefix(&needle)
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    }

    fn bind(
        &self,
        args: &[String],
        modifiers: &[Modifier],
        location: &SourceLocation,
    ) -> Result<Variable> {
        if !(4..=5).contains(&args.len()) {
            return Err(ExtractError::malformed(
                location,
                format!("bind expects 4 or 5 arguments, found {}", args.len()),
            ));
        }

        let mut var = self.bound_variable(BindKind::Parameter, args, location)?;
        match args.get(4) {
            // container binds take an optional flag where scalars take a default
            Some(flag) if is_container(&var.type_name) && is_bool_literal(flag) => {
                var.is_optional = parse_bool(flag, location)?;
            }
            Some(default) => {
                let default = self.resolve_value(default, location)?;
                if !default.is_empty() {
                    var.default = Some(default);
                }
            }
            None => {}
        }
        for modifier in modifiers {
            self.apply_modifier(&mut var, modifier, location)?;
        }

        trace!("Bound {} ({}) as {}", var.symbol, var.member, var.type_name);
        Ok(var)
    }

    fn bind_table(&self, args: &[String], location: &SourceLocation) -> Result<Variable> {
        if !(4..=6).contains(&args.len()) {
            return Err(ExtractError::malformed(
                location,
                format!("table bind expects 4 to 6 arguments, found {}", args.len()),
            ));
        }
        // trailing arguments are the requires-columns / optional flags
        for flag in &args[4..] {
            parse_bool(flag, location)?;
        }

        let var = self.bound_variable(BindKind::Table, args, location)?;
        trace!("Bound table {} ({})", var.symbol, var.member);
        Ok(var)
    }

    /// Label, member, description and example value shared by both bind forms
    fn bound_variable(
        &self,
        kind: BindKind,
        args: &[String],
        location: &SourceLocation,
    ) -> Result<Variable> {
        let symbol = args[0].trim();
        if !self.translations.is_symbol(symbol) {
            return Err(ExtractError::malformed(
                location,
                format!("bind label `{symbol}` is not a symbolic constant"),
            ));
        }
        let name = self.translate(symbol, location)?;
        let member = member_name(&args[1]);
        let type_name = self.member_type(member, location)?;

        let mut var = Variable::new(kind, symbol, member, name, type_name);
        var.description = markup::escape(&unquote(&args[2]));
        var.value = markup::escape(&unquote(&args[3]));
        Ok(var)
    }

    fn register(
        &self,
        args: &[String],
        own: &mut Vec<Variable>,
        location: &SourceLocation,
    ) -> Result<()> {
        if !(1..=3).contains(&args.len()) {
            return Err(ExtractError::malformed(
                location,
                format!("registration expects 1 to 3 arguments, found {}", args.len()),
            ));
        }
        if let [member] = args {
            debug!("{}: skipping unlabelled registration of {}", location, member_name(member));
            return Ok(());
        }

        let symbol = args[0].trim();
        if !self.translations.is_symbol(symbol) {
            debug!("{}: skipping registration under computed label {}", location, symbol);
            return Ok(());
        }
        let member = member_name(&args[1]);
        let usage = args.get(2).map(|u| usage_name(u));

        if !own.iter().any(|v| v.symbol == symbol) {
            if let Some(inherited) = self.inherited.get(symbol) {
                own.push(inherited.clone());
            }
        }
        let target = own.iter_mut().find(|v| v.symbol == symbol);

        match (usage, target) {
            (None, Some(var)) => {
                trace!("{} is estimable", symbol);
                var.is_estimable = true;
            }
            (None, None) => {
                warn!("{}: {} registered as estimable but never bound", location, symbol);
            }
            (Some(usage), Some(var)) => {
                trace!("{} is addressable ({})", symbol, usage);
                var.is_addressable = true;
            }
            (Some(usage), None) => {
                debug!("{}: placeholder for addressable {} ({})", location, symbol, usage);
                let name = self.translate(symbol, location)?;
                let type_name = self.members.get(member).unwrap_or("Double");
                let mut var = Variable::new(BindKind::Placeholder, symbol, member, name, type_name);
                var.is_addressable = true;
                own.push(var);
            }
        }
        Ok(())
    }

    fn apply_modifier(
        &self,
        var: &mut Variable,
        modifier: &Modifier,
        location: &SourceLocation,
    ) -> Result<()> {
        let args = &modifier.args;
        let arity = |min: usize, max: usize| -> Result<()> {
            if (min..=max).contains(&args.len()) {
                Ok(())
            } else {
                Err(ExtractError::malformed(
                    location,
                    format!(
                        "{} expects {}..={} arguments, found {}",
                        modifier.name,
                        min,
                        max,
                        args.len()
                    ),
                ))
            }
        };
        let inclusive = |at: usize| -> Result<bool> {
            args.get(at).map_or(Ok(true), |flag| parse_bool(flag, location))
        };

        match modifier.name.as_str() {
            "set_lower_bound" => {
                arity(1, 2)?;
                var.lower_bound = Some(Bound::new(self.resolve_value(&args[0], location)?, inclusive(1)?));
            }
            "set_upper_bound" => {
                arity(1, 2)?;
                var.upper_bound = Some(Bound::new(self.resolve_value(&args[0], location)?, inclusive(1)?));
            }
            "set_range" => {
                arity(2, 4)?;
                var.lower_bound = Some(Bound::new(self.resolve_value(&args[0], location)?, inclusive(2)?));
                var.upper_bound = Some(Bound::new(self.resolve_value(&args[1], location)?, inclusive(3)?));
            }
            "set_allowed_values" => {
                let entries = match args.as_slice() {
                    [list] if list.starts_with('{') => {
                        let inner = list.trim_start_matches('{').trim_end_matches('}');
                        split_arguments(inner)
                    }
                    _ => args.clone(),
                };
                let values = entries
                    .iter()
                    .map(|entry| self.resolve_value(entry, location))
                    .collect::<Result<Vec<_>>>()?;
                var.allowed_values = Some(values);
            }
            other => warn!("{}: ignoring unknown modifier {}", location, other),
        }
        Ok(())
    }

    /// Translate a symbolic argument, or unquote and escape a literal one
    ///
    /// A numeric cast such as `Double(0.5)` resolves to its argument.
    fn resolve_value(&self, arg: &str, location: &SourceLocation) -> Result<String> {
        let arg = strip_numeric_cast(arg.trim());
        if self.translations.is_symbol(arg) {
            Ok(self.translate(arg, location)?.to_string())
        } else {
            Ok(markup::escape(&unquote(arg)))
        }
    }

    fn translate(&self, symbol: &str, location: &SourceLocation) -> Result<&'a str> {
        self.translations
            .get(symbol)
            .ok_or_else(|| ExtractError::UnknownTranslation {
                key: symbol.to_string(),
                location: location.clone(),
            })
    }

    fn member_type(&self, member: &str, location: &SourceLocation) -> Result<&'a str> {
        self.members
            .get(member)
            .ok_or_else(|| ExtractError::UnknownMember {
                member: member.to_string(),
                class: self.class_name.to_string(),
                location: location.clone(),
            })
    }
}

/// Body state for a line that may hold the constructor's opening brace
fn enter_body(line: &str) -> Option<State> {
    if !line.contains('{') {
        return None;
    }
    let depth = brace_delta(line);
    Some(if depth > 0 { State::Body { depth } } else { State::Done })
}

fn upsert(own: &mut Vec<Variable>, var: Variable) {
    match own.iter_mut().find(|v| v.symbol == var.symbol) {
        Some(existing) => *existing = var,
        None => own.push(var),
    }
}

/// `&b_` -> `b_`
fn member_name(arg: &str) -> &str {
    arg.trim().trim_start_matches('&').trim()
}

/// `addressable::kLookup` -> `lookup`
fn usage_name(arg: &str) -> String {
    let last = arg.rsplit("::").next().unwrap_or(arg).trim();
    last.strip_prefix('k')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        .unwrap_or(last)
        .to_ascii_lowercase()
}

/// `Double(0.0)` -> `0.0`; anything else is returned unchanged
fn strip_numeric_cast(arg: &str) -> &str {
    const CASTS: [&str; 3] = ["Double", "double", "unsigned"];
    for cast in CASTS {
        let inner = arg
            .strip_prefix(cast)
            .and_then(|rest| rest.trim_start().strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(inner) = inner.filter(|inner| parens_balanced(inner)) {
            if split_arguments(inner).len() == 1 {
                return inner.trim();
            }
        }
    }
    arg
}

/// Rejects `a) * (b`, the inside of `Double(a) * (b)`
fn parens_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

fn is_bool_literal(arg: &str) -> bool {
    matches!(arg.trim(), "true" | "false")
}

fn parse_bool(arg: &str, location: &SourceLocation) -> Result<bool> {
    match arg.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ExtractError::malformed(
            location,
            format!("expected true or false, found `{other}`"),
        )),
    }
}
