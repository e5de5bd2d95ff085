//! Syntax of the constructor statements that declare configuration parameters

use log::trace;

use super::tokenizer::{parse_call, split_arguments};
use crate::error::{ExtractError, Result, SourceLocation};

pub const BIND_PREFIX: &str = "parameters_.Bind<";
pub const BIND_TABLE_PREFIX: &str = "parameters_.BindTable(";
pub const REGISTER_PREFIXES: [&str; 2] = ["RegisterAsAddressable(", "RegisterAsEstimable("];

/// A chained `->name(args)` call on a bind statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: String,
    pub args: Vec<String>,
}

/// One recognized logical statement, split into raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `parameters_.Bind<T>(label, &member, description, value[, default])->modifiers`
    Bind {
        template: String,
        args: Vec<String>,
        modifiers: Vec<Modifier>,
    },
    /// `parameters_.BindTable(label, member, description, value[, flags])`
    BindTable { args: Vec<String> },
    /// `RegisterAsAddressable(label, &member[, usage])` or `RegisterAsAddressable(&member)`
    Register { args: Vec<String> },
}

/// Whether a (trimmed) line begins a statement this scanner documents
pub fn is_statement_start(line: &str) -> bool {
    line.starts_with(BIND_PREFIX)
        || line.starts_with(BIND_TABLE_PREFIX)
        || REGISTER_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Parse a complete logical statement (terminator included)
///
/// Returns `Ok(None)` for statements that do not start with a recognized prefix.
pub fn parse_statement(text: &str, location: &SourceLocation) -> Result<Option<Statement>> {
    let text = text.trim().trim_end_matches(';').trim_end();
    trace!("{}: statement {}", location, text);

    if text.starts_with(BIND_TABLE_PREFIX) {
        let call = call_of(text, location)?;
        ensure_no_trailer(call.rest, location)?;
        return Ok(Some(Statement::BindTable {
            args: split_arguments(call.args),
        }));
    }

    if let Some(after) = text.strip_prefix(BIND_PREFIX) {
        let close = closing_angle(after)
            .ok_or_else(|| ExtractError::malformed(location, "unterminated template argument"))?;
        let template = after[..close].trim().to_string();
        let call = call_of(&after[close + 1..], location)?;
        if !call.head.is_empty() {
            return Err(ExtractError::malformed(
                location,
                format!("unexpected `{}` before bind arguments", call.head),
            ));
        }
        let modifiers = parse_modifiers(call.rest, location)?;
        return Ok(Some(Statement::Bind {
            template,
            args: split_arguments(call.args),
            modifiers,
        }));
    }

    if REGISTER_PREFIXES.iter().any(|p| text.starts_with(p)) {
        let call = call_of(text, location)?;
        ensure_no_trailer(call.rest, location)?;
        return Ok(Some(Statement::Register {
            args: split_arguments(call.args),
        }));
    }

    Ok(None)
}

fn call_of<'a>(text: &'a str, location: &SourceLocation) -> Result<super::tokenizer::Call<'a>> {
    parse_call(text).ok_or_else(|| ExtractError::malformed(location, "unbalanced parentheses"))
}

fn ensure_no_trailer(rest: &str, location: &SourceLocation) -> Result<()> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ExtractError::malformed(
            location,
            format!("unexpected `{rest}` after call"),
        ))
    }
}

/// Parse `->a(x)->b(y)` chains
fn parse_modifiers(mut rest: &str, location: &SourceLocation) -> Result<Vec<Modifier>> {
    let mut modifiers = Vec::new();
    loop {
        rest = rest.trim();
        if rest.is_empty() {
            return Ok(modifiers);
        }
        let Some(chained) = rest.strip_prefix("->") else {
            return Err(ExtractError::malformed(
                location,
                format!("unexpected `{rest}` after bind"),
            ));
        };
        let call = call_of(chained, location)?;
        modifiers.push(Modifier {
            name: call.head.to_string(),
            args: split_arguments(call.args),
        });
        rest = call.rest;
    }
}

/// Offset of the `>` closing a template argument list whose `<` was already consumed
fn closing_angle(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            '(' | ';' => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn here() -> SourceLocation {
        SourceLocation::new("Multinomial.cpp", 12)
    }

    #[test]
    fn parses_bind_with_range() {
        let stmt = parse_statement(
            r#"parameters_.Bind<Double>(PARAM_B, &b_, "The b parameter", "", 1.0)->set_range(5, 10, false, true);"#,
            &here(),
        )
        .unwrap();
        let Some(Statement::Bind { template, args, modifiers }) = stmt else {
            panic!("expected a bind statement");
        };
        assert_eq!(template, "Double");
        assert_eq!(args, vec!["PARAM_B", "&b_", "\"The b parameter\"", "\"\"", "1.0"]);
        assert_eq!(
            modifiers,
            vec![Modifier {
                name: "set_range".into(),
                args: vec!["5".into(), "10".into(), "false".into(), "true".into()],
            }]
        );
    }

    #[test]
    fn parses_nested_template() {
        let stmt = parse_statement(
            r#"parameters_.Bind<vector<string>>(PARAM_CATEGORIES, &categories_, "Categories", "");"#,
            &here(),
        )
        .unwrap();
        assert!(matches!(stmt, Some(Statement::Bind { template, .. }) if template == "vector<string>"));
    }

    #[test]
    fn parses_allowed_values() {
        let stmt = parse_statement(
            r#"parameters_.Bind<string>(PARAM_UNITS, &units_, "Units", "", PARAM_KGS) ->set_allowed_values({PARAM_KGS, PARAM_TONNES});"#,
            &here(),
        )
        .unwrap();
        let Some(Statement::Bind { modifiers, .. }) = stmt else {
            panic!("expected a bind statement");
        };
        assert_eq!(modifiers[0].name, "set_allowed_values");
        assert_eq!(modifiers[0].args, vec!["{PARAM_KGS, PARAM_TONNES}"]);
    }

    #[test]
    fn parses_table_and_register() {
        let table = parse_statement(
            r#"parameters_.BindTable(PARAM_N, n_table_, "Table of data", "", false, false);"#,
            &here(),
        )
        .unwrap();
        assert!(matches!(table, Some(Statement::BindTable { args }) if args.len() == 6));

        let register =
            parse_statement("RegisterAsAddressable(PARAM_Q, &q_, addressable::kLookup);", &here()).unwrap();
        assert!(matches!(register, Some(Statement::Register { args }) if args[2] == "addressable::kLookup"));
    }

    #[test]
    fn unrelated_statement_is_ignored() {
        assert_eq!(parse_statement("original_value_ = 0;", &here()).unwrap(), None);
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let err = parse_statement(r#"parameters_.Bind<Double>(PARAM_B, &b_, "", "") + 1;"#, &here())
            .unwrap_err();
        assert!(matches!(err, ExtractError::MalformedStatement { .. }));
        assert!(err.to_string().starts_with("Multinomial.cpp:12"));
    }

    #[test]
    fn unbalanced_call_is_malformed() {
        let err = parse_statement(r#"parameters_.BindTable(PARAM_N, n_table_, "x";"#, &here()).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedStatement { .. }));
    }

    #[test]
    fn recognizes_statement_starts() {
        assert!(is_statement_start("parameters_.Bind<Double>(PARAM_B,"));
        assert!(is_statement_start("RegisterAsEstimable(PARAM_B, &b_);"));
        assert!(!is_statement_start("parameters_.Get(PARAM_B)->has_been_defined()"));
    }
}
