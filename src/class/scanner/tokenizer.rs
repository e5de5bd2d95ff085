//! Quote-aware helpers shared by the declaration and definition scanners
//!
//! String and character literals are atomic everywhere in this module: commas,
//! brackets, braces and comment markers inside them carry no meaning.

/// Tracks whether the scan position is inside a string or character literal
#[derive(Debug, Default, Clone, Copy)]
struct Literal {
    quote: Option<char>,
    escaped: bool,
}

impl Literal {
    /// Feed one character; returns true if it belongs to a literal (quotes included)
    fn feed(&mut self, c: char) -> bool {
        match self.quote {
            Some(q) => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == q {
                    self.quote = None;
                }
                true
            }
            None if c == '"' || c == '\'' => {
                self.quote = Some(c);
                true
            }
            None => false,
        }
    }
}

/// Split an argument list on top-level commas
///
/// Commas nested inside `()`, `{}`, `[]` or literals do not split. Pieces are
/// trimmed; an empty input yields no arguments.
pub fn split_arguments(args: &str) -> Vec<String> {
    if args.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut literal = Literal::default();
    let mut depth = 0usize;

    for c in args.chars() {
        if literal.feed(c) {
            current.push(c);
            continue;
        }
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    pieces.push(current.trim().to_string());
    pieces
}

/// A call expression split at its outermost parentheses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<'a> {
    /// Text before the opening parenthesis
    pub head: &'a str,
    /// Text between the parentheses
    pub args: &'a str,
    /// Text after the closing parenthesis
    pub rest: &'a str,
}

/// Locate the first parenthesised argument list in `text`
pub fn parse_call(text: &str) -> Option<Call<'_>> {
    let mut literal = Literal::default();
    let mut open = None;
    let mut depth = 0usize;

    for (i, c) in text.char_indices() {
        if literal.feed(c) {
            continue;
        }
        match c {
            '(' => {
                if open.is_none() {
                    open = Some(i);
                }
                depth += 1;
            }
            ')' if open.is_some() => {
                depth -= 1;
                if depth == 0 {
                    let start = open?;
                    return Some(Call {
                        head: text[..start].trim(),
                        args: &text[start + 1..i],
                        rest: &text[i + 1..],
                    });
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip the literal syntax from an argument
///
/// Adjacent string literals concatenate (`"a" "b"` -> `ab`); anything that is
/// not a string literal is returned trimmed and unchanged.
pub fn unquote(arg: &str) -> String {
    let arg = arg.trim();
    if !arg.starts_with('"') {
        return arg.to_string();
    }

    let mut out = String::new();
    let mut inside = false;
    let mut escaped = false;
    for c in arg.chars() {
        if inside {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                inside = false;
            } else {
                out.push(c);
            }
        } else if c == '"' {
            inside = true;
        }
    }
    out
}

/// Remove `//` and `/* */` comments from one line
///
/// `in_block` carries an unterminated block comment over to the next line.
pub fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut literal = Literal::default();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if *in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                *in_block = false;
            }
            continue;
        }
        if literal.feed(c) {
            out.push(c);
            continue;
        }
        if c == '/' {
            match chars.peek() {
                Some('/') => break,
                Some('*') => {
                    chars.next();
                    *in_block = true;
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Net change in `{}` nesting across one line, ignoring literals
pub fn brace_delta(line: &str) -> i32 {
    let mut literal = Literal::default();
    line.chars()
        .filter(|&c| !literal.feed(c))
        .map(|c| match c {
            '{' => 1,
            '}' => -1,
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("", &[] ; "empty")]
    #[test_case("a, b", &["a", "b"] ; "simple")]
    #[test_case(r#"PARAM_A, &a_, "first, second", """#, &["PARAM_A", "&a_", "\"first, second\"", "\"\""] ; "comma inside quotes")]
    #[test_case("Double(0.0), {PARAM_X, PARAM_Y}", &["Double(0.0)", "{PARAM_X, PARAM_Y}"] ; "nested brackets")]
    #[test_case(r#""say \"hi, there\"", x"#, &[r#""say \"hi, there\"""#, "x"] ; "escaped quote")]
    #[test_case("',', b", &["','", "b"] ; "character literal")]
    fn splits_arguments(input: &str, expected: &[&str]) {
        assert_eq!(split_arguments(input), expected);
    }

    #[test]
    fn description_with_embedded_comma_stays_whole() {
        let args = split_arguments(r#"PARAM_B, &b_, "the b parameter, scaled", "", 1.0"#);
        assert_eq!(args.len(), 5);
        assert_eq!(unquote(&args[2]), "the b parameter, scaled");
    }

    #[test]
    fn parses_call_with_chained_rest() {
        let call = parse_call(r#"parameters_.Bind<Double>(PARAM_A, &a_, "f(x)", "")->set_range(5, 10)"#)
            .expect("call");
        assert_eq!(call.head, "parameters_.Bind<Double>");
        assert_eq!(call.args, r#"PARAM_A, &a_, "f(x)", """#);
        assert_eq!(call.rest, "->set_range(5, 10)");
    }

    #[test]
    fn unterminated_call_is_none() {
        assert_eq!(parse_call("Bind(PARAM_A, &a_"), None);
    }

    #[test_case(r#""plain""#, "plain" ; "single literal")]
    #[test_case(r#""first " "second""#, "first second" ; "adjacent literals")]
    #[test_case("1u", "1u" ; "not a literal")]
    #[test_case(r#""""#, "" ; "empty literal")]
    fn unquotes(input: &str, expected: &str) {
        assert_eq!(unquote(input), expected);
    }

    #[test]
    fn strips_comments_outside_literals() {
        let mut in_block = false;
        assert_eq!(
            strip_comments(r#"Bind(PARAM_A, "http://x") // trailing"#, &mut in_block),
            r#"Bind(PARAM_A, "http://x") "#
        );
        assert_eq!(strip_comments("a /* b */ c", &mut in_block), "a  c");
        assert_eq!(strip_comments("a /* open", &mut in_block), "a ");
        assert!(in_block);
        assert_eq!(strip_comments("still */ done", &mut in_block), " done");
        assert!(!in_block);
    }

    #[test]
    fn counts_braces_outside_literals() {
        assert_eq!(brace_delta("if (x) {"), 1);
        assert_eq!(brace_delta(r#"x = "{{";"#), 0);
        assert_eq!(brace_delta("}"), -1);
    }
}
