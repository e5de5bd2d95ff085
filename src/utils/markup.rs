/// Characters the manual's markup treats specially inside running text
const SPECIAL: [char; 5] = ['_', '%', '&', '#', '$'];

/// Escape text for the LaTeX manual
///
/// Idempotent: a special character already preceded by a backslash is left
/// alone, so translated strings can pass through twice. Paired `$...$` spans
/// are inline math and pass through untouched; a lone `$` is escaped.
pub fn escape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut delimiters: Vec<usize> = (0..chars.len())
        .filter(|&i| chars[i] == '$' && (i == 0 || chars[i - 1] != '\\'))
        .collect();
    if delimiters.len() % 2 == 1 {
        delimiters.pop();
    }

    let mut out = String::with_capacity(text.len());
    let mut in_math = false;
    let mut prev = None;
    for (i, &c) in chars.iter().enumerate() {
        if delimiters.binary_search(&i).is_ok() {
            in_math = !in_math;
        } else if !in_math && SPECIAL.contains(&c) && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("age", "age" ; "plain")]
    #[test_case("length_bins", r"length\_bins" ; "underscore")]
    #[test_case(r"length\_bins", r"length\_bins" ; "already escaped")]
    #[test_case("50% & more", r"50\% \& more" ; "percent and ampersand")]
    #[test_case("The maximum exploitation rate ($U_{max}$)", "The maximum exploitation rate ($U_{max}$)" ; "inline math")]
    #[test_case("costs $5", r"costs \$5" ; "lone dollar")]
    fn escapes_markup(input: &str, expected: &str) {
        assert_eq!(escape(input), expected);
    }

    #[test]
    fn escaping_twice_changes_nothing() {
        let once = escape("rate_of ($U_{max}$) at 5% and $3");
        assert_eq!(escape(&once), once);
    }
}
