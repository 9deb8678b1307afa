//! Quote-aware argument splitting.
//!
//! Shared by macro call arguments and keyword lists, so `"a, b"` stays one
//! argument in both places.

/// Split a comma-separated argument string.
///
/// - A single enclosing `[...]` pair is stripped first.
/// - Single or double quotes protect commas; the quote characters themselves
///   are dropped.
/// - Each argument is trimmed. A trailing empty argument is dropped, empty
///   arguments in the middle are kept.
/// - An unmatched quote only logs a warning; the text collected so far is
///   still returned.
pub fn split_args(input: &str) -> Vec<String> {
    let mut body = input.trim();
    if let Some(inner) = body.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        body = inner;
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match quote {
            None if c == '"' || c == '\'' => quote = Some(c),
            Some(q) if c == q => quote = None,
            None if c == ',' => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        args.push(current.trim().to_string());
    }

    if quote.is_some() {
        tracing::warn!(input = body, "unmatched quote in arguments");
    }

    for arg in &mut args {
        if let Some(inner) = strip_quotes(arg) {
            *arg = inner.to_string();
        }
    }

    args
}

fn strip_quotes(arg: &str) -> Option<&str> {
    if arg.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find_map(|q| arg.strip_prefix(q).and_then(|s| s.strip_suffix(q)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arguments() {
        assert_eq!(split_args("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_input() {
        assert!(split_args("").is_empty());
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn quotes_protect_commas() {
        assert_eq!(split_args(r#"x, "hello, world", 'a,b'"#), vec![
            "x",
            "hello, world",
            "a,b"
        ]);
    }

    #[test]
    fn brackets_are_stripped() {
        assert_eq!(split_args("[red, green]"), vec!["red", "green"]);
        assert_eq!(split_args("[one]"), vec!["one"]);
    }

    #[test]
    fn middle_empty_is_kept_trailing_dropped() {
        assert_eq!(split_args("a,,b"), vec!["a", "", "b"]);
        assert_eq!(split_args("a,"), vec!["a"]);
    }

    #[test]
    fn nested_quote_kept_then_stripped() {
        assert_eq!(split_args(r#""'x'""#), vec!["x"]);
    }

    #[test]
    fn unmatched_quote_still_returns() {
        assert_eq!(split_args("a, \"b, c"), vec!["a", "b, c"]);
    }
}
