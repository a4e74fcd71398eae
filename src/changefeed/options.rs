use std::collections::BTreeMap;

/// Outcome of best-effort `key=value` parsing: whatever could be parsed, plus one warning per
/// skipped token.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedOptions {
    pub parsed: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

/// `parse_opts()` splits each token on its first '='. A token without '=' is a flag with an empty
/// value. A token with an empty key is skipped with a warning. Later duplicates win.
pub fn parse_opts<T: AsRef<str>>(tokens: &[T]) -> ParsedOptions {
    let mut options = ParsedOptions::default();

    for token in tokens {
        let token = token.as_ref();
        let (key, value) = match token.find('=') {
            Some(i) => (&token[..i], &token[i + 1..]),
            None => (token, ""),
        };

        if key.is_empty() {
            options
                .warnings
                .push(format!("ignoring option '{}': missing key", token));
            continue;
        }

        options.parsed.insert(key.to_string(), value.to_string());
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let options = parse_opts(&["a=1", "b", "c=x=y", "d="]);
        assert!(options.warnings.is_empty());
        assert_eq!(options.parsed["a"], "1");
        assert_eq!(options.parsed["b"], "");
        assert_eq!(options.parsed["c"], "x=y");
        assert_eq!(options.parsed["d"], "");
    }

    #[test]
    fn last_duplicate_wins() {
        let options = parse_opts(&["a=1", "a=2"]);
        assert_eq!(options.parsed.len(), 1);
        assert_eq!(options.parsed["a"], "2");
    }

    #[test]
    fn empty_key_is_skipped_not_fatal() {
        let options = parse_opts(&["=v", "", "ok=1"]);
        assert_eq!(options.parsed.len(), 1);
        assert_eq!(options.parsed["ok"], "1");
        assert_eq!(options.warnings.len(), 2);
        assert!(options.warnings[0].contains("'=v'"));
    }

    #[test]
    fn no_tokens() {
        let none: &[&str] = &[];
        assert_eq!(parse_opts(none), ParsedOptions::default());
    }
}
