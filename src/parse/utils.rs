/// Trim whitespace, then strip one outer pair of double quotes if present.
/// Doubled quotes inside the value are left as-is.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Count occurrences of `needle` that sit outside double-quoted spans.
pub fn count_unquoted(line: &str, needle: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == needle && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Split `line` on `delim`, but only where an even number of `"` has been
/// seen since the previous split point.
///
/// A lone stray quote leaves the rest of the line unsplit.
pub fn split_quoted(line: &str, delim: char) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quotes_seen = 0usize;
    for (idx, c) in line.char_indices() {
        if c == '"' {
            quotes_seen += 1;
        } else if c == delim && quotes_seen % 2 == 0 {
            fields.push(&line[start..idx]);
            start = idx + c.len_utf8();
            quotes_seen = 0;
        }
    }
    fields.push(&line[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_one_quote_pair() {
        assert_eq!(clean_str("  \"Drama, Romance\" "), "Drama, Romance");
        assert_eq!(clean_str("\"\"quoted\"\""), "\"quoted\"");
        assert_eq!(clean_str("\"open"), "\"open");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" plain "), "plain");
    }

    #[test]
    fn split_keeps_quoted_delimiters() {
        let fields = split_quoted(r#"tt1,"Drama, Romance",1999"#, ',');
        assert_eq!(fields, vec!["tt1", r#""Drama, Romance""#, "1999"]);
    }

    #[test]
    fn split_keeps_empty_fields() {
        assert_eq!(split_quoted("a;;b;", ';'), vec!["a", "", "b", ""]);
    }

    #[test]
    fn count_ignores_quoted_spans() {
        assert_eq!(count_unquoted(r#"a,"b,c",d"#, ','), 2);
        assert_eq!(count_unquoted(r#"a;"b;c";d"#, ','), 0);
    }
}
