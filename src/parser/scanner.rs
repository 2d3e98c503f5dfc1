//! Raw-text scanning: bracket matching and top-level assignment lookup.
//!
//! Manifests are free-form text, so nothing here tokenizes. Offsets are byte
//! offsets into the original text; every delimiter the scanner cares about is
//! ASCII, so slicing at a returned offset is always on a char boundary.

use crate::parser::errors::ManifestError;

/// A bracket pair the scanner can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `[` ... `]`
    Bracket,
    /// `{` ... `}`
    Brace,
    /// `(` ... `)`
    Paren,
}

impl Delimiter {
    /// Classify an opening character.
    pub fn from_open(c: char) -> Option<Self> {
        match c {
            '[' => Some(Delimiter::Bracket),
            '{' => Some(Delimiter::Brace),
            '(' => Some(Delimiter::Paren),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            Delimiter::Bracket => '[',
            Delimiter::Brace => '{',
            Delimiter::Paren => '(',
        }
    }

    pub fn close(self) -> char {
        match self {
            Delimiter::Bracket => ']',
            Delimiter::Brace => '}',
            Delimiter::Paren => ')',
        }
    }
}

/// Quote tracking shared by the bracket scanner and the comment normalizer.
#[derive(Debug, Default, Clone, Copy)]
struct QuoteState {
    single: bool,
    double: bool,
    escape: bool,
}

impl QuoteState {
    fn in_string(&self) -> bool {
        self.single || self.double
    }

    /// Feed one character. Returns `true` when the character belongs to a
    /// string literal (including its quotes) and must not be interpreted.
    fn step(&mut self, c: char) -> bool {
        if self.escape {
            self.escape = false;
            return true;
        }
        match c {
            '\\' if self.in_string() => {
                self.escape = true;
                true
            }
            '\'' if !self.double => {
                self.single = !self.single;
                true
            }
            '"' if !self.single => {
                self.double = !self.double;
                true
            }
            _ => self.in_string(),
        }
    }
}

/// Find the delimiter closing the one at `open_index`.
///
/// Delimiters inside single- or double-quoted strings are ignored, and a
/// backslash inside a string escapes the following character.
pub fn find_matching(open_index: usize, text: &str) -> Result<usize, ManifestError> {
    let open = text
        .get(open_index..)
        .and_then(|rest| rest.chars().next())
        .ok_or_else(|| ManifestError::InvalidStartCharacter {
            index: open_index,
            found: "end of input".to_string(),
        })?;

    let delim = Delimiter::from_open(open).ok_or_else(|| ManifestError::InvalidStartCharacter {
        index: open_index,
        found: open.to_string(),
    })?;

    let mut quotes = QuoteState::default();
    let mut depth = 1usize;

    for (idx, c) in text[open_index + 1..].char_indices() {
        if quotes.step(c) {
            continue;
        }
        if c == delim.open() {
            depth += 1;
        } else if c == delim.close() {
            depth -= 1;
            if depth == 0 {
                return Ok(open_index + 1 + idx);
            }
        }
    }

    Err(ManifestError::not_found(format!(
        "`{}` matching `{}` at offset {}",
        delim.close(),
        delim.open(),
        open_index
    )))
}

/// Index of the first non-whitespace character at or after `from`.
pub fn skip_whitespace(text: &str, from: usize) -> Option<usize> {
    text.get(from..)?
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(idx, _)| from + idx)
}

/// Carve out the value bound to a top-level `name = ...` assignment.
///
/// The value must open with `shape`; the returned slice spans the opening
/// delimiter through its matching close, inclusive. `#` comments are blanked
/// before scanning, so neither the name nor a stray quote inside a comment
/// affects the result.
pub fn locate_assignment<'a>(
    name: &str,
    text: &'a str,
    shape: Delimiter,
) -> Result<&'a str, ManifestError> {
    let missing = || ManifestError::MissingAssignment {
        name: name.to_string(),
    };
    let scan = blank_comments(text);

    let at = find_identifier(name, &scan).ok_or_else(missing)?;

    let eq = skip_whitespace(&scan, at + name.len())
        .filter(|&idx| scan[idx..].starts_with('='))
        .ok_or_else(missing)?;

    let start = skip_whitespace(&scan, eq + 1);
    let found = start.and_then(|idx| scan[idx..].chars().next());
    let start = match (start, found) {
        (Some(idx), Some(c)) if c == shape.open() => idx,
        _ => {
            return Err(ManifestError::UnexpectedValueShape {
                name: name.to_string(),
                expected: shape.open(),
                found: found.map_or_else(|| "end of input".to_string(), String::from),
            })
        }
    };

    let end = find_matching(start, &scan)?;
    tracing::debug!("located `{}` at {}..={}", name, start, end);

    Ok(&text[start..=end])
}

/// First occurrence of `name` standing alone as an identifier, i.e. not part
/// of a longer identifier and not directly inside quotes.
fn find_identifier(name: &str, text: &str) -> Option<usize> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$' || c == '\'' || c == '"';
    let mut from = 0;

    while let Some(offset) = text[from..].find(name) {
        let at = from + offset;
        let before = text[..at].chars().next_back();
        let after = text[at + name.len()..].chars().next();

        if !before.is_some_and(is_word) && !after.is_some_and(is_word) {
            return Some(at);
        }
        from = at + name.len();
    }

    None
}

/// Rewrite `#` comments as `//` comments.
///
/// A `#` inside a string literal is left alone. The remainder of a comment
/// line is copied verbatim so quotes in prose cannot open a string.
pub fn normalize_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut quotes = QuoteState::default();
    let mut in_comment = false;

    for c in text.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            out.push(c);
            continue;
        }
        if !quotes.step(c) && c == '#' {
            out.push_str("//");
            in_comment = true;
            continue;
        }
        out.push(c);
    }

    out
}

/// Replace every byte of each `#` comment with a space.
///
/// Offsets are preserved, so positions found in the result index the input.
fn blank_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quotes = QuoteState::default();
    let mut in_comment = false;

    for c in text.chars() {
        if in_comment && c != '\n' {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
            continue;
        }
        in_comment = false;
        if !quotes.step(c) && c == '#' {
            out.push(' ');
            in_comment = true;
            continue;
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_nested() {
        let text = "x = [1, [2, [3]], 4] tail";
        let open = text.find('[').unwrap();
        let close = find_matching(open, text).unwrap();
        assert_eq!(&text[open..=close], "[1, [2, [3]], 4]");
    }

    #[test]
    fn test_find_matching_ignores_quoted_delimiters() {
        let text = r#"{ "a}": '{', "b": "say \"}\"" }"#;
        let close = find_matching(0, text).unwrap();
        assert_eq!(close, text.len() - 1);
    }

    #[test]
    fn test_find_matching_other_quote_kind_is_inert() {
        let text = r#"( "it's )" )"#;
        assert_eq!(find_matching(0, text).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_find_matching_escaped_backslash_closes_string() {
        let text = r#"['a\\', ']']"#;
        assert_eq!(find_matching(0, text).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_find_matching_unterminated() {
        let text = "{ 'a': [1, 2 }";
        let err = find_matching(7, text).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));

        let err = find_matching(0, "{ 'a': 1").unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_find_matching_invalid_start() {
        let err = find_matching(0, "abc").unwrap_err();
        assert_eq!(
            err,
            ManifestError::InvalidStartCharacter {
                index: 0,
                found: "a".to_string()
            }
        );

        let err = find_matching(10, "[]").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidStartCharacter { .. }));
    }

    #[test]
    fn test_locate_assignment() {
        let text = "# header\nvars = {\n  'a': 'b',\n}\n\ndeps = {'x': 'y@1'}\n";
        assert_eq!(
            locate_assignment("vars", text, Delimiter::Brace).unwrap(),
            "{\n  'a': 'b',\n}"
        );
        assert_eq!(
            locate_assignment("deps", text, Delimiter::Brace).unwrap(),
            "{'x': 'y@1'}"
        );
    }

    #[test]
    fn test_locate_assignment_skips_longer_identifiers() {
        let text = "vars = { 'checkout_deps': True }\nrecursedeps = ['x']\ndeps = {}";
        assert_eq!(locate_assignment("deps", text, Delimiter::Brace).unwrap(), "{}");
    }

    #[test]
    fn test_locate_assignment_errors() {
        assert!(matches!(
            locate_assignment("solutions", "solutions [", Delimiter::Bracket),
            Err(ManifestError::MissingAssignment { .. })
        ));
        assert!(matches!(
            locate_assignment("solutions", "solutions = {}", Delimiter::Bracket),
            Err(ManifestError::UnexpectedValueShape { expected: '[', .. })
        ));
        assert!(matches!(
            locate_assignment("solutions", "solutions =", Delimiter::Bracket),
            Err(ManifestError::UnexpectedValueShape { .. })
        ));
        assert_eq!(
            locate_assignment("deps", "vars = {}", Delimiter::Brace),
            Err(ManifestError::MissingAssignment {
                name: "deps".to_string()
            })
        );
        assert!(matches!(
            locate_assignment("deps", "deps = { 'a': { }", Delimiter::Brace),
            Err(ManifestError::NotFound { .. })
        ));
    }

    #[test]
    fn test_locate_assignment_ignores_comments() {
        let text = "deps = {\n  # don't roll\n  'third_party/a': 'a@1', # pinned }\n}\n";
        assert_eq!(
            locate_assignment("deps", text, Delimiter::Brace).unwrap(),
            "{\n  # don't roll\n  'third_party/a': 'a@1', # pinned }\n}"
        );

        // The first mention sits in a comment.
        let text = "# deps are rolled nightly\nvars = {}\ndeps = {'x': 'y@1'}";
        assert_eq!(
            locate_assignment("deps", text, Delimiter::Brace).unwrap(),
            "{'x': 'y@1'}"
        );

        // A quoted `#` is not a comment.
        let text = "deps = {'a#': 'b@1'}";
        assert_eq!(locate_assignment("deps", text, Delimiter::Brace).unwrap(), &text[7..]);
    }

    #[test]
    fn test_blank_comments_keeps_offsets() {
        let text = "{ # naïve }\n'#': 1 }";
        let blanked = blank_comments(text);
        assert_eq!(blanked.len(), text.len());
        assert_eq!(blanked, format!("{{{}\n'#': 1 }}", " ".repeat(11)));
    }

    #[test]
    fn test_normalize_comments() {
        let text = "{\n  # don't roll\n  'a#b': 'c', # trailing\n}";
        assert_eq!(
            normalize_comments(text),
            "{\n  // don't roll\n  'a#b': 'c', // trailing\n}"
        );
    }
}
