//! Line scanner shared by the loader, formatter and linter.
//!
//! The scanner classifies every line of a source and tracks whether a bead
//! block is open. Block structure is recognised identically in both modes:
//!
//! - blank lines and `#` comments are recognised first, inside or outside a
//!   block;
//! - a line whose trimmed text starts with `bead "` opens a block, implicitly
//!   closing one that is still open;
//! - a trimmed `}` inside a block closes it;
//! - any other line inside a block is an assignment when it has a non-empty
//!   key before its first `=`, otherwise a malformed body line;
//! - any other line outside a block is stray content.
//!
//! [`Strictness::Strict`] additionally records structural issues (nested
//! opener, opener without `{`, unclosed block at end of input) that the
//! lenient mode tolerates silently.

/// How the scanner treats structural problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Tolerate: implicit close on re-open, unclosed block at EOF.
    Lenient,
    /// Record structural issues alongside the classified lines.
    Strict,
}

/// Prefix that opens a block, after trimming.
pub const OPENER_PREFIX: &str = "bead \"";

/// Classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    Open { name: &'a str },
    Close,
    Assignment { key: &'a str, value: &'a str },
    /// A line inside a block that is not an assignment.
    Body,
    /// Content outside any block.
    Stray,
}

/// A structural problem found in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    NestedOpen,
    OpenerWithoutBrace,
}

impl Issue {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NestedOpen => "nested bead blocks are not allowed",
            Self::OpenerWithoutBrace => "bead declaration must end with '{'",
        }
    }
}

/// One scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    pub raw: &'a str,
    pub kind: LineKind<'a>,
    /// Whether a block was open when this line was reached.
    pub in_block: bool,
    pub issue: Option<Issue>,
}

impl<'a> Line<'a> {
    pub fn trimmed(&self) -> &'a str {
        self.raw.trim()
    }
}

/// A fully scanned source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan<'a> {
    pub lines: Vec<Line<'a>>,
    /// A block was still open at end of input.
    pub unclosed: bool,
}

impl Scan<'_> {
    /// Number of the final line, or 0 for empty input.
    pub fn last_line(&self) -> usize {
        self.lines.last().map_or(0, |l| l.number)
    }
}

/// Scans `text` line by line.
pub fn scan(text: &str, strictness: Strictness) -> Scan<'_> {
    let strict = strictness == Strictness::Strict;
    let mut in_block = false;
    let mut lines = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        let was_in_block = in_block;
        let mut issue = None;

        let kind = if trimmed.is_empty() {
            LineKind::Blank
        } else if trimmed.starts_with('#') {
            LineKind::Comment
        } else if trimmed.starts_with(OPENER_PREFIX) {
            if strict {
                if in_block {
                    issue = Some(Issue::NestedOpen);
                } else if !trimmed.ends_with('{') {
                    issue = Some(Issue::OpenerWithoutBrace);
                }
            }
            in_block = true;
            LineKind::Open {
                name: opener_name(trimmed),
            }
        } else if in_block && trimmed == "}" {
            in_block = false;
            LineKind::Close
        } else if in_block {
            match split_assignment(trimmed) {
                Some((key, value)) => LineKind::Assignment { key, value },
                None => LineKind::Body,
            }
        } else {
            LineKind::Stray
        };

        lines.push(Line {
            number: index + 1,
            raw,
            kind,
            in_block: was_in_block,
            issue,
        });
    }

    Scan {
        lines,
        unclosed: in_block,
    }
}

/// Extracts the bead name from a trimmed opener line.
///
/// `bead "ansible" {` yields `ansible`.
pub fn opener_name(trimmed: &str) -> &str {
    let rest = trimmed.strip_prefix("bead").unwrap_or(trimmed);
    rest.trim_matches(|c: char| c == '"' || c == '{' || c.is_whitespace())
}

/// Splits a body line on its first `=` into a trimmed key and a trimmed,
/// unquoted value. Returns `None` when there is no `=` or the key is empty.
pub fn split_assignment(trimmed: &str) -> Option<(&str, &str)> {
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim().trim_matches('"')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds<'a>(scan: &Scan<'a>) -> Vec<LineKind<'a>> {
        scan.lines.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn classifies_a_simple_block() {
        let src = "# infra\nbead \"opa\" {\n  path = \"policy.rego\"\n}\n";
        let s = scan(src, Strictness::Lenient);
        assert_eq!(
            kinds(&s),
            vec![
                LineKind::Comment,
                LineKind::Open { name: "opa" },
                LineKind::Assignment {
                    key: "path",
                    value: "policy.rego"
                },
                LineKind::Close,
            ]
        );
        assert!(!s.unclosed);
        assert!(s.lines[2].in_block);
        assert!(!s.lines[0].in_block);
    }

    #[test]
    fn opener_name_variants() {
        assert_eq!(opener_name("bead \"ansible\" {"), "ansible");
        assert_eq!(opener_name("bead \"ansible\"{"), "ansible");
        assert_eq!(opener_name("bead \"ansible\""), "ansible");
    }

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            split_assignment("relay_field = \"a=1, b=2\""),
            Some(("relay_field", "a=1, b=2"))
        );
        assert_eq!(split_assignment("key=value"), Some(("key", "value")));
        assert_eq!(split_assignment("empty ="), Some(("empty", "")));
        assert_eq!(split_assignment("no equals here"), None);
        assert_eq!(split_assignment("= orphan"), None);
    }

    #[test]
    fn reopen_implicitly_closes() {
        let src = "bead \"a\" {\nx = 1\nbead \"b\" {\n}\n";
        let lenient = scan(src, Strictness::Lenient);
        assert!(lenient.lines.iter().all(|l| l.issue.is_none()));
        assert!(!lenient.unclosed);

        let strict = scan(src, Strictness::Strict);
        assert_eq!(strict.lines[2].issue, Some(Issue::NestedOpen));
        assert!(strict.lines[2].in_block);
    }

    #[test]
    fn strict_flags_opener_without_brace() {
        let s = scan("bead \"a\"\n}\n", Strictness::Strict);
        assert_eq!(s.lines[0].issue, Some(Issue::OpenerWithoutBrace));
    }

    #[test]
    fn unclosed_block_is_reported() {
        let s = scan("bead \"a\" {\n  x = 1\n", Strictness::Lenient);
        assert!(s.unclosed);
        assert_eq!(s.last_line(), 2);
    }

    #[test]
    fn brace_outside_block_is_stray() {
        let s = scan("}\nfoo = bar\n", Strictness::Lenient);
        assert_eq!(kinds(&s), vec![LineKind::Stray, LineKind::Stray]);
    }

    #[test]
    fn comments_and_blanks_inside_blocks() {
        let s = scan("bead \"a\" {\n\n  # note\n}\n", Strictness::Lenient);
        assert_eq!(s.lines[1].kind, LineKind::Blank);
        assert_eq!(s.lines[2].kind, LineKind::Comment);
        assert!(s.lines[2].in_block);
    }
}
