//! Lenient loader: turns `.kd` text into bead declarations.

use std::path::{Path, PathBuf};

use kado_core::bead::BeadDecl;
use kado_core::graph::SourceFile;

use crate::error::{LangError, Result};
use crate::grammar::{LineKind, Strictness, scan};

/// Parses the declarations in `text`, in order.
///
/// Unknown names, duplicate names and malformed lines are all accepted here;
/// validation happens when the graph is assembled.
pub fn parse_source(text: &str) -> Vec<BeadDecl> {
    let scanned = scan(text, Strictness::Lenient);
    let mut beads = Vec::new();
    let mut current: Option<BeadDecl> = None;

    for line in &scanned.lines {
        match line.kind {
            LineKind::Open { name } => {
                if let Some(done) = current.take() {
                    beads.push(done);
                }
                current = Some(BeadDecl::new(name, line.number));
            }
            LineKind::Close => {
                if let Some(done) = current.take() {
                    beads.push(done);
                }
            }
            LineKind::Assignment { key, value } => {
                if let Some(decl) = current.as_mut() {
                    decl.assign(key, value);
                }
            }
            LineKind::Blank | LineKind::Comment | LineKind::Body | LineKind::Stray => {}
        }
    }

    if let Some(done) = current {
        beads.push(done);
    }
    beads
}

/// Reads and parses one file.
pub fn load_file(path: &Path) -> Result<SourceFile> {
    let text = std::fs::read_to_string(path).map_err(|source| LangError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let beads = parse_source(&text);
    tracing::debug!(file = %path.display(), beads = beads.len(), "loaded bead file");
    Ok(SourceFile {
        path: path.to_path_buf(),
        beads,
    })
}

/// Loads every file in `paths`, preserving order.
pub fn load_files(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths.iter().map(|p| load_file(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_blocks_and_fields() {
        let src = r#"
# comment
bead "ansible" {
  enabled = true
  playbook = "site.yml"
  relay = "opa"
}

bead "opa" {
  path = "policy.rego"
}
"#;
        let beads = parse_source(src);
        assert_eq!(beads.len(), 2);
        assert_eq!(beads[0].name, "ansible");
        assert_eq!(beads[0].enabled, Some(true));
        assert_eq!(beads[0].fields["playbook"], "site.yml");
        assert_eq!(beads[0].fields["relay"], "opa");
        assert_eq!(beads[0].line, 3);
        assert_eq!(beads[1].name, "opa");
        assert_eq!(beads[1].enabled, None);
    }

    #[test]
    fn reopen_without_close_starts_new_bead() {
        let beads = parse_source("bead \"a\" {\n  x = 1\nbead \"b\" {\n  y = 2\n}\n");
        assert_eq!(beads.len(), 2);
        assert_eq!(beads[0].fields["x"], "1");
        assert!(!beads[0].fields.contains_key("y"));
        assert_eq!(beads[1].fields["y"], "2");
    }

    #[test]
    fn unclosed_block_at_eof_is_kept() {
        let beads = parse_source("bead \"terraform\" {\n  refs = \"main\"\n");
        assert_eq!(beads.len(), 1);
        assert_eq!(beads[0].fields["refs"], "main");
    }

    #[test]
    fn content_outside_blocks_is_ignored() {
        let beads = parse_source("stray = 1\nbead \"opa\" {\n}\nafter = 2\n");
        assert_eq!(beads.len(), 1);
        assert!(beads[0].fields.is_empty());
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let beads = parse_source("bead \"opa\" {\n  path = a\n  path = b\n}\n");
        assert_eq!(beads[0].fields["path"], "b");
    }

    #[test]
    fn load_file_reports_missing_path() {
        let err = load_file(Path::new("/nonexistent/kado/x.kd")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_files_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.kd");
        let b = dir.path().join("b.kd");
        std::fs::write(&a, "bead \"opa\" {\n}\n").unwrap();
        std::fs::write(&b, "bead \"ansible\" {\n}\n").unwrap();

        let sources = load_files(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(sources[0].path, b);
        assert_eq!(sources[0].beads[0].name, "ansible");
        assert_eq!(sources[1].path, a);
    }
}
