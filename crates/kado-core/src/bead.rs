//! Bead declarations, validated beads and relay overrides.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::kind::BeadKind;

/// Field map of a bead. Keys are unique; ordering carries no meaning but a
/// sorted map keeps display and comparisons deterministic.
pub type Fields = BTreeMap<String, String>;

/// Reserved and well-known field keys.
pub mod keys {
    /// Tri-state enable flag (parsed out of the field map by the loader).
    pub const ENABLED: &str = "enabled";
    /// Name of the bead to run after this one.
    pub const RELAY: &str = "relay";
    /// Comma-separated `key=value` overrides applied to the relay target.
    pub const RELAY_FIELD: &str = "relay_field";
    /// Git repository to materialize into the bead's working directory.
    pub const SOURCE: &str = "source";
    /// Ref to check out after cloning `source`.
    pub const REFS: &str = "refs";
    pub const PLAYBOOK: &str = "playbook";
    pub const INVENTORY: &str = "inventory";
    pub const EXTRA_VARS_FILE: &str = "extra_vars_file";
    /// Policy input artifact, relative to the landing zone.
    pub const INPUT: &str = "input";
    /// Policy document, relative to the landing zone.
    pub const PATH: &str = "path";
    /// Policy query.
    pub const PACKAGE: &str = "package";
}

/// Returns `true` if `key` is the `enabled` key (case-insensitive).
pub fn is_enabled_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(keys::ENABLED)
}

/// Parses an `enabled` value: `true` (any case) is true, anything else false.
pub fn parse_enabled(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// A bead exactly as declared in a `.kd` file.
///
/// The name is unchecked and `enabled` is still tri-state; the graph
/// assembler turns surviving declarations into [`Bead`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeadDecl {
    pub name: String,
    pub fields: Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// 1-based line of the block opener.
    pub line: usize,
}

impl BeadDecl {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            fields: Fields::new(),
            enabled: None,
            line,
        }
    }

    /// Records one `key = value` assignment, routing `enabled` to the flag.
    pub fn assign(&mut self, key: &str, value: &str) {
        if is_enabled_key(key) {
            self.enabled = Some(parse_enabled(value));
        } else {
            self.fields.insert(key.to_owned(), value.to_owned());
        }
    }
}

// ---------------------------------------------------------------------------
// Validated beads
// ---------------------------------------------------------------------------

/// A validated bead: its type is resolved and `enabled` is concrete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bead {
    pub kind: BeadKind,
    pub fields: Fields,
    pub enabled: bool,
}

impl Bead {
    pub fn new(kind: BeadKind, fields: Fields) -> Self {
        Self {
            kind,
            fields,
            enabled: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Returns a field value if present and not blank.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The relay target name, if any.
    pub fn relay(&self) -> Option<&str> {
        self.field(keys::RELAY)
    }

    /// The relay target, if it names a known bead type.
    pub fn relay_kind(&self) -> Option<BeadKind> {
        self.relay().and_then(|name| name.parse().ok())
    }

    /// Overrides this bead hands to its relay target.
    pub fn relay_overrides(&self) -> RelayOverride {
        self.fields
            .get(keys::RELAY_FIELD)
            .map(|text| RelayOverride::parse(text))
            .unwrap_or_default()
    }

    pub fn source(&self) -> Option<&str> {
        self.field(keys::SOURCE)
    }

    pub fn refs(&self) -> Option<&str> {
        self.field(keys::REFS)
    }

    /// Returns `true` if a boolean-ish field is set to `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.field(key).is_some_and(parse_enabled)
    }
}

// ---------------------------------------------------------------------------
// Relay overrides
// ---------------------------------------------------------------------------

/// Field overrides parsed from a `relay_field` value such as `"x=1, y=2"`.
///
/// Pairs without `=` are ignored. Later pairs win over earlier ones with the
/// same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayOverride {
    pairs: Vec<(String, String)>,
}

impl RelayOverride {
    pub fn parse(text: &str) -> Self {
        let pairs = text
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a copy of `target` with the overrides written over its fields.
    ///
    /// `target` itself is never modified, so the graph's canonical bead stays
    /// intact for unrelated invocations.
    pub fn apply(&self, target: &Bead) -> Bead {
        let mut copy = target.clone();
        for (key, value) in self.iter() {
            if is_enabled_key(key) {
                copy.enabled = parse_enabled(value);
            } else {
                copy.fields.insert(key.to_owned(), value.to_owned());
            }
        }
        copy
    }
}
