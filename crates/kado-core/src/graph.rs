//! Graph assembly: merge bead declarations from several `.kd` files into one
//! name-keyed graph.
//!
//! The first file to declare a name owns it. Later declarations of the same
//! name are discarded whole (their fields are never merged) and reported.
//! Surviving declarations are then validated: unknown names and disabled
//! beads become skip reasons, everything else becomes an enabled [`Bead`].

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::bead::{Bead, BeadDecl};
use crate::kind::BeadKind;

/// The beads declared by one source file, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    pub beads: Vec<BeadDecl>,
}

/// Why a declared bead will not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidName,
    Disabled,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidName => "invalid name",
            Self::Disabled => "disabled",
        }
    }
}

/// A declared bead excluded from execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.reason.as_str())
    }
}

/// A declaration dropped because an earlier file already declared the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discarded {
    pub name: String,
    pub file: PathBuf,
    pub primary: PathBuf,
}

// ---------------------------------------------------------------------------
// BeadGraph
// ---------------------------------------------------------------------------

/// Enabled, validated beads keyed by type, iterated in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeadGraph {
    order: Vec<BeadKind>,
    beads: HashMap<BeadKind, Bead>,
}

impl BeadGraph {
    /// Builds a graph from beads in execution order; a repeated kind keeps
    /// its first occurrence.
    pub fn from_beads(beads: impl IntoIterator<Item = Bead>) -> Self {
        let mut graph = Self::default();
        for bead in beads {
            if !graph.beads.contains_key(&bead.kind) {
                graph.order.push(bead.kind);
                graph.beads.insert(bead.kind, bead);
            }
        }
        graph
    }

    pub fn get(&self, kind: BeadKind) -> Option<&Bead> {
        self.beads.get(&kind)
    }

    /// Looks a bead up by its textual name, as written in a `relay` field.
    pub fn by_name(&self, name: &str) -> Option<&Bead> {
        name.parse().ok().and_then(|kind| self.get(kind))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Beads in top-level execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Bead> {
        self.order.iter().filter_map(|kind| self.beads.get(kind))
    }

    /// Relay chains in display order: each bead not yet shown starts a chain
    /// that follows `relay` edges until a missing or already shown bead.
    pub fn chains(&self) -> Vec<Vec<&Bead>> {
        let mut shown: HashSet<BeadKind> = HashSet::new();
        let mut chains = Vec::new();
        for start in self.iter() {
            if shown.contains(&start.kind) {
                continue;
            }
            let mut chain = Vec::new();
            let mut next = Some(start);
            while let Some(bead) = next {
                if !shown.insert(bead.kind) {
                    break;
                }
                chain.push(bead);
                next = bead.relay().and_then(|name| self.by_name(name));
            }
            chains.push(chain);
        }
        chains
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Result of [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub graph: BeadGraph,
    pub skipped: Vec<Skipped>,
    pub discarded: Vec<Discarded>,
}

/// Merges the beads of `sources` (in load order) and validates them.
pub fn assemble(sources: &[SourceFile]) -> Assembly {
    let mut primary: HashMap<&str, &PathBuf> = HashMap::new();
    let mut merged: Vec<&BeadDecl> = Vec::new();
    let mut discarded = Vec::new();

    for source in sources {
        for decl in &source.beads {
            if let Some(owner) = primary.get(decl.name.as_str()) {
                tracing::warn!(
                    bead = %decl.name,
                    file = %source.path.display(),
                    primary = %owner.display(),
                    "duplicate bead discarded"
                );
                discarded.push(Discarded {
                    name: decl.name.clone(),
                    file: source.path.clone(),
                    primary: (*owner).clone(),
                });
                continue;
            }
            primary.insert(decl.name.as_str(), &source.path);
            merged.push(decl);
        }
    }

    let mut valid = Vec::new();
    let mut skipped = Vec::new();
    for decl in merged {
        let Ok(kind) = decl.name.parse::<BeadKind>() else {
            skipped.push(Skipped {
                name: decl.name.clone(),
                reason: SkipReason::InvalidName,
            });
            continue;
        };
        if decl.enabled == Some(false) {
            skipped.push(Skipped {
                name: decl.name.clone(),
                reason: SkipReason::Disabled,
            });
            continue;
        }
        valid.push(Bead::new(kind, decl.fields.clone()));
    }

    Assembly {
        graph: BeadGraph::from_beads(valid),
        skipped,
        discarded,
    }
}
