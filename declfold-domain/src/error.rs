//! Error types for declfold-domain.
//!
//! This module separates:
//! - Configuration-validity failures (exit code 2): the declarations themselves are wrong and the
//!   caller must correct them and re-resolve.
//! - Runtime errors (exit code 1): I/O errors, parse errors, invalid arguments.

use std::fmt;
use thiserror::Error;

/// What an unresolved reference was pointing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Plugin,
    Directory,
    Property,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceKind::Plugin => "plugin",
            ReferenceKind::Directory => "directory",
            ReferenceKind::Property => "property",
        };
        f.write_str(s)
    }
}

/// Configuration-validity failures reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The same plugin id was applied twice.
    #[error("duplicate plugin: {id}")]
    DuplicatePlugin { id: String },

    /// A declaration names a plugin, directory binding or property that does not exist.
    #[error("unresolved {kind} reference: {name}")]
    UnresolvedReference { kind: ReferenceKind, name: String },

    /// Directory bindings derive from each other in a loop.
    #[error("cyclic directory reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    /// A coordinate has no version and no platform constrains its group.
    #[error("unresolved version: {coordinate} has no version and no platform constraint")]
    UnresolvedVersion { coordinate: String },

    /// A derived binding's name or suffix would leave the parent directory.
    #[error("directory binding {binding} escapes its parent via `{segment}`")]
    EscapingPath { binding: String, segment: String },
}

impl ResolveError {
    pub(crate) fn unresolved(kind: ReferenceKind, name: impl Into<String>) -> Self {
        ResolveError::UnresolvedReference {
            kind,
            name: name.into(),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// The top-level error type for declfold operations.
#[derive(Debug, Error)]
pub enum DeclfoldError {
    /// The declarations are invalid (exit code 2).
    #[error("configuration error: {0}")]
    Resolve(#[from] ResolveError),

    /// A runtime/tool error occurred (exit code 1).
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

impl DeclfoldError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, DeclfoldError::Resolve(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DeclfoldError::Resolve(_) => 2,
            DeclfoldError::Runtime(_) => 1,
        }
    }
}

pub type DeclfoldResult<T> = Result<T, DeclfoldError>;
