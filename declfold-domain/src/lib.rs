//! Domain logic: fold ordered build declarations into a deterministic resolved plan.
//!
//! This crate owns *what* the resolved configuration is. It does not read manifests or write
//! artifacts; those are `declfold-manifest` and `declfold-cli`.

mod error;
mod paths;
mod resolver;

pub use error::{DeclfoldError, DeclfoldResult, ReferenceKind, ResolveError, ResolveResult};
pub use resolver::{Resolver, ResolverConfig};
