//! Manifest ingestion.
//!
//! A manifest is a TOML file holding an ordered `[[declare]]` array. The loader is tolerant of
//! unknown keys so manifests can carry annotations for other tools; it is strict about the shape of
//! each declaration because an ambiguous declaration cannot be folded deterministically.

mod load;

pub use load::{
    MANIFEST_FILE_NAME, Manifest, ManifestError, discover_manifest, load_manifest,
    parse_coordinate, parse_manifest,
};
