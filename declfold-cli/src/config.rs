//! Settings merging for declfold.
//!
//! Resolver settings come from the manifest (`base_dir`, `[properties]`) and from CLI arguments.
//! CLI arguments take precedence.

use camino::Utf8PathBuf;
use declfold_domain::ResolverConfig;
use declfold_manifest::Manifest;
use std::collections::BTreeMap;
use tracing::debug;

/// Builder for merging manifest settings with CLI arguments.
pub struct ConfigMerger {
    base_dir: Option<Utf8PathBuf>,
    properties: BTreeMap<String, String>,
}

impl ConfigMerger {
    /// Create a new merger from a loaded manifest.
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            base_dir: manifest.base_dir.clone(),
            properties: manifest.properties.clone(),
        }
    }

    /// Merge with CLI arguments.
    ///
    /// `--base-dir` replaces the manifest value; `--property` entries override manifest properties
    /// with the same key and add the rest.
    pub fn merge(
        self,
        cli_base_dir: Option<Utf8PathBuf>,
        cli_properties: &BTreeMap<String, String>,
    ) -> ResolverConfig {
        let mut properties = self.properties;
        for (k, v) in cli_properties {
            if let Some(previous) = properties.insert(k.clone(), v.clone()) {
                debug!(property = %k, %previous, value = %v, "cli overrides manifest property");
            }
        }

        ResolverConfig {
            base_dir: cli_base_dir.or(self.base_dir),
            properties,
        }
    }
}

/// Parse CLI properties from key=value strings.
pub fn parse_cli_params(params: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for entry in params {
        let mut parts = entry.splitn(2, '=');
        let key = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("invalid property '{}': missing key", entry))?;
        let value = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("invalid property '{}': missing value", entry))?;
        out.insert(key.to_string(), value.to_string());
    }
    Ok(out)
}
