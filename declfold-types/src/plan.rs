use crate::decl::DependencyScope;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Immutable output of folding all declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlan {
    pub schema: String,

    /// sha256 over the canonical JSON of the plan with this field empty.
    #[serde(default)]
    pub fingerprint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<Utf8PathBuf>,

    /// Plugin ids in activation order.
    #[serde(default)]
    pub plugins: Vec<String>,

    #[serde(default)]
    pub repositories: Vec<String>,

    /// Fully expanded directory bindings, keyed by binding name.
    #[serde(default)]
    pub directories: BTreeMap<String, Utf8PathBuf>,

    /// Direct dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<ResolvedDependency>,

    /// Platform (BOM) coordinates that constrained versions.
    #[serde(default)]
    pub constraints: Vec<PlatformConstraint>,

    #[serde(default)]
    pub variants: Vec<ResolvedVariant>,

    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Resolved paths the clean step deletes.
    #[serde(default)]
    pub clean: Vec<Utf8PathBuf>,

    pub summary: PlanSummary,
}

impl ResolvedPlan {
    pub fn new(base_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            schema: crate::schema::DECLFOLD_PLAN_V1.to_string(),
            fingerprint: String::new(),
            base_dir,
            plugins: vec![],
            repositories: vec![],
            directories: BTreeMap::new(),
            dependencies: vec![],
            constraints: vec![],
            variants: vec![],
            options: BTreeMap::new(),
            clean: vec![],
            summary: PlanSummary::default(),
        }
    }

    pub fn directory(&self, name: &str) -> Option<&Utf8PathBuf> {
        self.directories.get(name)
    }

    pub fn variant(&self, name: &str) -> Option<&ResolvedVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    Declared,
    Platform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub scope: DependencyScope,
    pub version_source: VersionSource,

    /// `group:artifact` of the platform that supplied the version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constrained_by: Option<String>,
}

impl fmt::Display for ResolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConstraint {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub scope: DependencyScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVariant {
    pub name: String,
    pub signing: String,

    /// True when no signing reference was declared and the default applied.
    #[serde(default)]
    pub signing_defaulted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub plugins: u64,
    pub directories: u64,
    pub dependencies: u64,
    pub constrained: u64,
    pub variants: u64,
}
