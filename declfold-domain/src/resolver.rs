use crate::error::{ReferenceKind, ResolveError, ResolveResult};
use crate::paths;
use camino::{Utf8Path, Utf8PathBuf};
use declfold_types::decl::{
    DEFAULT_SIGNING, Declaration, DependencyCoordinate, OptionValue, PathExpr, PluginDeclaration,
};
use declfold_types::plan::{
    PlanSummary, PlatformConstraint, ResolvedDependency, ResolvedPlan, ResolvedVariant,
    VersionSource,
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Directory literal path expressions are resolved against.
    pub base_dir: Option<Utf8PathBuf>,
    /// Values for `OptionValue::Property` references.
    pub properties: BTreeMap<String, String>,
}

/// One-shot fold of ordered declarations into a [`ResolvedPlan`].
///
/// Each mutating operation validates what it can see at declaration time;
/// checks that depend on the complete declaration set (cycles, platform
/// versions, property lookups) run in [`Resolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
    plugins: Vec<String>,
    directories: BTreeMap<String, PathExpr>,
    dependencies: Vec<DependencyCoordinate>,
    platforms: Vec<DependencyCoordinate>,
    variants: Vec<(String, Option<String>)>,
    options: BTreeMap<String, OptionValue>,
    repositories: Vec<String>,
    clean: Vec<String>,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Fold `declarations` and resolve them in one step.
    pub fn resolve_all<I>(config: ResolverConfig, declarations: I) -> ResolveResult<ResolvedPlan>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut resolver = Self::new(config);
        resolver.fold(declarations)?;
        resolver.resolve()
    }

    /// Apply declarations in order, stopping at the first invalid one.
    pub fn fold<I>(&mut self, declarations: I) -> ResolveResult<()>
    where
        I: IntoIterator<Item = Declaration>,
    {
        for decl in declarations {
            self.apply(decl)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, decl: Declaration) -> ResolveResult<()> {
        debug!(kind = decl.label(), "apply declaration");
        match decl {
            Declaration::Plugin(PluginDeclaration { id, after }) => {
                self.apply_plugin_after(id, &after)
            }
            Declaration::Directory { name, expr } => self.bind_directory(name, expr),
            Declaration::Dependency(coordinate) => {
                self.declare_dependency(coordinate);
                Ok(())
            }
            Declaration::Variant { name, signing } => {
                self.declare_variant(name, signing);
                Ok(())
            }
            Declaration::SetOption { key, value } => {
                self.set_option(key, value);
                Ok(())
            }
            Declaration::Repository { name } => {
                self.add_repository(name);
                Ok(())
            }
            Declaration::Clean { binding } => {
                self.register_clean(binding);
                Ok(())
            }
        }
    }

    pub fn apply_plugin(&mut self, id: impl Into<String>) -> ResolveResult<()> {
        self.apply_plugin_after(id, &[] as &[String])
    }

    /// Apply `id`, requiring every plugin in `after` to be active already.
    pub fn apply_plugin_after<S: AsRef<str>>(
        &mut self,
        id: impl Into<String>,
        after: &[S],
    ) -> ResolveResult<()> {
        let id = id.into();
        if self.plugins.contains(&id) {
            return Err(ResolveError::DuplicatePlugin { id });
        }
        if let Some(missing) = after
            .iter()
            .map(|p| AsRef::<str>::as_ref(p))
            .find(|p| !self.plugins.iter().any(|applied| applied.as_str() == *p))
        {
            return Err(ResolveError::unresolved(ReferenceKind::Plugin, missing));
        }
        debug!(plugin = %id, position = self.plugins.len(), "plugin applied");
        self.plugins.push(id);
        Ok(())
    }

    /// Bind (or rebind) a logical directory name.
    ///
    /// A derived expression must reference a binding that already exists, and its suffix (or the
    /// binding name when there is none) must stay below that binding.
    pub fn bind_directory(&mut self, name: impl Into<String>, expr: PathExpr) -> ResolveResult<()> {
        let name = name.into();
        if let PathExpr::Derived { suffix, .. } = &expr {
            let segment = suffix.as_deref().unwrap_or(name.as_str());
            if !paths::is_descendant(Utf8Path::new(segment)) {
                return Err(ResolveError::EscapingPath {
                    segment: segment.to_string(),
                    binding: name.clone(),
                });
            }
        }
        if let Some(parent) = expr.parent()
            && !self.directories.contains_key(parent)
        {
            return Err(ResolveError::unresolved(ReferenceKind::Directory, parent));
        }
        if let Some(previous) = self.directories.insert(name.clone(), expr) {
            debug!(binding = %name, ?previous, "directory binding overridden");
        }
        Ok(())
    }

    /// Record a dependency, or a version constraint when `coordinate.platform` is set.
    ///
    /// Dependencies are keyed by `group:artifact` and scope. A redeclaration keeps the first
    /// position; an explicit version replaces a missing one, and a later explicit version wins.
    pub fn declare_dependency(&mut self, coordinate: DependencyCoordinate) {
        if coordinate.platform {
            if self.platforms.contains(&coordinate) {
                debug!(coordinate = %coordinate, "duplicate platform ignored");
            } else {
                self.platforms.push(coordinate);
            }
            return;
        }

        let key = coordinate.module_key();
        let Some(existing) = self
            .dependencies
            .iter_mut()
            .find(|d| d.scope == coordinate.scope && d.module_key() == key)
        else {
            self.dependencies.push(coordinate);
            return;
        };

        match (existing.version.clone(), coordinate.version) {
            (_, None) => {
                debug!(module = %key, "unversioned redeclaration folded into existing dependency");
            }
            (Some(current), Some(new)) if current == new => {
                debug!(coordinate = %existing, "duplicate coordinate ignored");
            }
            (current, Some(new)) => {
                if let Some(current) = current {
                    warn!(
                        module = %key,
                        previous = %current,
                        version = %new,
                        "conflicting explicit versions; later declaration wins"
                    );
                }
                existing.version = Some(new);
            }
        }
    }

    /// Declare a build variant; `None` signing falls back to [`DEFAULT_SIGNING`].
    pub fn declare_variant(&mut self, name: impl Into<String>, signing: Option<String>) {
        let name = name.into();
        match self.variants.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = signing,
            None => self.variants.push((name, signing)),
        }
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: OptionValue) {
        self.options.insert(key.into(), value);
    }

    pub fn add_repository(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.repositories.contains(&name) {
            self.repositories.push(name);
        }
    }

    /// Mark a directory binding for deletion by the clean step.
    pub fn register_clean(&mut self, binding: impl Into<String>) {
        let binding = binding.into();
        if !self.clean.contains(&binding) {
            self.clean.push(binding);
        }
    }

    /// Produce the immutable resolved snapshot.
    pub fn resolve(&self) -> ResolveResult<ResolvedPlan> {
        let mut plan = ResolvedPlan::new(self.config.base_dir.clone());
        plan.plugins = self.plugins.clone();
        plan.repositories = self.repositories.clone();
        plan.directories = self.expand_directories()?;

        let constraints = self.platform_constraints()?;
        plan.dependencies = self.resolve_dependencies(&constraints)?;
        plan.constraints = constraints.into_values().collect();

        plan.variants = self
            .variants
            .iter()
            .map(|(name, signing)| ResolvedVariant {
                name: name.clone(),
                signing: signing
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SIGNING.to_string()),
                signing_defaulted: signing.is_none(),
            })
            .collect();

        plan.options = self.resolve_options()?;

        plan.clean = self
            .clean
            .iter()
            .map(|binding| {
                plan.directories
                    .get(binding)
                    .cloned()
                    .ok_or_else(|| ResolveError::unresolved(ReferenceKind::Directory, binding))
            })
            .collect::<ResolveResult<_>>()?;

        plan.summary = summarize(&plan);
        plan.fingerprint = plan_fingerprint(&plan);
        debug!(fingerprint = %plan.fingerprint, "plan resolved");
        Ok(plan)
    }

    fn expand_directories(&self) -> ResolveResult<BTreeMap<String, Utf8PathBuf>> {
        let mut resolved = BTreeMap::new();
        let mut visiting = Vec::new();
        for name in self.directories.keys() {
            self.expand_directory(name, &mut resolved, &mut visiting)?;
        }
        Ok(resolved)
    }

    fn expand_directory(
        &self,
        name: &str,
        resolved: &mut BTreeMap<String, Utf8PathBuf>,
        visiting: &mut Vec<String>,
    ) -> ResolveResult<Utf8PathBuf> {
        if let Some(path) = resolved.get(name) {
            return Ok(path.clone());
        }
        if let Some(start) = visiting.iter().position(|n| n == name) {
            let mut chain = visiting[start..].to_vec();
            chain.push(name.to_string());
            return Err(ResolveError::CyclicReference { chain });
        }

        let expr = self
            .directories
            .get(name)
            .ok_or_else(|| ResolveError::unresolved(ReferenceKind::Directory, name))?;

        visiting.push(name.to_string());
        let path = match expr {
            PathExpr::Literal { path } => paths::anchor(self.config.base_dir.as_deref(), path),
            PathExpr::Derived { from, suffix } => {
                let parent = self.expand_directory(from, resolved, visiting)?;
                paths::normalize(&parent.join(suffix.as_deref().unwrap_or(name)))
            }
        };
        visiting.pop();

        resolved.insert(name.to_string(), path.clone());
        Ok(path)
    }

    /// Platform constraints keyed by group. A later platform for the same group wins.
    fn platform_constraints(&self) -> ResolveResult<BTreeMap<String, PlatformConstraint>> {
        let mut out: BTreeMap<String, PlatformConstraint> = BTreeMap::new();
        for p in &self.platforms {
            let Some(version) = p.version.clone() else {
                return Err(ResolveError::UnresolvedVersion {
                    coordinate: p.to_string(),
                });
            };
            let constraint = PlatformConstraint {
                group: p.group.clone(),
                artifact: p.artifact.clone(),
                version,
                scope: p.scope,
            };
            if let Some(previous) = out.insert(p.group.clone(), constraint)
                && previous.version != p.version.as_deref().unwrap_or_default()
            {
                warn!(
                    group = %p.group,
                    previous = %previous.version,
                    platform = %p,
                    "conflicting platform constraints; later declaration wins"
                );
            }
        }
        Ok(out)
    }

    fn resolve_dependencies(
        &self,
        constraints: &BTreeMap<String, PlatformConstraint>,
    ) -> ResolveResult<Vec<ResolvedDependency>> {
        self.dependencies
            .iter()
            .map(|d| {
                let (version, version_source, constrained_by) =
                    match (&d.version, constraints.get(&d.group)) {
                        (Some(v), _) => (v.clone(), VersionSource::Declared, None),
                        (None, Some(c)) => (
                            c.version.clone(),
                            VersionSource::Platform,
                            Some(format!("{}:{}", c.group, c.artifact)),
                        ),
                        (None, None) => {
                            return Err(ResolveError::UnresolvedVersion {
                                coordinate: d.to_string(),
                            });
                        }
                    };
                Ok(ResolvedDependency {
                    group: d.group.clone(),
                    artifact: d.artifact.clone(),
                    version,
                    scope: d.scope,
                    version_source,
                    constrained_by,
                })
            })
            .collect()
    }

    fn resolve_options(&self) -> ResolveResult<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        for (key, value) in &self.options {
            let resolved = match value {
                OptionValue::Literal { value } => value.clone(),
                OptionValue::Property { name } => self
                    .config
                    .properties
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ResolveError::unresolved(ReferenceKind::Property, name))?,
            };
            out.insert(key.clone(), resolved);
        }
        Ok(out)
    }
}

fn summarize(plan: &ResolvedPlan) -> PlanSummary {
    PlanSummary {
        plugins: plan.plugins.len() as u64,
        directories: plan.directories.len() as u64,
        dependencies: plan.dependencies.len() as u64,
        constrained: plan
            .dependencies
            .iter()
            .filter(|d| d.version_source == VersionSource::Platform)
            .count() as u64,
        variants: plan.variants.len() as u64,
    }
}

fn plan_fingerprint(plan: &ResolvedPlan) -> String {
    // Maps in the plan are BTreeMaps, so serialization order is already canonical.
    let s = serde_json::to_string(plan).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}
