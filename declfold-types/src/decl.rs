use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing reference used by variants that do not name one.
pub const DEFAULT_SIGNING: &str = "debug";

/// A single static configuration statement.
///
/// Declarations are folded in order; order is significant for plugins
/// (activation order) and for directory bindings (a derived binding may only
/// reference a binding declared before it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Plugin(PluginDeclaration),
    Directory { name: String, expr: PathExpr },
    Dependency(DependencyCoordinate),
    Variant { name: String, signing: Option<String> },
    SetOption { key: String, value: OptionValue },
    Repository { name: String },
    Clean { binding: String },
}

impl Declaration {
    pub fn plugin(id: impl Into<String>) -> Self {
        Declaration::Plugin(PluginDeclaration::new(id))
    }

    pub fn directory(name: impl Into<String>, expr: PathExpr) -> Self {
        Declaration::Directory {
            name: name.into(),
            expr,
        }
    }

    pub fn dependency(coordinate: DependencyCoordinate) -> Self {
        Declaration::Dependency(coordinate)
    }

    /// Short label used in logs and error context.
    pub fn label(&self) -> &'static str {
        match self {
            Declaration::Plugin(_) => "plugin",
            Declaration::Directory { .. } => "directory",
            Declaration::Dependency(d) if d.platform => "platform",
            Declaration::Dependency(_) => "dependency",
            Declaration::Variant { .. } => "variant",
            Declaration::SetOption { .. } => "option",
            Declaration::Repository { .. } => "repository",
            Declaration::Clean { .. } => "clean",
        }
    }
}

/// A plugin to activate, with the plugins that must already be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDeclaration {
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
}

impl PluginDeclaration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            after: vec![],
        }
    }

    pub fn after<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(prerequisites.into_iter().map(Into::into));
        self
    }
}

/// Configuration a dependency participates in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyScope {
    #[default]
    Implementation,
    Api,
    CompileOnly,
    TestImplementation,
    /// Build-tool classpath (buildscript) dependency.
    Classpath,
}

impl DependencyScope {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyScope::Implementation => "implementation",
            DependencyScope::Api => "api",
            DependencyScope::CompileOnly => "compile_only",
            DependencyScope::TestImplementation => "test_implementation",
            DependencyScope::Classpath => "classpath",
        }
    }
}

/// `group:artifact[:version]` coordinate.
///
/// A platform (BOM) coordinate constrains versions of the other coordinates in
/// its group and never becomes a runtime artifact itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyCoordinate {
    pub group: String,
    pub artifact: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub scope: DependencyScope,

    #[serde(default)]
    pub platform: bool,
}

impl DependencyCoordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.map(str::to_string),
            scope: DependencyScope::default(),
            platform: false,
        }
    }

    pub fn platform(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: Some(version.into()),
            scope: DependencyScope::default(),
            platform: true,
        }
    }

    pub fn with_scope(mut self, scope: DependencyScope) -> Self {
        self.scope = scope;
        self
    }

    /// `group:artifact`, without version.
    pub fn module_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{}", self.group, self.artifact, v),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}

/// Right-hand side of a directory binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathExpr {
    /// Path relative to the resolver's base directory.
    Literal { path: Utf8PathBuf },

    /// `<resolved from>/<suffix or binding name>`.
    Derived {
        from: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
}

impl PathExpr {
    pub fn literal(path: impl Into<Utf8PathBuf>) -> Self {
        PathExpr::Literal { path: path.into() }
    }

    pub fn derive(from: impl Into<String>) -> Self {
        PathExpr::Derived {
            from: from.into(),
            suffix: None,
        }
    }

    pub fn derive_with_suffix(from: impl Into<String>, suffix: impl Into<String>) -> Self {
        PathExpr::Derived {
            from: from.into(),
            suffix: Some(suffix.into()),
        }
    }

    /// Name of the binding this expression delegates to, if any.
    pub fn parent(&self) -> Option<&str> {
        match self {
            PathExpr::Literal { .. } => None,
            PathExpr::Derived { from, .. } => Some(from),
        }
    }
}

/// Value of an SDK/compatibility option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionValue {
    Literal { value: String },
    /// Looked up in the resolver's property table (e.g. `flutter.minSdkVersion`).
    Property { name: String },
}

impl OptionValue {
    pub fn literal(value: impl Into<String>) -> Self {
        OptionValue::Literal {
            value: value.into(),
        }
    }

    pub fn property(name: impl Into<String>) -> Self {
        OptionValue::Property { name: name.into() }
    }
}
