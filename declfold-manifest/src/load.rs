use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use declfold_types::decl::{
    Declaration, DependencyCoordinate, DependencyScope, OptionValue, PathExpr, PluginDeclaration,
};
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// The manifest file name searched for in a project root.
pub const MANIFEST_FILE_NAME: &str = "declfold.toml";

/// A parsed manifest: resolver settings plus declarations in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub base_dir: Option<Utf8PathBuf>,
    pub properties: BTreeMap<String, String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("toml parse error: {message}")]
    Toml { message: String },

    /// `index` is the zero-based position in the `[[declare]]` array.
    #[error("declare[{index}] ({kind}): {message}")]
    Invalid {
        index: usize,
        kind: &'static str,
        message: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawManifest {
    base_dir: Option<Utf8PathBuf>,
    properties: BTreeMap<String, toml::Value>,
    declare: Vec<RawDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawDeclaration {
    Plugin {
        id: String,
        #[serde(default)]
        after: Vec<String>,
    },
    Directory {
        name: String,
        path: Option<Utf8PathBuf>,
        from: Option<String>,
        suffix: Option<String>,
    },
    Dependency {
        coordinate: String,
        #[serde(default)]
        scope: DependencyScope,
    },
    Platform {
        coordinate: String,
        #[serde(default)]
        scope: DependencyScope,
    },
    Variant {
        name: String,
        signing: Option<String>,
    },
    #[serde(rename = "option")]
    SetOption {
        key: String,
        value: Option<toml::Value>,
        property: Option<String>,
    },
    Repository {
        name: String,
    },
    Clean {
        binding: String,
    },
}

impl RawDeclaration {
    fn kind(&self) -> &'static str {
        match self {
            RawDeclaration::Plugin { .. } => "plugin",
            RawDeclaration::Directory { .. } => "directory",
            RawDeclaration::Dependency { .. } => "dependency",
            RawDeclaration::Platform { .. } => "platform",
            RawDeclaration::Variant { .. } => "variant",
            RawDeclaration::SetOption { .. } => "option",
            RawDeclaration::Repository { .. } => "repository",
            RawDeclaration::Clean { .. } => "clean",
        }
    }

    fn into_declaration(self) -> Result<Declaration, String> {
        let decl = match self {
            RawDeclaration::Plugin { id, after } => {
                Declaration::Plugin(PluginDeclaration::new(id).after(after))
            }
            RawDeclaration::Directory {
                name,
                path,
                from,
                suffix,
            } => {
                let expr = match (path, from) {
                    (Some(path), None) => {
                        if suffix.is_some() {
                            return Err("`suffix` only applies to `from` bindings".to_string());
                        }
                        PathExpr::Literal { path }
                    }
                    (None, Some(from)) => PathExpr::Derived { from, suffix },
                    (Some(_), Some(_)) => {
                        return Err("set either `path` or `from`, not both".to_string());
                    }
                    (None, None) => return Err("missing `path` or `from`".to_string()),
                };
                Declaration::Directory { name, expr }
            }
            RawDeclaration::Dependency { coordinate, scope } => {
                Declaration::Dependency(parse_coordinate(&coordinate)?.with_scope(scope))
            }
            RawDeclaration::Platform { coordinate, scope } => {
                let parsed = parse_coordinate(&coordinate)?;
                let Some(version) = parsed.version else {
                    return Err(format!("platform `{coordinate}` needs a version"));
                };
                Declaration::Dependency(
                    DependencyCoordinate::platform(parsed.group, parsed.artifact, version)
                        .with_scope(scope),
                )
            }
            RawDeclaration::Variant { name, signing } => Declaration::Variant { name, signing },
            RawDeclaration::SetOption {
                key,
                value,
                property,
            } => {
                let value = match (value, property) {
                    (Some(v), None) => OptionValue::literal(scalar_to_string(&v)?),
                    (None, Some(name)) => OptionValue::property(name),
                    (Some(_), Some(_)) => {
                        return Err("set either `value` or `property`, not both".to_string());
                    }
                    (None, None) => return Err("missing `value` or `property`".to_string()),
                };
                Declaration::SetOption { key, value }
            }
            RawDeclaration::Repository { name } => Declaration::Repository { name },
            RawDeclaration::Clean { binding } => Declaration::Clean { binding },
        };
        Ok(decl)
    }
}

fn scalar_to_string(v: &toml::Value) -> Result<String, String> {
    match v {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(format!("expected a scalar, found {}", other.type_str())),
    }
}

/// Parse `group:artifact[:version]`.
pub fn parse_coordinate(s: &str) -> Result<DependencyCoordinate, String> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(format!("invalid coordinate `{s}`: empty segment"));
    }
    match parts.as_slice() {
        [group, artifact] => Ok(DependencyCoordinate::new(*group, *artifact, None)),
        [group, artifact, version] => {
            Ok(DependencyCoordinate::new(*group, *artifact, Some(*version)))
        }
        _ => Err(format!(
            "invalid coordinate `{s}`: expected group:artifact[:version]"
        )),
    }
}

/// Parse manifest contents.
pub fn parse_manifest(contents: &str) -> Result<Manifest, ManifestError> {
    let raw: RawManifest = toml::from_str(contents).map_err(|e| ManifestError::Toml {
        message: e.to_string(),
    })?;

    let mut properties = BTreeMap::new();
    for (key, value) in raw.properties {
        let value = scalar_to_string(&value).map_err(|message| ManifestError::Toml {
            message: format!("properties.{key}: {message}"),
        })?;
        properties.insert(key, value);
    }

    let mut declarations = Vec::with_capacity(raw.declare.len());
    for (index, entry) in raw.declare.into_iter().enumerate() {
        let kind = entry.kind();
        let decl = entry
            .into_declaration()
            .map_err(|message| ManifestError::Invalid {
                index,
                kind,
                message,
            })?;
        declarations.push(decl);
    }

    debug!(
        declarations = declarations.len(),
        properties = properties.len(),
        "parsed manifest"
    );

    Ok(Manifest {
        base_dir: raw.base_dir,
        properties,
        declarations,
    })
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Utf8Path) -> anyhow::Result<Manifest> {
    let contents = fs::read_to_string(path).with_context(|| format!("read manifest {}", path))?;
    parse_manifest(&contents).with_context(|| format!("parse manifest {}", path))
}

/// Look for [`MANIFEST_FILE_NAME`] in `root`.
pub fn discover_manifest(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let path = root.join(MANIFEST_FILE_NAME);
    if path.exists() {
        debug!("found manifest at {}", path);
        Some(path)
    } else {
        debug!("no manifest at {}", path);
        None
    }
}
