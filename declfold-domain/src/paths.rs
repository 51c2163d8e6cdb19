use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Resolve `path` against an optional base directory.
///
/// Absolute paths ignore the base.
pub(crate) fn anchor(base: Option<&Utf8Path>, path: &Utf8Path) -> Utf8PathBuf {
    match base {
        Some(base) if !path.is_absolute() => normalize(&base.join(path)),
        _ => normalize(path),
    }
}

/// True when `segment` only descends: every component is a plain name or `.`.
pub(crate) fn is_descendant(segment: &Utf8Path) -> bool {
    segment
        .components()
        .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir))
}

/// Lexical normalization: drops `.` and folds `name/..`.
///
/// Leading `..` segments of a relative path are kept; `..` directly under the
/// root is dropped. The file system is never consulted.
pub(crate) fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match out.last() {
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return Utf8PathBuf::from(".");
    }

    let mut buf = Utf8PathBuf::new();
    for component in out {
        buf.push(component.as_str());
    }
    buf
}
