//! Rendering helpers (markdown) for human-readable artifacts.

use declfold_types::plan::{ResolvedPlan, VersionSource};

pub fn render_plan_md(plan: &ResolvedPlan) -> String {
    let mut out = String::new();
    out.push_str("# declfold plan\n\n");
    out.push_str(&format!(
        "- Plugins: {}\n- Directories: {}\n- Dependencies: {} ({} platform-constrained)\n- Variants: {}\n",
        plan.summary.plugins,
        plan.summary.directories,
        plan.summary.dependencies,
        plan.summary.constrained,
        plan.summary.variants,
    ));
    if let Some(base) = &plan.base_dir {
        out.push_str(&format!("- Base dir: `{}`\n", base));
    }
    if !plan.fingerprint.is_empty() {
        out.push_str(&format!("- Fingerprint: `{}`\n", plan.fingerprint));
    }
    out.push('\n');

    section(&mut out, "Plugins", plan.plugins.is_empty(), |out| {
        for (i, id) in plan.plugins.iter().enumerate() {
            out.push_str(&format!("{}. `{}`\n", i + 1, id));
        }
    });

    section(&mut out, "Repositories", plan.repositories.is_empty(), |out| {
        for repo in &plan.repositories {
            out.push_str(&format!("- `{}`\n", repo));
        }
    });

    section(&mut out, "Directories", plan.directories.is_empty(), |out| {
        for (name, path) in &plan.directories {
            out.push_str(&format!("- `{}` -> `{}`\n", name, path));
        }
    });

    section(&mut out, "Dependencies", plan.dependencies.is_empty(), |out| {
        for dep in &plan.dependencies {
            let source = match (&dep.version_source, &dep.constrained_by) {
                (VersionSource::Platform, Some(platform)) => format!(" (via `{}`)", platform),
                _ => String::new(),
            };
            out.push_str(&format!(
                "- `{}` [{}]{}\n",
                dep,
                dep.scope.as_str(),
                source
            ));
        }
    });

    section(&mut out, "Platform constraints", plan.constraints.is_empty(), |out| {
        for c in &plan.constraints {
            out.push_str(&format!(
                "- `{}:{}:{}` constrains group `{}`\n",
                c.group, c.artifact, c.version, c.group
            ));
        }
    });

    section(&mut out, "Variants", plan.variants.is_empty(), |out| {
        for v in &plan.variants {
            let note = if v.signing_defaulted { " (default)" } else { "" };
            out.push_str(&format!("- `{}` signed with `{}`{}\n", v.name, v.signing, note));
        }
    });

    section(&mut out, "Options", plan.options.is_empty(), |out| {
        for (key, value) in &plan.options {
            out.push_str(&format!("- `{}` = `{}`\n", key, value));
        }
    });

    section(&mut out, "Clean", plan.clean.is_empty(), |out| {
        for path in &plan.clean {
            out.push_str(&format!("- `{}`\n", path));
        }
    });

    out
}

fn section(out: &mut String, title: &str, empty: bool, body: impl FnOnce(&mut String)) {
    out.push_str(&format!("## {}\n\n", title));
    if empty {
        out.push_str("_None._\n");
    } else {
        body(out);
    }
    out.push('\n');
}
