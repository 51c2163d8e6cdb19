mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use config::ConfigMerger;
use declfold_domain::{DeclfoldError, DeclfoldResult, Resolver};
use declfold_manifest::{MANIFEST_FILE_NAME, Manifest};
use declfold_render::render_plan_md;
use declfold_types::plan::ResolvedPlan;
use fs_err as fs;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "declfold",
    version,
    about = "Resolve declarative build configuration into a deterministic plan."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the manifest and write plan.json and plan.md.
    Resolve(ResolveArgs),
    /// Resolve the manifest and print a summary without writing artifacts.
    Check(InputArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Manifest path (default: <project_root>/declfold.toml).
    #[arg(long)]
    manifest: Option<Utf8PathBuf>,

    /// Base directory for literal directory bindings (overrides the manifest).
    #[arg(long)]
    base_dir: Option<Utf8PathBuf>,

    /// Property value as KEY=VALUE (overrides the manifest). Repeatable.
    #[arg(long = "property", value_name = "KEY=VALUE")]
    properties: Vec<String>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory for declfold artifacts (default: <project_root>/artifacts/declfold).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main() -> DeclfoldResult<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_resolve(args: ResolveArgs) -> DeclfoldResult<()> {
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| args.input.project_root.join("artifacts").join("declfold"));

    let plan = resolve_input(args.input)?;

    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir))?;
    write_json(&out_dir.join("plan.json"), &plan)?;
    fs::write(out_dir.join("plan.md"), render_plan_md(&plan))
        .with_context(|| format!("write {}", out_dir.join("plan.md")))?;

    info!("wrote plan to {}", out_dir);
    Ok(())
}

fn cmd_check(args: InputArgs) -> DeclfoldResult<()> {
    let plan = resolve_input(args)?;
    println!(
        "ok: {} plugins, {} directories, {} dependencies ({} platform-constrained), {} variants",
        plan.summary.plugins,
        plan.summary.directories,
        plan.summary.dependencies,
        plan.summary.constrained,
        plan.summary.variants
    );
    println!("fingerprint: {}", plan.fingerprint);
    Ok(())
}

fn resolve_input(args: InputArgs) -> DeclfoldResult<ResolvedPlan> {
    let manifest = load_input_manifest(&args.project_root, args.manifest.as_deref())?;
    let cli_properties = config::parse_cli_params(&args.properties).context("parse --property")?;
    let resolver_config = ConfigMerger::new(&manifest).merge(args.base_dir, &cli_properties);

    debug!(
        "resolver config: base_dir={:?}, properties={:?}",
        resolver_config.base_dir, resolver_config.properties
    );

    let plan = Resolver::resolve_all(resolver_config, manifest.declarations)?;
    Ok(plan)
}

fn load_input_manifest(
    project_root: &Utf8Path,
    explicit: Option<&Utf8Path>,
) -> DeclfoldResult<Manifest> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => declfold_manifest::discover_manifest(project_root).ok_or_else(|| {
            DeclfoldError::Runtime(anyhow::anyhow!(
                "no {} found in {}",
                MANIFEST_FILE_NAME,
                project_root
            ))
        })?,
    };
    let manifest = declfold_manifest::load_manifest(&path)?;
    Ok(manifest)
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}
