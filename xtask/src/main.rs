// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! DAE Stage build tasks.
//!
//! A single, discoverable entrypoint for repo automation via `cargo xtask …`
//! (see `.cargo/config.toml`).
//!
//! - `wasm` builds the `dae-wasm` host bindings into a web package with `wasm-pack`.
//! - `bundle` runs `wasm`, then copies the host page next to the package so the
//!   output directory can be served as-is.
//!
//! Invariants:
//! - This is *not* production runtime code; it invokes external tools (`wasm-pack`).
//! - Paths are resolved from the workspace root, not the caller's cwd.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

const WASM_CRATE: &str = "crates/dae-wasm";
const HOST_PAGE: &str = "web/index.html";

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "DAE Stage build tasks (cargo xtask …)",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the WASM host bindings into `<out-dir>/pkg`.
    Wasm(BuildArgs),
    /// Build the WASM package and copy the host page into `<out-dir>`.
    Bundle(BuildArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Output directory, relative to the workspace root.
    #[arg(long, default_value = "dist")]
    out_dir: PathBuf,

    /// Build without optimisations (faster, larger).
    #[arg(long)]
    dev: bool,

    /// Skip the console panic hook (builds with the plain `wasm` feature).
    #[arg(long = "no-panic-hook", action = clap::ArgAction::SetFalse)]
    panic_hook: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = workspace_root()?;

    match cli.command {
        Commands::Wasm(args) => run_wasm(&root, &args),
        Commands::Bundle(args) => run_bundle(&root, &args),
    }
}

fn workspace_root() -> Result<PathBuf> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .context("xtask manifest has no parent directory")
}

/// Arguments passed to `wasm-pack build`.
fn wasm_pack_args(root: &Path, args: &BuildArgs) -> Vec<String> {
    let out = root.join(&args.out_dir).join("pkg");
    let mut v = vec![
        "build".to_owned(),
        root.join(WASM_CRATE).display().to_string(),
        "--target".to_owned(),
        "web".to_owned(),
        "--out-dir".to_owned(),
        out.display().to_string(),
        "--out-name".to_owned(),
        "dae_stage".to_owned(),
    ];
    v.push(if args.dev { "--dev" } else { "--release" }.to_owned());
    v.push("--".to_owned());
    v.push("--features".to_owned());
    v.push(if args.panic_hook { "console-panic" } else { "wasm" }.to_owned());
    v
}

fn run_wasm(root: &Path, args: &BuildArgs) -> Result<()> {
    let status = Command::new("wasm-pack")
        .args(wasm_pack_args(root, args))
        .current_dir(root)
        .status()
        .context("failed to spawn `wasm-pack` (install with `cargo install wasm-pack`)")?;

    if !status.success() {
        bail!("wasm-pack build failed (exit status: {status})");
    }

    Ok(())
}

fn run_bundle(root: &Path, args: &BuildArgs) -> Result<()> {
    run_wasm(root, args)?;

    let src = root.join(HOST_PAGE);
    let dest_dir = root.join(&args.out_dir);
    std::fs::create_dir_all(&dest_dir)
        .with_context(|| format!("failed to create {}", dest_dir.display()))?;
    let dest = dest_dir.join("index.html");
    std::fs::copy(&src, &dest)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;

    Ok(())
}
