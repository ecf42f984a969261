// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use launch_manifest::{
    AmbientEnv, LoadOptions, Manifest, Platform, load_path, manifest_path, to_json, to_yaml,
};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "launch-manifest",
    version,
    about = "Validate and render process supervisor manifests"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: log::Level,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate a manifest, printing one line per app
    Check {
        #[command(flatten)]
        load: LoadArgs,

        /// Also require every app's script to exist on disk
        #[arg(long)]
        verify_scripts: bool,
    },
    /// Print the resolved manifest
    Render {
        #[command(flatten)]
        load: LoadArgs,

        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// Manifest file or directory (defaults to $LAUNCH_MANIFEST_PATH or ecosystem.yaml)
    path: Option<PathBuf>,

    /// Platform whose overrides apply (defaults to the current one)
    #[arg(long)]
    platform: Option<Platform>,

    /// Read forwarded variables from this dotenv file instead of the process environment
    #[arg(long)]
    ambient_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl LoadArgs {
    fn load(&self) -> Result<Manifest> {
        let path = self.path.clone().unwrap_or_else(manifest_path);
        let ambient = match &self.ambient_file {
            Some(file) => AmbientEnv::from_env_file(file)?,
            None => AmbientEnv::from_process(),
        };
        let options = LoadOptions::new(self.platform.unwrap_or_default(), ambient);
        info!(
            "loading {} for {} ({} ambient variable(s))",
            path.display(),
            options.platform,
            options.ambient.len()
        );
        load_path(&path, &options).with_context(|| format!("invalid manifest {}", path.display()))
    }
}

fn check(manifest: &Manifest, verify_scripts: bool) -> Result<()> {
    if verify_scripts {
        manifest
            .verify_scripts()
            .context("manifest refers to missing scripts")?;
    }
    for app in manifest.apps() {
        println!(
            "{}: {} (exec_mode={}, instances={}, watch={}, env={})",
            app.name(),
            display_script(manifest.base_dir(), app.script()),
            app.exec_mode(),
            app.instances(),
            app.watch(),
            app.env().len()
        );
    }
    println!("{}: {} app(s) ok", manifest.origin(), manifest.apps().len());
    Ok(())
}

fn display_script(base_dir: &Path, script: &str) -> String {
    if Path::new(script).is_absolute() || base_dir == Path::new(".") {
        script.to_string()
    } else {
        format!("{script} (in {})", base_dir.display())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    simple_logger::init_with_level(cli.log_level)?;

    match cli.command {
        Command::Check {
            load,
            verify_scripts,
        } => check(&load.load()?, verify_scripts),
        Command::Render { load, format } => {
            let manifest = load.load()?;
            let rendered = match format {
                Format::Yaml => to_yaml(manifest.apps())?,
                Format::Json => to_json(manifest.apps())?,
            };
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
