// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::app::AppLaunchSpec;
use crate::errors::ConfigError;
use crate::manifest::{LoadOptions, Manifest, load_file};
use log::{debug, info};
use std::path::{Path, PathBuf};

const DEFAULT_MANIFEST_PATH: &str = "ecosystem.yaml";

const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub fn manifest_path() -> PathBuf {
    std::env::var("LAUNCH_MANIFEST_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_MANIFEST_PATH))
}

/// Load a single manifest file, or every manifest in a directory.
///
/// Directory entries are read in file-name order. An app whose name was
/// already loaded from an earlier file is replaced in place, so the later
/// file wins. Any file that fails to load fails the whole call.
pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Manifest, ConfigError> {
    if !path.is_dir() {
        return load_file(path, options);
    }

    let origin = path.display().to_string();
    let entries = std::fs::read_dir(path).map_err(|source| ConfigError::Read {
        origin: origin.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Read {
            origin: origin.clone(),
            source,
        })?;
        let file = entry.path();
        let is_manifest = file.is_file()
            && file
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext));
        if is_manifest {
            files.push(file);
        } else {
            debug!("skipping non-manifest entry: {}", file.display());
        }
    }
    files.sort();

    let mut apps: Vec<AppLaunchSpec> = Vec::new();
    for file in &files {
        let manifest = load_file(file, options)?;
        for app in manifest.into_apps() {
            match apps.iter_mut().find(|a| a.name() == app.name()) {
                Some(slot) => {
                    info!("[{}] overridden by {}", app.name(), file.display());
                    *slot = app;
                }
                None => apps.push(app),
            }
        }
    }

    info!(
        "loaded {} app(s) from {} manifest(s) in {origin}",
        apps.len(),
        files.len()
    );
    Ok(Manifest::from_parts(origin, path.to_path_buf(), apps))
}
