// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// How the supervisor creates the process copies of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// A single forked child per instance.
    #[default]
    #[serde(alias = "fork_mode")]
    Fork,
    /// Load-balanced copies sharing the app's listening sockets.
    #[serde(alias = "cluster_mode")]
    Cluster,
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecMode::Fork => write!(f, "fork"),
            ExecMode::Cluster => write!(f, "cluster"),
        }
    }
}

/// A validated manifest entry, ready for the supervisor.
///
/// Built only by the loader and read-only afterwards. Serializing it yields
/// the declarative form it was loaded from, minus anything resolved at load
/// time (forwarded variables are already in `env`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppLaunchSpec {
    name: String,
    script: String,
    watch: bool,
    instances: u32,
    exec_mode: ExecMode,
    env: BTreeMap<String, String>,
}

impl AppLaunchSpec {
    pub(crate) fn new(
        name: String,
        script: String,
        watch: bool,
        instances: u32,
        exec_mode: ExecMode,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name,
            script,
            watch,
            instances,
            exec_mode,
            env,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn watch(&self) -> bool {
        self.watch
    }

    pub fn instances(&self) -> u32 {
        self.instances
    }

    pub fn exec_mode(&self) -> ExecMode {
        self.exec_mode
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Path of `script`, with relative paths joined onto `base_dir`.
    pub fn script_path(&self, base_dir: &Path) -> PathBuf {
        let script = Path::new(&self.script);
        if script.is_absolute() {
            script.to_path_buf()
        } else {
            base_dir.join(script)
        }
    }

    /// Check that `script` points at an existing file. Meant to run right
    /// before launch, since the executable may be deployed after the
    /// manifest is loaded.
    pub fn verify_script(&self, base_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = self.script_path(base_dir);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::ScriptNotFound {
                name: self.name.clone(),
                path,
            })
        }
    }
}
