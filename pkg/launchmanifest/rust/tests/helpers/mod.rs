// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of one `launch-manifest` invocation.
pub struct Run {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Run {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl From<Output> for Run {
    fn from(out: Output) -> Self {
        let run = Self {
            status: out.status,
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        };
        if !run.stderr.is_empty() {
            eprintln!("[launch-manifest:err] {}", run.stderr.trim_end());
        }
        run
    }
}

/// Run the binary with a clean `LAUNCH_MANIFEST_PATH` and the given extra
/// environment.
pub fn run(args: &[&str], env: &[(&str, &str)], cwd: &Path) -> Run {
    let bin = env!("CARGO_BIN_EXE_launch-manifest");
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .current_dir(cwd)
        .env_remove("LAUNCH_MANIFEST_PATH");
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.output().expect("failed to run launch-manifest").into()
}

/// Write a manifest file into `dir` and return its path.
pub fn write_manifest(dir: &Path, file_name: &str, yaml: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, yaml)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

/// Path of the manifest shipped under `demos/`.
pub fn demo_manifest() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("ecosystem.yaml")
}
