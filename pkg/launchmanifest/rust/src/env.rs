// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::ConfigError;
use crate::platform::Platform;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

/// Snapshot of the environment visible to whoever evaluates a manifest.
///
/// Captured once and passed to the loader explicitly; the loader never reads
/// `std::env` itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientEnv {
    vars: BTreeMap<String, String>,
}

impl AmbientEnv {
    /// Capture the current process environment. Variables that are not valid
    /// UTF-8 are dropped.
    pub fn from_process() -> Self {
        Self::from_iter(std::env::vars_os().filter_map(|(k, v)| {
            match (k.into_string(), v.into_string()) {
                (Ok(k), Ok(v)) => Some((k, v)),
                (k, _) => {
                    debug!("ignoring non UTF-8 ambient variable {k:?}");
                    None
                }
            }
        }))
    }

    /// Read a dotenv-style file.
    /// Supports `KEY=VALUE`, `KEY="VALUE"`, `KEY='VALUE'`, comments (#), and blank lines.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            origin: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_iter(parse_env_lines(&contents)))
    }

    pub fn get(&self, name: &str, platform: Platform) -> Option<&str> {
        if let Some(v) = self.vars.get(name) {
            return Some(v);
        }
        if platform.env_names_case_insensitive() {
            return self
                .vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str());
        }
        None
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AmbientEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn parse_env_lines(contents: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        if let Some((key, raw_val)) = trimmed.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let val = raw_val
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            vars.push((key.to_string(), val));
        }
    }
    vars
}

/// Spelling under which `name` is already present in `env`, if any.
/// On platforms with case-insensitive variable names, `Path` and `PATH` are
/// the same variable.
pub fn existing_key<'a>(
    env: &'a BTreeMap<String, String>,
    name: &str,
    platform: Platform,
) -> Option<&'a str> {
    if let Some((key, _)) = env.get_key_value(name) {
        return Some(key);
    }
    if platform.env_names_case_insensitive() {
        return env
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(String::as_str);
    }
    None
}

/// Layer `overlay` on top of `base`. An overlay value replaces the base value
/// of the same variable and keeps the base's spelling of the name.
pub fn merge_env(
    base: &mut BTreeMap<String, String>,
    overlay: BTreeMap<String, String>,
    platform: Platform,
) {
    for (name, value) in overlay {
        let key = existing_key(base, &name, platform)
            .map(str::to_string)
            .unwrap_or(name);
        base.insert(key, value);
    }
}

/// Build the environment injected into an app.
///
/// Starts from the literal `declared` values, then copies each name in
/// `forward` from `ambient`. A literal value is never replaced by a
/// forwarded one, including when the names differ only in case on Windows.
/// Names missing from `ambient` are skipped.
pub fn resolve_env(
    app: &str,
    declared: &BTreeMap<String, String>,
    forward: &[String],
    ambient: &AmbientEnv,
    platform: Platform,
) -> BTreeMap<String, String> {
    let mut env = declared.clone();
    for name in forward {
        if let Some(key) = existing_key(&env, name, platform) {
            debug!("[{app}] {name} already set as {key}, not forwarding");
            continue;
        }
        match ambient.get(name, platform) {
            Some(value) => {
                env.insert(name.clone(), value.to_string());
            }
            None => warn!("[{app}] forwarded variable {name} is not set, skipping"),
        }
    }
    env
}
