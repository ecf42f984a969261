// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Parsing and validation of the `apps:` manifest consumed by the process
//! supervisor.
//!
//! Loading is a one-shot transform from text to `Vec<AppLaunchSpec>`. The
//! only outside input besides the text is the `AmbientEnv` carried by
//! `LoadOptions`, which feeds `forward_env`.

use crate::app::{AppLaunchSpec, ExecMode};
use crate::env::{AmbientEnv, existing_key, merge_env, resolve_env};
use crate::errors::ConfigError;
use crate::platform::Platform;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Inputs the loader needs besides the manifest text.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Selects which `platforms:` override applies.
    pub platform: Platform,
    /// Values available to `forward_env`.
    pub ambient: AmbientEnv,
}

impl LoadOptions {
    pub fn new(platform: Platform, ambient: AmbientEnv) -> Self {
        Self { platform, ambient }
    }
}

/// Manifest text together with where it came from.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    origin: String,
    base_dir: PathBuf,
    text: String,
}

impl ManifestSource {
    /// Wrap in-memory text. Relative scripts resolve against the current
    /// directory.
    pub fn inline(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            base_dir: PathBuf::from("."),
            text: text.into(),
        }
    }

    /// Read a manifest file. Relative scripts resolve against its directory.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            origin: origin.clone(),
            source,
        })?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            origin,
            base_dir,
            text,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// A loaded manifest: validated apps in declaration order, plus the directory
/// their relative scripts resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    origin: String,
    base_dir: PathBuf,
    apps: Vec<AppLaunchSpec>,
}

impl Manifest {
    pub fn load(source: &ManifestSource, options: &LoadOptions) -> Result<Self, ConfigError> {
        let apps = load(source, options)?;
        Ok(Self {
            origin: source.origin.clone(),
            base_dir: source.base_dir.clone(),
            apps,
        })
    }

    pub(crate) fn from_parts(origin: String, base_dir: PathBuf, apps: Vec<AppLaunchSpec>) -> Self {
        Self {
            origin,
            base_dir,
            apps,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn apps(&self) -> &[AppLaunchSpec] {
        &self.apps
    }

    pub fn into_apps(self) -> Vec<AppLaunchSpec> {
        self.apps
    }

    /// Resolve every app's script against the manifest directory, failing on
    /// the first one that does not exist.
    pub fn verify_scripts(&self) -> Result<Vec<PathBuf>, ConfigError> {
        self.apps
            .iter()
            .map(|app| app.verify_script(&self.base_dir))
            .collect()
    }
}

#[derive(Serialize)]
struct ManifestDocument<'a> {
    apps: &'a [AppLaunchSpec],
}

/// Render apps back to the declarative YAML form accepted by `load`.
pub fn to_yaml(apps: &[AppLaunchSpec]) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&ManifestDocument { apps })
}

/// Same as `to_yaml`, as pretty-printed JSON.
pub fn to_json(apps: &[AppLaunchSpec]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ManifestDocument { apps })
}

/// Entry as written in the manifest, before defaults and validation.
/// An explicit `null` means the same as leaving the key out.
#[derive(Debug, Deserialize)]
struct RawApp {
    name: Option<String>,
    script: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    watch: bool,
    instances: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    exec_mode: ExecMode,
    #[serde(default, deserialize_with = "null_as_default")]
    env: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    forward_env: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    platforms: BTreeMap<Platform, Option<RawOverride>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOverride {
    script: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    env: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    forward_env: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated `platforms.<p>` block.
#[derive(Debug, Default)]
struct Override {
    script: Option<String>,
    env: BTreeMap<String, String>,
    forward_env: Vec<String>,
}

/// Parse and validate a manifest, returning its apps in declaration order.
pub fn load(
    source: &ManifestSource,
    options: &LoadOptions,
) -> Result<Vec<AppLaunchSpec>, ConfigError> {
    let origin = source.origin.as_str();
    if source.text.trim().is_empty() {
        return Err(ConfigError::MissingApps {
            origin: origin.to_string(),
        });
    }
    let doc: Value = serde_yaml::from_str(&source.text).map_err(|e| {
        let location = e.location();
        ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    })?;

    let entries = match doc {
        Value::Mapping(top) => match top.get("apps") {
            Some(Value::Sequence(entries)) => entries.clone(),
            Some(_) => {
                return Err(ConfigError::AppsNotSequence {
                    origin: origin.to_string(),
                });
            }
            None => {
                return Err(ConfigError::MissingApps {
                    origin: origin.to_string(),
                });
            }
        },
        Value::Null => {
            return Err(ConfigError::MissingApps {
                origin: origin.to_string(),
            });
        }
        _ => {
            return Err(ConfigError::NotAMapping {
                origin: origin.to_string(),
            });
        }
    };

    let mut apps = Vec::with_capacity(entries.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let app = build_app(origin, index, entry, options)?;
        if let Some(&first) = seen.get(app.name()) {
            return Err(ConfigError::DuplicateName {
                origin: origin.to_string(),
                index,
                first,
                name: app.name().to_string(),
            });
        }
        seen.insert(app.name().to_string(), index);
        apps.push(app);
    }

    debug!("{origin}: loaded {} app(s)", apps.len());
    Ok(apps)
}

/// Read and load a manifest file.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Manifest, ConfigError> {
    Manifest::load(&ManifestSource::read(path)?, options)
}

fn build_app(
    origin: &str,
    index: usize,
    entry: Value,
    options: &LoadOptions,
) -> Result<AppLaunchSpec, ConfigError> {
    if !entry.is_mapping() {
        return Err(ConfigError::MalformedEntry {
            origin: origin.to_string(),
            index,
            reason: format!("expected a mapping, found {}", kind(&entry)),
        });
    }
    let raw: RawApp = serde_yaml::from_value(entry).map_err(|e| ConfigError::MalformedEntry {
        origin: origin.to_string(),
        index,
        reason: e.to_string(),
    })?;

    let name = raw
        .name
        .ok_or_else(|| missing(origin, index, "name"))
        .and_then(|name| non_empty(origin, index, "name", name))?;
    let base_script = raw
        .script
        .map(|script| non_empty(origin, index, "script", script))
        .transpose()?;

    let instances = match raw.instances {
        None => 1,
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ConfigError::InvalidField {
                origin: origin.to_string(),
                index,
                field: "instances".to_string(),
                reason: format!("must be between 1 and {}, got {n}", u32::MAX),
            })?,
    };

    let mut declared = stringify_env(origin, index, "env", raw.env, options.platform)?;
    let mut forward = check_forward_names(origin, index, "forward_env", raw.forward_env)?;

    // Every override is validated, not only the selected one.
    let mut overrides = BTreeMap::new();
    for (platform, raw_override) in raw.platforms {
        let validated = build_override(origin, index, platform, raw_override.unwrap_or_default())?;
        overrides.insert(platform, validated);
    }
    let selected = overrides.remove(&options.platform).unwrap_or_default();

    let script = selected
        .script
        .or(base_script)
        .ok_or_else(|| missing(origin, index, "script"))?;
    merge_env(&mut declared, selected.env, options.platform);
    for name in selected.forward_env {
        if !forward.contains(&name) {
            forward.push(name);
        }
    }
    let env = resolve_env(&name, &declared, &forward, &options.ambient, options.platform);

    Ok(AppLaunchSpec::new(
        name,
        script,
        raw.watch,
        instances,
        raw.exec_mode,
        env,
    ))
}

fn build_override(
    origin: &str,
    index: usize,
    platform: Platform,
    raw: RawOverride,
) -> Result<Override, ConfigError> {
    let field = |name: &str| format!("platforms.{platform}.{name}");
    let script = raw
        .script
        .map(|script| non_empty(origin, index, &field("script"), script))
        .transpose()?;
    let env = stringify_env(origin, index, &field("env"), raw.env, platform)?;
    let forward_env = check_forward_names(origin, index, &field("forward_env"), raw.forward_env)?;
    Ok(Override {
        script,
        env,
        forward_env,
    })
}

fn missing(origin: &str, index: usize, field: &'static str) -> ConfigError {
    ConfigError::MissingField {
        origin: origin.to_string(),
        index,
        field,
    }
}

/// Trimmed `value`, which must not be blank.
fn non_empty(
    origin: &str,
    index: usize,
    field: &str,
    value: String,
) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyField {
            origin: origin.to_string(),
            index,
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn valid_var_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

fn check_forward_names(
    origin: &str,
    index: usize,
    field: &str,
    names: Vec<String>,
) -> Result<Vec<String>, ConfigError> {
    match names.iter().position(|name| !valid_var_name(name)) {
        Some(pos) => Err(ConfigError::InvalidField {
            origin: origin.to_string(),
            index,
            field: format!("{field}[{pos}]"),
            reason: "variable names must be non-empty and contain no '=' or NUL".to_string(),
        }),
        None => Ok(names),
    }
}

/// Scalars become strings (`PORT: 3000` is injected as `"3000"`). Anything
/// else cannot be placed in a process environment. Two keys naming the same
/// variable on `platform` are rejected.
fn stringify_env(
    origin: &str,
    index: usize,
    prefix: &str,
    env: BTreeMap<String, Value>,
    platform: Platform,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let invalid = |key: &str, reason: String| ConfigError::InvalidField {
        origin: origin.to_string(),
        index,
        field: format!("{prefix}.{key}"),
        reason,
    };

    let mut out = BTreeMap::new();
    for (key, value) in env {
        if !valid_var_name(&key) {
            return Err(invalid(
                &key,
                "variable names must be non-empty and contain no '=' or NUL".to_string(),
            ));
        }
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(invalid(
                    &key,
                    format!("expected a string, number or boolean, found {}", kind(&other)),
                ));
            }
        };
        if value.contains('\0') {
            return Err(invalid(&key, "value contains NUL".to_string()));
        }
        if let Some(existing) = existing_key(&out, &key, platform) {
            return Err(invalid(
                &key,
                format!("same variable as `{existing}` on {platform}, where names ignore case"),
            ));
        }
        out.insert(key, value);
    }
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
