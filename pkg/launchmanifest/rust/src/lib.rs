// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

pub mod app;
pub mod config;
pub mod env;
pub mod errors;
pub mod manifest;
pub mod platform;

pub use app::{AppLaunchSpec, ExecMode};
pub use config::{load_path, manifest_path};
pub use env::{AmbientEnv, merge_env, resolve_env};
pub use errors::ConfigError;
pub use manifest::{LoadOptions, Manifest, ManifestSource, load, load_file, to_json, to_yaml};
pub use platform::Platform;
