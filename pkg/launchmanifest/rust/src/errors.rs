// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading a manifest and handing its
/// apps to the supervisor. `origin` is the file path, or the label given to
/// an inline source.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{origin}: failed to read manifest: {source}")]
    Read {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: invalid manifest syntax: {message}")]
    Parse {
        origin: String,
        /// Parser message; already carries the position when one is known.
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("{origin}: manifest must be a mapping with an `apps` key")]
    NotAMapping { origin: String },

    #[error("{origin}: missing required key `apps`")]
    MissingApps { origin: String },

    #[error("{origin}: `apps` must be a sequence")]
    AppsNotSequence { origin: String },

    #[error("{origin}: apps[{index}]: malformed entry: {reason}")]
    MalformedEntry {
        origin: String,
        index: usize,
        reason: String,
    },

    #[error("{origin}: apps[{index}]: missing required field `{field}`")]
    MissingField {
        origin: String,
        index: usize,
        field: &'static str,
    },

    #[error("{origin}: apps[{index}]: field `{field}` must not be empty")]
    EmptyField {
        origin: String,
        index: usize,
        field: String,
    },

    #[error("{origin}: apps[{index}]: invalid `{field}`: {reason}")]
    InvalidField {
        origin: String,
        index: usize,
        field: String,
        reason: String,
    },

    #[error("{origin}: apps[{index}]: duplicate app name `{name}` (first declared at apps[{first}])")]
    DuplicateName {
        origin: String,
        index: usize,
        first: usize,
        name: String,
    },

    #[error("[{name}] script not found: {}", .path.display())]
    ScriptNotFound { name: String, path: PathBuf },
}

impl ConfigError {
    /// Index of the offending `apps` entry, when the error concerns one.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            ConfigError::MalformedEntry { index, .. }
            | ConfigError::MissingField { index, .. }
            | ConfigError::EmptyField { index, .. }
            | ConfigError::InvalidField { index, .. }
            | ConfigError::DuplicateName { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Name of the offending field, when the error concerns one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field, .. } => Some(*field),
            ConfigError::EmptyField { field, .. } | ConfigError::InvalidField { field, .. } => {
                Some(field.as_str())
            }
            ConfigError::DuplicateName { .. } => Some("name"),
            ConfigError::ScriptNotFound { .. } => Some("script"),
            _ => None,
        }
    }
}
