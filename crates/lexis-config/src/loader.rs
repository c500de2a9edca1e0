// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/lexis/lexis.toml` < `~/.config/lexis/lexis.toml` <
//! `./lexis.toml` < `LEXIS_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LexisConfig;

/// Section names that `LEXIS_<SECTION>_<KEY>` variables map onto.
const ENV_SECTIONS: &[&str] = &[
    "server",
    "gateway",
    "storage",
    "anthropic",
    "familiarity",
    "relay",
];

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/lexis/lexis.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("lexis/lexis.toml"));
    }
    paths.push(PathBuf::from("lexis.toml"));
    paths
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<LexisConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LexisConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LexisConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LexisConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LexisConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    config_search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(LexisConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Maps `LEXIS_GATEWAY_BEARER_TOKEN` to `gateway.bearer_token`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// key names that contain underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("LEXIS_").map(|key| {
        let key_str = key.as_str();
        let mapped = ENV_SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
