// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./guildxp.toml` > `~/.config/guildxp/guildxp.toml` >
//! `/etc/guildxp/guildxp.toml`, with `GUILDXP_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GuildXpConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/guildxp/guildxp.toml";

/// Local config file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "guildxp.toml";

/// The per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("guildxp").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the file hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/guildxp/guildxp.toml`
/// 3. `~/.config/guildxp/guildxp.toml`
/// 4. `./guildxp.toml`
/// 5. `DISCORD_TOKEN` / `GOOGLE_SHEET_ID` (the bot's historical `.env` names)
/// 6. `GUILDXP_*` environment variables
pub fn load_config() -> Result<GuildXpConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the compiled defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<GuildXpConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuildXpConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GuildXpConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuildXpConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GuildXpConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// `GUILDXP_<SECTION>_<KEY>` mapped to `section.key`.
///
/// Uses `Env::map` rather than `Env::split("_")` because keys themselves
/// contain underscores: `GUILDXP_SHEETS_ACCESS_TOKEN` is `sheets.access_token`.
fn env_provider() -> Env {
    Env::prefixed("GUILDXP_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key onto its dotted config path.
pub fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 7] = [
        "bot_",
        "discord_",
        "storage_",
        "sheets_",
        "leaderboard_",
        "puzzle_",
        "quests_",
    ];
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            return format!("{}.{rest}", section.trim_end_matches('_'));
        }
    }
    key
}

fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&["DISCORD_TOKEN", "GOOGLE_SHEET_ID"])
        .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
            "discord_token" => "discord.token".into(),
            "google_sheet_id" => "sheets.spreadsheet_id".into(),
            other => other.to_string().into(),
        })
}
