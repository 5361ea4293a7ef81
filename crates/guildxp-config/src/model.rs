// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for guildxp.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level guildxp configuration.
///
/// Every section is optional and defaults to a working local setup
/// (SQLite store, stock rank ladder).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuildXpConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Discord gateway and command settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Which worksheet store backs the ledger.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Workbook key and worksheet titles.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Rank ladder, any order; thresholds are sorted on load.
    #[serde(default = "default_ranks")]
    pub ranks: Vec<RankTier>,

    /// Leaderboard defaults.
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Daily puzzle rewards.
    #[serde(default)]
    pub puzzle: PuzzleConfig,

    /// Quest announcements and quest rewards.
    #[serde(default)]
    pub quests: QuestsConfig,
}

impl Default for GuildXpConfig {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            discord: DiscordConfig::default(),
            storage: StorageConfig::default(),
            sheets: SheetsConfig::default(),
            ranks: default_ranks(),
            leaderboard: LeaderboardConfig::default(),
            puzzle: PuzzleConfig::default(),
            quests: QuestsConfig::default(),
        }
    }
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in log lines and announcements.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "guildxp".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Discord integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token. `None` disables the gateway (CLI-only operation).
    #[serde(default)]
    pub token: Option<String>,

    /// Prefix for text commands such as `!join`.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// User or role IDs allowed to award XP and process events.
    #[serde(default)]
    pub officer_ids: Vec<String>,

    /// Reaction an officer adds to approve a quest submission.
    #[serde(default = "default_approval_emoji")]
    pub approval_emoji: String,

    /// Channel receiving daily quests and daily submissions.
    #[serde(default)]
    pub daily_quest_channel_id: Option<u64>,

    /// Channel receiving weekly quests and weekly submissions.
    #[serde(default)]
    pub weekly_quest_channel_id: Option<u64>,

    /// Channel where puzzle share texts are claimed. `None` accepts any channel.
    #[serde(default)]
    pub puzzle_channel_id: Option<u64>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            command_prefix: default_command_prefix(),
            officer_ids: Vec::new(),
            approval_emoji: default_approval_emoji(),
            daily_quest_channel_id: None,
            weekly_quest_channel_id: None,
            puzzle_channel_id: None,
        }
    }
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_approval_emoji() -> String {
    "✅".to_string()
}

/// Worksheet store backend selector.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    /// Google Sheets REST API (the store of record in production).
    Sheets,
    /// Local SQLite workbook mirror.
    #[default]
    Sqlite,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend used for every worksheet.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path to the SQLite database file (sqlite backend only).
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("guildxp").join("guildxp.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("guildxp.db"))
        .to_string_lossy()
        .into_owned()
}

/// Workbook and worksheet naming.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    /// Key of the master workbook holding all ledger worksheets.
    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,

    /// OAuth bearer token for the Sheets API (sheets backend only).
    #[serde(default)]
    pub access_token: Option<String>,

    /// Sheets API base URL.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,

    /// Member roster worksheet.
    #[serde(default = "default_roster_sheet")]
    pub roster_sheet: String,

    /// Processed-event markers.
    #[serde(default = "default_events_sheet")]
    pub events_sheet: String,

    /// Approval audit log.
    #[serde(default = "default_approvals_sheet")]
    pub approvals_sheet: String,

    /// Daily puzzle claims.
    #[serde(default = "default_puzzle_sheet")]
    pub puzzle_sheet: String,

    /// Board roster (read-only input to board flag sync).
    #[serde(default = "default_board_sheet")]
    pub board_sheet: String,

    /// Quest catalog.
    #[serde(default = "default_quests_sheet")]
    pub quests_sheet: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: default_spreadsheet_id(),
            access_token: None,
            base_url: default_sheets_base_url(),
            roster_sheet: default_roster_sheet(),
            events_sheet: default_events_sheet(),
            approvals_sheet: default_approvals_sheet(),
            puzzle_sheet: default_puzzle_sheet(),
            board_sheet: default_board_sheet(),
            quests_sheet: default_quests_sheet(),
        }
    }
}

fn default_spreadsheet_id() -> String {
    "master".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_roster_sheet() -> String {
    "Master_Roster".to_string()
}

fn default_events_sheet() -> String {
    "Attendance_Logs".to_string()
}

fn default_approvals_sheet() -> String {
    "Approval_Log".to_string()
}

fn default_puzzle_sheet() -> String {
    "Wordle_Claims".to_string()
}

fn default_board_sheet() -> String {
    "Board_Roster".to_string()
}

fn default_quests_sheet() -> String {
    "Quests".to_string()
}

/// One rung of the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankTier {
    /// Minimum total XP for this rank.
    pub threshold: u64,
    /// Rank label written to the roster.
    pub label: String,
}

impl RankTier {
    pub fn new(threshold: u64, label: &str) -> Self {
        Self {
            threshold,
            label: label.to_string(),
        }
    }
}

/// The stock ladder: Newcomer, then a rank every 100 XP up to Rank 5.
pub fn default_ranks() -> Vec<RankTier> {
    vec![
        RankTier::new(0, "Newcomer"),
        RankTier::new(100, "Rank 1"),
        RankTier::new(200, "Rank 2"),
        RankTier::new(300, "Rank 3"),
        RankTier::new(400, "Rank 4"),
        RankTier::new(500, "Rank 5"),
    ]
}

/// Leaderboard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardConfig {
    /// Entries shown when the caller does not ask for a count.
    #[serde(default = "default_top")]
    pub default_top: usize,

    /// Largest page a tied group may stretch the board to before it is
    /// summarized instead of listed.
    #[serde(default = "default_tie_overflow_limit")]
    pub tie_overflow_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_top: default_top(),
            tie_overflow_limit: default_tie_overflow_limit(),
        }
    }
}

fn default_top() -> usize {
    10
}

fn default_tie_overflow_limit() -> usize {
    20
}

/// Daily puzzle reward configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PuzzleConfig {
    /// XP for solving in 1..=6 attempts (index 0 = one attempt).
    #[serde(default = "default_xp_by_attempts")]
    pub xp_by_attempts: Vec<u64>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            xp_by_attempts: default_xp_by_attempts(),
        }
    }
}

fn default_xp_by_attempts() -> Vec<u64> {
    vec![10, 8, 6, 5, 4, 3]
}

/// Quest announcement configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuestsConfig {
    /// Cron expression for posting the daily quest. Empty disables it.
    #[serde(default = "default_daily_cron")]
    pub daily_cron: Option<String>,

    /// Cron expression for posting the weekly quest. Empty disables it.
    #[serde(default = "default_weekly_cron")]
    pub weekly_cron: Option<String>,

    /// XP for an approved daily submission.
    #[serde(default = "default_daily_xp")]
    pub daily_xp: u64,

    /// XP for an approved weekly submission.
    #[serde(default = "default_weekly_xp")]
    pub weekly_xp: u64,
}

impl Default for QuestsConfig {
    fn default() -> Self {
        Self {
            daily_cron: default_daily_cron(),
            weekly_cron: default_weekly_cron(),
            daily_xp: default_daily_xp(),
            weekly_xp: default_weekly_xp(),
        }
    }
}

fn default_daily_cron() -> Option<String> {
    Some("0 9 * * *".to_string())
}

fn default_weekly_cron() -> Option<String> {
    Some("0 9 * * 1".to_string())
}

fn default_daily_xp() -> u64 {
    10
}

fn default_weekly_xp() -> u64 {
    25
}
