// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quest catalog for the daily and weekly announcements.

use std::sync::Arc;

use guildxp_core::{GuildXpError, SheetRef, SheetStore};
use rand::seq::SliceRandom;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::debug;

/// Quest catalog headers.
pub const QUEST_HEADERS: [&str; 4] = ["Quest_ID", "Cadence", "Title", "Description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QuestCadence {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    pub id: String,
    pub cadence: QuestCadence,
    pub title: String,
    pub description: String,
}

pub struct QuestBoard {
    store: Arc<dyn SheetStore>,
    sheet: SheetRef,
}

impl QuestBoard {
    pub fn new(store: Arc<dyn SheetStore>, sheet: SheetRef) -> Self {
        Self { store, sheet }
    }

    /// Every quest in the catalog.
    pub async fn quests(&self) -> Result<Vec<Quest>, GuildXpError> {
        let table = self
            .store
            .records(&self.sheet, Some(&QUEST_HEADERS[..]))
            .await?;
        table
            .records
            .iter()
            .map(|record| {
                let cell = |name: &str| {
                    table
                        .value(record, name)
                        .unwrap_or_default()
                        .trim()
                        .to_string()
                };
                let cadence = cell("Cadence").parse::<QuestCadence>().map_err(|_| {
                    GuildXpError::Validation(format!(
                        "quest row {}: cadence `{}` is not daily or weekly",
                        record.row,
                        cell("Cadence")
                    ))
                })?;
                Ok(Quest {
                    id: cell("Quest_ID"),
                    cadence,
                    title: cell("Title"),
                    description: cell("Description"),
                })
            })
            .collect()
    }

    /// A uniformly random quest of `cadence`.
    pub async fn pick_quest(&self, cadence: QuestCadence) -> Result<Quest, GuildXpError> {
        let candidates: Vec<Quest> = self
            .quests()
            .await?
            .into_iter()
            .filter(|q| q.cadence == cadence)
            .collect();
        let quest = candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| GuildXpError::not_found(format!("{cadence} quest")))?;
        debug!(cadence = %cadence, quest = %quest.id, pool = candidates.len(), "quest picked");
        Ok(quest)
    }
}
