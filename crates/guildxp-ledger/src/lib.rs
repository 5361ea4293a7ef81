// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The guildxp XP ledger.
//!
//! Every balance lives in the member roster worksheet. Writes that must
//! happen at most once (event reconciliation, message approvals, puzzle
//! claims) are guarded by an append-only audit worksheet that is checked
//! before and written ahead of the balance change.
//!
//! Adapters talk to [`LedgerService`]; the other modules are public for
//! the CLI and for tests.

pub mod audit;
pub mod award;
pub mod directory;
pub mod gate;
pub mod leaderboard;
pub mod messages;
pub mod puzzle;
pub mod quests;
pub mod rank;
pub mod reconcile;
pub mod records;
pub mod service;

pub use audit::{AuditLedger, AuditSheets, GrantAudit};
pub use award::{AwardEngine, AwardOutcome};
pub use directory::{LinkOutcome, MemberDirectory};
pub use gate::WriteGate;
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardMode, TiedRemainder};
pub use puzzle::{PuzzleOutcome, PuzzleShare, parse_share};
pub use quests::{Quest, QuestBoard, QuestCadence};
pub use rank::{RankProgress, RankTable};
pub use reconcile::{ReconcileSummary, Reconciler};
pub use records::{Member, Roster};
pub use service::{Balance, LedgerService, parse_event_id};
