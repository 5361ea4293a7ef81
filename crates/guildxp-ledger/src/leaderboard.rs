// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leaderboard projection with competition ranking.
//!
//! Places follow standard competition ranking (1, 1, 3). Truncation never
//! splits a tied group: a group that straddles the cut is either shown in
//! full, if that keeps the page within the overflow limit, or summarized.

use serde::Serialize;
use strum::{Display, EnumString};

use crate::records::Member;

/// Which members a leaderboard includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaderboardMode {
    /// Everyone except board members.
    #[default]
    Regular,
    /// Board members only.
    Board,
    /// Everyone, board members tagged.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub place: usize,
    pub name: String,
    pub xp: u64,
    pub rank: String,
    pub is_board: bool,
}

/// A tied group left off the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiedRemainder {
    pub count: usize,
    pub xp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub mode: LeaderboardMode,
    pub entries: Vec<LeaderboardEntry>,
    /// Set when a tied group at the cut was too large to list.
    pub more_tied: Option<TiedRemainder>,
    /// Members eligible under `mode`, before truncation.
    pub eligible: usize,
}

/// Rank `members` under `mode` and cut to `top` entries.
///
/// A tied group crossing the cut is listed whole when the page then stays
/// within `max(top, tie_overflow_limit)`; otherwise the page stops before the
/// group and reports it in [`Leaderboard::more_tied`].
pub fn leaderboard(
    members: &[Member],
    mode: LeaderboardMode,
    top: usize,
    tie_overflow_limit: usize,
) -> Leaderboard {
    let mut eligible: Vec<&Member> = members
        .iter()
        .filter(|m| match mode {
            LeaderboardMode::Regular => !m.board,
            LeaderboardMode::Board => m.board,
            LeaderboardMode::All => true,
        })
        .collect();
    // Stable: equal XP keeps roster order.
    eligible.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));

    let places = competition_places(&eligible.iter().map(|m| m.total_xp).collect::<Vec<_>>());
    let (shown, more_tied) = cut(&eligible, top, tie_overflow_limit);

    Leaderboard {
        mode,
        entries: eligible[..shown]
            .iter()
            .zip(places)
            .map(|(m, place)| LeaderboardEntry {
                place,
                name: m.name.clone(),
                xp: m.total_xp,
                rank: m.rank.clone(),
                is_board: m.board,
            })
            .collect(),
        more_tied,
        eligible: eligible.len(),
    }
}

/// 1-based competition places for XP values sorted descending.
pub fn competition_places(sorted_xp: &[u64]) -> Vec<usize> {
    let mut places = Vec::with_capacity(sorted_xp.len());
    for (i, xp) in sorted_xp.iter().enumerate() {
        let place = match (i.checked_sub(1), places.last()) {
            (Some(prev), Some(&last)) if sorted_xp[prev] == *xp => last,
            _ => i + 1,
        };
        places.push(place);
    }
    places
}

fn cut(sorted: &[&Member], top: usize, limit: usize) -> (usize, Option<TiedRemainder>) {
    if top >= sorted.len() {
        return (sorted.len(), None);
    }
    if top == 0 {
        return (0, None);
    }
    let boundary_xp = sorted[top - 1].total_xp;
    if sorted[top].total_xp != boundary_xp {
        return (top, None);
    }

    let group_start = sorted
        .iter()
        .position(|m| m.total_xp == boundary_xp)
        .unwrap_or(top - 1);
    let group_end = sorted[group_start..]
        .iter()
        .position(|m| m.total_xp != boundary_xp)
        .map(|offset| group_start + offset)
        .unwrap_or(sorted.len());

    if group_end <= top.max(limit) {
        (group_end, None)
    } else {
        (
            group_start,
            Some(TiedRemainder {
                count: group_end - group_start,
                xp: boundary_xp,
            }),
        )
    }
}
