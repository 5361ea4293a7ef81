// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord-facing text for leaderboards and quest announcements.

use guildxp_ledger::{Leaderboard, LeaderboardEntry, LeaderboardMode, Quest, QuestCadence};

/// Discord rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Hangul filler: renders as blank space that Discord does not collapse.
const PAD: &str = "\u{3164}";

fn pad(n: usize) -> String {
    PAD.repeat(n)
}

fn medal(place: usize) -> &'static str {
    match place {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "⭐",
    }
}

fn ordinal_suffix(place: usize) -> &'static str {
    match place {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => ")",
    }
}

fn display_name(entry: &LeaderboardEntry, mode: LeaderboardMode) -> String {
    if mode == LeaderboardMode::All && entry.is_board {
        format!("{} (Board)", entry.name)
    } else {
        entry.name.clone()
    }
}

fn entry_block(entry: &LeaderboardEntry, mode: LeaderboardMode) -> String {
    let name = display_name(entry, mode);
    let place = entry.place;
    if place <= 3 {
        format!(
            "{} {} {place}{} | {name}\n{} ★ {} XP ★\n{} {} (ง•̀o•́)ง \n\n",
            pad(6),
            medal(place),
            ordinal_suffix(place),
            pad(8),
            entry.xp,
            pad(8),
            entry.rank
        )
    } else {
        format!("{} {} {place}) {name} ★ {} XP ★\n", pad(4), medal(place), entry.xp)
    }
}

fn header(community: &str, mode: LeaderboardMode) -> String {
    let title = match mode {
        LeaderboardMode::Regular => format!("{} LEADERBOARD", community.to_uppercase()),
        LeaderboardMode::Board => format!("{} BOARD LEADERBOARD", community.to_uppercase()),
        LeaderboardMode::All => format!("{} OVERALL LEADERBOARD", community.to_uppercase()),
    };
    format!("╭━━━ {} ⚔️ **{title}** ⚔️ {} ━━━╮\n\n", pad(2), pad(2))
}

fn footer() -> String {
    format!("\n╰━━━━━━ {} 🏯 {} ━━━━━━╯", pad(6), pad(6))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Render a leaderboard within Discord's message limit.
///
/// Entries that would push the message past [`MAX_MESSAGE_CHARS`] are
/// dropped from the bottom and counted in a closing line.
pub fn leaderboard(board: &Leaderboard, community: &str) -> String {
    let head = header(community, board.mode);
    let foot = footer();

    if board.entries.is_empty() {
        return format!("{head}{} No members to show yet.\n{foot}", pad(3));
    }

    let tied_line = board
        .more_tied
        .map(|t| format!("{} ... and more tied with {} XP ...\n", pad(3), t.xp));

    let blocks: Vec<String> = board
        .entries
        .iter()
        .map(|e| entry_block(e, board.mode))
        .collect();

    let fixed = char_len(&head) + char_len(&foot);
    let mut body = String::new();
    let mut used = fixed + tied_line.as_deref().map_or(0, char_len);
    let mut shown = 0;
    for block in &blocks {
        let cost = char_len(block);
        // Leave room for the overflow line in case a later entry fails to fit.
        let reserve = if shown + 1 < blocks.len() { 48 } else { 0 };
        if used + cost + reserve > MAX_MESSAGE_CHARS {
            break;
        }
        body.push_str(block);
        used += cost;
        shown += 1;
    }

    if shown < blocks.len() {
        body.push_str(&format!(
            "{} ... and {} more ...\n",
            pad(3),
            blocks.len() - shown
        ));
    } else if let Some(line) = tied_line {
        body.push_str(&line);
    }
    format!("{head}{body}{foot}")
}

/// Announcement posted by the quest scheduler.
pub fn quest_announcement(quest: &Quest, xp: u64, approval_emoji: &str) -> String {
    let heading = match quest.cadence {
        QuestCadence::Daily => "📜 **Daily Quest**",
        QuestCadence::Weekly => "🗺️ **Weekly Quest**",
    };
    let mut text = format!("{heading}: {}\n", quest.title);
    if !quest.description.trim().is_empty() {
        text.push_str(quest.description.trim());
        text.push('\n');
    }
    text.push_str(&format!(
        "\nPost your submission in this channel. Approved submissions ({approval_emoji}) earn {xp} XP!"
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildxp_ledger::TiedRemainder;

    fn entry(place: usize, name: &str, xp: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            place,
            name: name.to_string(),
            xp,
            rank: "Rank 1".to_string(),
            is_board: false,
        }
    }

    fn board(entries: Vec<LeaderboardEntry>) -> Leaderboard {
        Leaderboard {
            mode: LeaderboardMode::Regular,
            eligible: entries.len(),
            entries,
            more_tied: None,
        }
    }

    #[test]
    fn podium_gets_three_lines_and_the_rest_one() {
        let text = leaderboard(
            &board(vec![
                entry(1, "Ann", 300),
                entry(1, "Bo", 300),
                entry(3, "Cy", 200),
                entry(4, "Di", 100),
            ]),
            "jsa",
        );
        assert!(text.starts_with("╭━━━"));
        assert!(text.contains("**JSA LEADERBOARD**"));
        assert!(text.contains("🥇 1st | Ann\n"));
        assert!(text.contains("🥇 1st | Bo\n"));
        assert!(text.contains("🥉 3rd | Cy\n"));
        assert!(text.contains("★ 300 XP ★\n"));
        assert!(text.contains("Rank 1 (ง•̀o•́)ง"));
        assert!(text.contains("⭐ 4) Di ★ 100 XP ★\n"));
        assert!(!text.contains("🥈"));
        assert!(text.ends_with("━━━━━━╯"));
    }

    #[test]
    fn tied_remainder_is_summarized() {
        let mut b = board(vec![entry(1, "Ann", 300)]);
        b.more_tied = Some(TiedRemainder { count: 30, xp: 10 });
        let text = leaderboard(&b, "jsa");
        assert!(text.contains("... and more tied with 10 XP ..."));
    }

    #[test]
    fn board_members_are_tagged_only_in_all_mode() {
        let mut e = entry(1, "Ann", 300);
        e.is_board = true;
        let mut b = board(vec![e]);
        assert!(!leaderboard(&b, "jsa").contains("(Board)"));
        b.mode = LeaderboardMode::All;
        let text = leaderboard(&b, "jsa");
        assert!(text.contains("Ann (Board)"));
        assert!(text.contains("OVERALL LEADERBOARD"));
    }

    #[test]
    fn long_boards_stay_under_the_message_limit() {
        let entries = (1..=200)
            .map(|i| entry(i, &format!("Member With A Long Name {i}"), 1000 - i as u64))
            .collect();
        let text = leaderboard(&board(entries), "jsa");
        assert!(char_len(&text) <= MAX_MESSAGE_CHARS, "{}", char_len(&text));
        assert!(text.contains("more ..."));
        assert!(text.ends_with("━━━━━━╯"));
    }

    #[test]
    fn empty_board() {
        let text = leaderboard(&board(Vec::new()), "jsa");
        assert!(text.contains("No members to show yet."));
    }

    #[test]
    fn announcement_names_cadence_and_xp() {
        let quest = Quest {
            id: "w1".into(),
            cadence: QuestCadence::Weekly,
            title: "Cook something new".into(),
            description: "Share a photo of the dish.".into(),
        };
        let text = quest_announcement(&quest, 25, "✅");
        assert!(text.starts_with("🗺️ **Weekly Quest**: Cook something new\n"));
        assert!(text.contains("Share a photo of the dish."));
        assert!(text.contains("(✅) earn 25 XP"));
    }
}
