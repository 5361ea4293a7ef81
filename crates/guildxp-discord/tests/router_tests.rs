// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router behavior over an in-memory workbook, without a gateway.

use std::sync::Arc;

use guildxp_config::GuildXpConfig;
use guildxp_config::model::DiscordConfig;
use guildxp_discord::{InboundReaction, InboundText, Router};
use guildxp_ledger::LedgerService;
use guildxp_ledger::records::{APPROVAL_HEADERS, EVENT_HEADERS, PUZZLE_HEADERS, ROSTER_HEADERS};
use guildxp_test_utils::{FixedClock, MemoryWorkbook, grid};

const BOOK: &str = "master";
const OFFICER: &str = "900";
const DAILY: u64 = 10;
const PUZZLE: u64 = 30;

struct Fixture {
    store: Arc<MemoryWorkbook>,
    router: Router,
}

async fn fixture() -> Fixture {
    let store = Arc::new(
        MemoryWorkbook::new()
            .with_worksheet(
                BOOK,
                "Master_Roster",
                grid(&[
                    &ROSTER_HEADERS[..],
                    &["Ann", "ann@x.com", "2", "111", "95", "Newcomer", "N"],
                    &["Bo", "bo@x.com", "3", "222", "300", "Rank 3", "N"],
                ]),
            )
            .with_worksheet(BOOK, "Attendance_Logs", grid(&[&EVENT_HEADERS[..]]))
            .with_worksheet(BOOK, "Approval_Log", grid(&[&APPROVAL_HEADERS[..]]))
            .with_worksheet(BOOK, "Wordle_Claims", grid(&[&PUZZLE_HEADERS[..]]))
            .with_worksheet(
                BOOK,
                "Board_Roster",
                grid(&[&["Name", "Email"], &["Bo", "bo@x.com"]]),
            ),
    );
    let ledger = LedgerService::open(
        store.clone(),
        Arc::new(FixedClock::default()),
        &GuildXpConfig::default(),
    )
    .await
    .unwrap();
    let config = DiscordConfig {
        officer_ids: vec![OFFICER.into()],
        daily_quest_channel_id: Some(DAILY),
        weekly_quest_channel_id: Some(20),
        puzzle_channel_id: Some(PUZZLE),
        ..DiscordConfig::default()
    };
    Fixture {
        store,
        router: Router::new(Arc::new(ledger), config, "jsa"),
    }
}

fn text(author: &str, channel_id: u64, content: &str) -> InboundText {
    InboundText {
        message_id: "m-1".into(),
        channel_id,
        author_id: author.into(),
        content: content.into(),
        ..InboundText::default()
    }
}

fn approval(reactor: &str, author: &str, message_id: &str) -> InboundReaction {
    InboundReaction {
        channel_id: DAILY,
        emoji: "✅".into(),
        reactor_id: reactor.into(),
        message_id: message_id.into(),
        author_id: author.into(),
        ..InboundReaction::default()
    }
}

async fn xp_of(f: &Fixture, email: &str) -> u64 {
    f.router
        .ledger()
        .directory()
        .find_by_email(email)
        .await
        .unwrap()
        .unwrap()
        .total_xp
}

#[tokio::test]
async fn plain_chat_is_ignored() {
    let f = fixture().await;
    assert_eq!(f.router.on_text(&text("111", 99, "good morning")).await, None);
    assert_eq!(f.store.write_count().await, 0);
}

#[tokio::test]
async fn bots_are_ignored() {
    let f = fixture().await;
    let mut msg = text("111", 99, "!xp");
    msg.author_is_bot = true;
    assert_eq!(f.router.on_text(&msg).await, None);
}

#[tokio::test]
async fn xp_command_reports_balance() {
    let f = fixture().await;
    let reply = f.router.on_text(&text("111", 99, "!xp")).await.unwrap();
    assert!(reply.contains("you currently have 95 XP"), "{reply}");
}

#[tokio::test]
async fn leaderboard_command_renders_regular_members() {
    let f = fixture().await;
    let reply = f
        .router
        .on_text(&text("111", 99, "!leaderboard"))
        .await
        .unwrap();
    assert!(reply.contains("**JSA LEADERBOARD**"), "{reply}");
    assert!(reply.contains("1st | Bo"), "{reply}");
    assert!(reply.contains("2nd | Ann"), "{reply}");
}

#[tokio::test]
async fn officer_commands_are_refused_for_members() {
    let f = fixture().await;
    let reply = f
        .router
        .on_text(&text("111", 99, "!award <@222> 50 self-promotion"))
        .await
        .unwrap();
    assert!(reply.contains("Only officers"), "{reply}");
    assert_eq!(f.store.write_count().await, 0);
}

#[tokio::test]
async fn officer_award_credits_the_mentioned_member() {
    let f = fixture().await;
    let reply = f
        .router
        .on_text(&text(OFFICER, 99, "!award <@111> 10 ran the booth"))
        .await
        .unwrap();
    assert!(reply.starts_with("<@111> "), "{reply}");
    assert_eq!(xp_of(&f, "ann@x.com").await, 105);
}

#[tokio::test]
async fn usage_errors_are_replied() {
    let f = fixture().await;
    let reply = f.router.on_text(&text("111", 99, "!join")).await.unwrap();
    assert_eq!(reply, "Usage: `!join <email>`");
}

#[tokio::test]
async fn sync_board_updates_flags() {
    let f = fixture().await;
    let reply = f
        .router
        .on_text(&text(OFFICER, 99, "!syncboard"))
        .await
        .unwrap();
    assert!(reply.contains("1 member flag(s) changed"), "{reply}");
}

#[tokio::test]
async fn puzzle_shares_only_count_in_the_puzzle_channel() {
    let f = fixture().await;
    let share = "Wordle 1,674 3/6\n\n⬛🟨⬛⬛⬛\n🟩🟩🟩🟩🟩";
    assert_eq!(f.router.on_text(&text("111", 99, share)).await, None);
    assert_eq!(f.store.write_count().await, 0);

    let reply = f.router.on_text(&text("111", PUZZLE, share)).await;
    assert!(reply.is_some());
    assert_eq!(xp_of(&f, "ann@x.com").await, 101);
}

#[tokio::test]
async fn officer_reaction_approves_a_quest_once() {
    let f = fixture().await;
    let reply = f
        .router
        .on_reaction(&approval(OFFICER, "111", "msg-7"))
        .await
        .unwrap();
    assert!(reply.starts_with("<@111> "), "{reply}");
    assert_eq!(xp_of(&f, "ann@x.com").await, 105);

    f.router.on_reaction(&approval(OFFICER, "111", "msg-7")).await;
    assert_eq!(xp_of(&f, "ann@x.com").await, 105);
}

#[tokio::test]
async fn member_reactions_and_self_approvals_do_nothing() {
    let f = fixture().await;
    assert_eq!(f.router.on_reaction(&approval("222", "111", "msg-8")).await, None);
    assert_eq!(f.router.on_reaction(&approval(OFFICER, OFFICER, "msg-9")).await, None);
    assert_eq!(f.store.write_count().await, 0);
}

#[tokio::test]
async fn reactions_outside_quest_channels_do_nothing() {
    let f = fixture().await;
    let mut reaction = approval(OFFICER, "111", "msg-10");
    reaction.channel_id = PUZZLE;
    assert_eq!(f.router.on_reaction(&reaction).await, None);
    reaction.channel_id = DAILY;
    reaction.emoji = "👍".into();
    assert_eq!(f.router.on_reaction(&reaction).await, None);
}

#[tokio::test]
async fn storage_outage_is_reported_without_detail() {
    let f = fixture().await;
    f.store.fail_writes_to("Approval_Log").await;
    let reply = f
        .router
        .on_reaction(&approval(OFFICER, "111", "msg-11"))
        .await
        .unwrap();
    assert!(reply.contains("try again later"), "{reply}");
    assert_eq!(xp_of(&f, "ann@x.com").await, 95);
}
