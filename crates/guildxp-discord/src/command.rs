// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prefix command parsing.
//!
//! Parsing is pure: it turns message text into a [`Command`] or a reply
//! explaining what was wrong, and never touches the ledger.

use std::fmt;
use std::str::FromStr;

use guildxp_ledger::LeaderboardMode;

/// A recognized text command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `join <email>`
    Join { email: String },
    /// `xp`
    Xp,
    /// `leaderboard [regular|board|all] [n]`, arguments in any order.
    Leaderboard {
        mode: LeaderboardMode,
        top: Option<usize>,
    },
    /// `award <@user> <amount> <reason...>`
    Award {
        recipient: String,
        amount: u64,
        reason: String,
    },
    /// `processevent <url-or-id> <xp>`
    ProcessEvent { source: String, xp: u64 },
    /// `syncboard`
    SyncBoard,
    /// `help`
    Help,
}

impl Command {
    /// Commands that change other members' balances or the roster.
    pub fn requires_officer(&self) -> bool {
        matches!(
            self,
            Command::Award { .. } | Command::ProcessEvent { .. } | Command::SyncBoard
        )
    }
}

/// Why a prefixed message did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown { name: String },
    Usage { usage: &'static str },
}

impl CommandError {
    /// Reply text, with the prefix spliced into the usage line.
    pub fn reply(&self, prefix: &str) -> String {
        match self {
            CommandError::Unknown { name } => {
                format!("Unknown command `{prefix}{name}`. Try `{prefix}help`.")
            }
            CommandError::Usage { usage } => format!("Usage: `{prefix}{usage}`"),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reply(""))
    }
}

const JOIN_USAGE: &str = "join <email>";
const LEADERBOARD_USAGE: &str = "leaderboard [regular|board|all] [count]";
const AWARD_USAGE: &str = "award @member <amount> <reason>";
const PROCESS_USAGE: &str = "processevent <sheet-url> <xp>";

/// Parse `text` as a command. `None` when it does not start with `prefix`.
pub fn parse_command(prefix: &str, text: &str) -> Option<Result<Command, CommandError>> {
    let body = text.trim().strip_prefix(prefix)?;
    let mut words = body.split_whitespace();
    let name = words.next()?.to_lowercase();
    let args: Vec<&str> = words.collect();

    Some(match name.as_str() {
        "join" => match args.as_slice() {
            [email] => Ok(Command::Join {
                email: (*email).to_string(),
            }),
            _ => Err(CommandError::Usage { usage: JOIN_USAGE }),
        },
        "xp" | "balance" => Ok(Command::Xp),
        "leaderboard" | "lb" => parse_leaderboard(&args),
        "award" => parse_award(&args),
        "processevent" => match args.as_slice() {
            [source, xp] => xp
                .parse()
                .map(|xp| Command::ProcessEvent {
                    source: (*source).to_string(),
                    xp,
                })
                .map_err(|_| CommandError::Usage {
                    usage: PROCESS_USAGE,
                }),
            _ => Err(CommandError::Usage {
                usage: PROCESS_USAGE,
            }),
        },
        "syncboard" => Ok(Command::SyncBoard),
        "help" => Ok(Command::Help),
        _ => Err(CommandError::Unknown { name }),
    })
}

fn parse_leaderboard(args: &[&str]) -> Result<Command, CommandError> {
    let usage = CommandError::Usage {
        usage: LEADERBOARD_USAGE,
    };
    let mut mode = None;
    let mut top = None;
    for arg in args {
        if let Ok(n) = arg.parse::<usize>() {
            if top.replace(n).is_some() || n == 0 {
                return Err(usage);
            }
        } else if let Ok(m) = LeaderboardMode::from_str(arg) {
            if mode.replace(m).is_some() {
                return Err(usage);
            }
        } else {
            return Err(usage);
        }
    }
    Ok(Command::Leaderboard {
        mode: mode.unwrap_or_default(),
        top,
    })
}

fn parse_award(args: &[&str]) -> Result<Command, CommandError> {
    let usage = CommandError::Usage { usage: AWARD_USAGE };
    let [target, amount, reason @ ..] = args else {
        return Err(usage);
    };
    let recipient = parse_mention(target).ok_or(usage.clone())?;
    let amount = amount.parse::<u64>().map_err(|_| usage.clone())?;
    if amount == 0 || reason.is_empty() {
        return Err(usage);
    }
    Ok(Command::Award {
        recipient,
        amount,
        reason: reason.join(" "),
    })
}

/// User id from `<@123>`, `<@!123>`, or a bare numeric id.
pub fn parse_mention(token: &str) -> Option<String> {
    let id = token
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|inner| inner.strip_prefix('!').unwrap_or(inner))
        .unwrap_or(token);
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
}

/// The `help` reply.
pub fn help_text(prefix: &str) -> String {
    format!(
        "**Commands**\n\
         `{prefix}{JOIN_USAGE}` link your Discord account\n\
         `{prefix}xp` show your XP and rank\n\
         `{prefix}{LEADERBOARD_USAGE}` show the rankings\n\
         **Officers**\n\
         `{prefix}{AWARD_USAGE}`\n\
         `{prefix}{PROCESS_USAGE}`\n\
         `{prefix}syncboard`"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Command, CommandError> {
        parse_command("!", text).expect("prefixed")
    }

    #[test]
    fn unprefixed_text_is_not_a_command() {
        assert!(parse_command("!", "hello there").is_none());
        assert!(parse_command("!", "!").is_none());
        assert!(parse_command("!", "Wordle 1,674 3/6").is_none());
    }

    #[test]
    fn join_takes_exactly_one_email() {
        assert_eq!(
            parse("!join ann@ufl.edu"),
            Ok(Command::Join {
                email: "ann@ufl.edu".into()
            })
        );
        assert_eq!(
            parse("!join"),
            Err(CommandError::Usage { usage: JOIN_USAGE })
        );
        assert!(parse("!join a@x.com b@x.com").is_err());
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(parse("!XP"), Ok(Command::Xp));
        assert_eq!(parse("  !SyncBoard "), Ok(Command::SyncBoard));
    }

    #[test]
    fn leaderboard_arguments_in_any_order() {
        assert_eq!(
            parse("!leaderboard"),
            Ok(Command::Leaderboard {
                mode: LeaderboardMode::Regular,
                top: None
            })
        );
        assert_eq!(
            parse("!leaderboard 5 board"),
            Ok(Command::Leaderboard {
                mode: LeaderboardMode::Board,
                top: Some(5)
            })
        );
        assert_eq!(
            parse("!lb ALL 20"),
            Ok(Command::Leaderboard {
                mode: LeaderboardMode::All,
                top: Some(20)
            })
        );
        assert!(parse("!leaderboard 0").is_err());
        assert!(parse("!leaderboard 5 6").is_err());
        assert!(parse("!leaderboard everyone").is_err());
    }

    #[test]
    fn award_reads_mention_amount_and_reason() {
        assert_eq!(
            parse("!award <@!1234> 50 helped at the booth"),
            Ok(Command::Award {
                recipient: "1234".into(),
                amount: 50,
                reason: "helped at the booth".into()
            })
        );
        assert!(parse("!award <@1234> 50").is_err());
        assert!(parse("!award <@1234> -5 oops").is_err());
        assert!(parse("!award <@1234> 0 nothing").is_err());
        assert!(parse("!award someone 5 reason").is_err());
    }

    #[test]
    fn process_event_needs_numeric_xp() {
        assert_eq!(
            parse("!processevent https://docs.google.com/spreadsheets/d/abc/edit 10"),
            Ok(Command::ProcessEvent {
                source: "https://docs.google.com/spreadsheets/d/abc/edit".into(),
                xp: 10
            })
        );
        assert!(parse("!processevent abc ten").is_err());
    }

    #[test]
    fn officer_only_commands() {
        assert!(parse("!syncboard").unwrap().requires_officer());
        assert!(parse("!processevent abc 5").unwrap().requires_officer());
        assert!(!parse("!xp").unwrap().requires_officer());
        assert!(!parse("!help").unwrap().requires_officer());
    }

    #[test]
    fn mentions() {
        assert_eq!(parse_mention("<@42>").as_deref(), Some("42"));
        assert_eq!(parse_mention("<@!42>").as_deref(), Some("42"));
        assert_eq!(parse_mention("42").as_deref(), Some("42"));
        assert_eq!(parse_mention("<@&42>"), None);
        assert_eq!(parse_mention("<@>"), None);
    }

    #[test]
    fn errors_render_with_prefix() {
        assert!(parse_command("!", "?nope").is_none());
        let err = parse("!frobnicate").unwrap_err();
        assert_eq!(err.reply("!"), "Unknown command `!frobnicate`. Try `!help`.");
        assert_eq!(
            CommandError::Usage { usage: JOIN_USAGE }.reply("$"),
            "Usage: `$join <email>`"
        );
    }
}
