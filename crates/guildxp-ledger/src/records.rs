// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed rows decoded at the store boundary.
//!
//! Raw worksheet rows are mapped into [`Member`] and the audit record types
//! here. A malformed numeric cell is a [`GuildXpError::Validation`] naming the
//! worksheet row, never a silent zero.

use guildxp_core::{CellUpdate, GuildXpError, SheetRecord, SheetTable};

/// Member roster headers, in the order new rows are laid out.
pub const ROSTER_HEADERS: [&str; 7] = [
    "Name",
    "Email",
    "Year",
    "Discord_ID",
    "Total_XP",
    "Rank",
    "Board_Member",
];

/// Processed-event marker headers.
pub const EVENT_HEADERS: [&str; 3] = ["EventID", "Timestamp", "XP_Amount"];

/// Approval audit headers.
pub const APPROVAL_HEADERS: [&str; 6] = [
    "Message_ID",
    "Timestamp",
    "Officer_ID",
    "Recipient_ID",
    "XP_Amount",
    "Reason",
];

/// Puzzle claim headers.
pub const PUZZLE_HEADERS: [&str; 3] = ["Puzzle_Number", "Discord_ID", "Timestamp"];

/// Message id stored for grants that have no originating chat message.
pub const MANUAL_MESSAGE_ID: &str = "MANUAL";

/// Lowercased, trimmed email used as the roster key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Parse a non-negative integer cell.
pub fn parse_xp(raw: &str, what: &str) -> Result<u64, GuildXpError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| GuildXpError::Validation(format!("{what}: `{raw}` is not a whole XP amount")))
}

/// Column positions (0-based) of the roster worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterLayout {
    pub name: usize,
    pub email: usize,
    pub year: usize,
    pub discord_id: usize,
    pub total_xp: usize,
    pub rank: usize,
    pub board: usize,
}

impl RosterLayout {
    /// The layout written by `join` into an empty roster.
    pub const STANDARD: RosterLayout = RosterLayout {
        name: 0,
        email: 1,
        year: 2,
        discord_id: 3,
        total_xp: 4,
        rank: 5,
        board: 6,
    };

    /// Resolve every roster column from the header row.
    pub fn from_table(table: &SheetTable) -> Result<Self, GuildXpError> {
        let missing = table.missing_headers(&ROSTER_HEADERS);
        if !missing.is_empty() {
            return Err(GuildXpError::Validation(format!(
                "member roster is missing columns: {}",
                missing.join(", ")
            )));
        }
        let col = |name: &str| table.column(name).unwrap_or_default();
        Ok(Self {
            name: col("Name"),
            email: col("Email"),
            year: col("Year"),
            discord_id: col("Discord_ID"),
            total_xp: col("Total_XP"),
            rank: col("Rank"),
            board: col("Board_Member"),
        })
    }

    fn width(&self) -> usize {
        [
            self.name,
            self.email,
            self.year,
            self.discord_id,
            self.total_xp,
            self.rank,
            self.board,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
            + 1
    }

    /// Lay out a member as a full worksheet row.
    pub fn encode(&self, member: &Member) -> Vec<String> {
        let mut row = vec![String::new(); self.width()];
        row[self.name] = member.name.clone();
        row[self.email] = member.email.clone();
        row[self.year] = member.year.clone();
        row[self.discord_id] = member.discord_id.clone();
        row[self.total_xp] = member.total_xp.to_string();
        row[self.rank] = member.rank.clone();
        row[self.board] = board_cell(member.board).to_string();
        row
    }

    /// Cell writes that set a member's XP and rank (1-based addressing).
    pub fn xp_updates(&self, row: usize, total_xp: u64, rank: &str) -> Vec<CellUpdate> {
        if self.rank == self.total_xp + 1 {
            vec![CellUpdate::new(
                row,
                self.total_xp + 1,
                vec![total_xp.to_string(), rank.to_string()],
            )]
        } else {
            vec![
                CellUpdate::new(row, self.total_xp + 1, vec![total_xp.to_string()]),
                CellUpdate::new(row, self.rank + 1, vec![rank.to_string()]),
            ]
        }
    }

    /// Cell write for the board flag.
    pub fn board_update(&self, row: usize, board: bool) -> CellUpdate {
        CellUpdate::new(row, self.board + 1, vec![board_cell(board).to_string()])
    }

    /// Cell write for the external identity.
    pub fn identity_update(&self, row: usize, identity: &str) -> CellUpdate {
        CellUpdate::new(row, self.discord_id + 1, vec![identity.to_string()])
    }

    /// Decode one roster row.
    pub fn decode(&self, record: &SheetRecord) -> Result<Member, GuildXpError> {
        let what = format!("roster row {} Total_XP", record.row);
        Ok(Member {
            row: record.row,
            name: record.get(self.name).trim().to_string(),
            email: normalize_email(record.get(self.email)),
            year: record.get(self.year).trim().to_string(),
            discord_id: record.get(self.discord_id).trim().to_string(),
            total_xp: parse_xp(record.get(self.total_xp), &what)?,
            rank: record.get(self.rank).trim().to_string(),
            board: parse_board(record.get(self.board), record.row)?,
        })
    }
}

fn board_cell(board: bool) -> &'static str {
    if board { "Y" } else { "N" }
}

fn parse_board(raw: &str, row: usize) -> Result<bool, GuildXpError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" | "TRUE" => Ok(true),
        "" | "N" | "NO" | "FALSE" => Ok(false),
        other => Err(GuildXpError::Validation(format!(
            "roster row {row} Board_Member: `{other}` is not Y or N"
        ))),
    }
}

/// One registered member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// 1-based worksheet row.
    pub row: usize,
    pub name: String,
    /// Normalized (trimmed, lowercase).
    pub email: String,
    pub year: String,
    /// Chat identity; empty until linked.
    pub discord_id: String,
    pub total_xp: u64,
    pub rank: String,
    pub board: bool,
}

/// Outcome of [`Roster::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    /// Worksheet row of the member.
    pub row: usize,
    /// True when the member was queued for insertion.
    pub created: bool,
}

/// A point-in-time copy of the member roster.
///
/// New members added with [`Roster::upsert`] are held as pending rows until
/// the caller flushes them with one append.
#[derive(Debug, Clone)]
pub struct Roster {
    pub layout: RosterLayout,
    pub members: Vec<Member>,
    pending: usize,
    next_row: usize,
}

impl Roster {
    /// Decode every record of a roster table.
    pub fn decode(table: &SheetTable) -> Result<Self, GuildXpError> {
        let layout = RosterLayout::from_table(table)?;
        let members = table
            .records
            .iter()
            .map(|r| layout.decode(r))
            .collect::<Result<Vec<_>, _>>()?;
        let next_row = table.records.last().map(|r| r.row + 1).unwrap_or(2);
        Ok(Self {
            layout,
            members,
            pending: 0,
            next_row,
        })
    }

    pub fn by_identity(&self, identity: &str) -> Option<&Member> {
        let identity = identity.trim();
        if identity.is_empty() {
            return None;
        }
        self.members.iter().find(|m| m.discord_id == identity)
    }

    pub fn by_email(&self, email: &str) -> Option<&Member> {
        let email = normalize_email(email);
        if email.is_empty() {
            return None;
        }
        self.members.iter().find(|m| m.email == email)
    }

    /// Mutable lookup by worksheet row.
    pub fn by_row_mut(&mut self, row: usize) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.row == row)
    }

    /// Resolve `email` to a member, queuing a new member if unknown.
    pub fn upsert(&mut self, candidate: Member) -> Upserted {
        if let Some(existing) = self.by_email(&candidate.email) {
            return Upserted {
                row: existing.row,
                created: false,
            };
        }
        let row = self.next_row;
        self.next_row += 1;
        self.pending += 1;
        self.members.push(Member { row, ..candidate });
        Upserted { row, created: true }
    }

    /// Rows queued by [`Roster::upsert`], encoded for append.
    pub fn pending_rows(&self) -> Vec<Vec<String>> {
        self.members[self.members.len() - self.pending..]
            .iter()
            .map(|m| self.layout.encode(m))
            .collect()
    }
}

/// A processed-event marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMarker {
    pub event_id: String,
    pub timestamp: String,
    pub xp_amount: u64,
}

impl EventMarker {
    pub fn encode(&self) -> Vec<String> {
        vec![
            self.event_id.clone(),
            self.timestamp.clone(),
            self.xp_amount.to_string(),
        ]
    }
}

/// One approval audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalEntry {
    /// Source message id, or [`MANUAL_MESSAGE_ID`].
    pub message_id: String,
    pub timestamp: String,
    pub officer_id: String,
    pub recipient_id: String,
    pub xp_amount: u64,
    pub reason: String,
}

impl ApprovalEntry {
    pub fn encode(&self) -> Vec<String> {
        vec![
            self.message_id.clone(),
            self.timestamp.clone(),
            self.officer_id.clone(),
            self.recipient_id.clone(),
            self.xp_amount.to_string(),
            self.reason.clone(),
        ]
    }

    pub fn decode(table: &SheetTable, record: &SheetRecord) -> Result<Self, GuildXpError> {
        let cell = |name: &str| table.value(record, name).unwrap_or_default().trim().to_string();
        Ok(Self {
            message_id: cell("Message_ID"),
            timestamp: cell("Timestamp"),
            officer_id: cell("Officer_ID"),
            recipient_id: cell("Recipient_ID"),
            xp_amount: parse_xp(
                &cell("XP_Amount"),
                &format!("approval row {} XP_Amount", record.row),
            )?,
            reason: cell("Reason"),
        })
    }

    /// Calendar day (`YYYY-MM-DD`) of the timestamp.
    pub fn day(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }

    pub fn is_manual(&self) -> bool {
        self.message_id == MANUAL_MESSAGE_ID
    }
}

/// One daily puzzle claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleClaim {
    pub puzzle: u32,
    pub discord_id: String,
    pub timestamp: String,
}

impl PuzzleClaim {
    pub fn encode(&self) -> Vec<String> {
        vec![
            self.puzzle.to_string(),
            self.discord_id.clone(),
            self.timestamp.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> SheetTable {
        SheetTable::from_grid(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn roster_table(rows: &[&[&str]]) -> SheetTable {
        let mut all: Vec<&[&str]> = vec![&ROSTER_HEADERS[..]];
        all.extend_from_slice(rows);
        table(&all)
    }

    #[test]
    fn decodes_members_and_normalizes_email() {
        let t = roster_table(&[&["Ann Lee", " Ann@UFL.edu ", "2", "111", "40", "Newcomer", "y"]]);
        let roster = Roster::decode(&t).unwrap();
        let ann = &roster.members[0];
        assert_eq!(ann.row, 2);
        assert_eq!(ann.email, "ann@ufl.edu");
        assert_eq!(ann.total_xp, 40);
        assert!(ann.board);
        assert!(roster.by_email("ANN@ufl.edu").is_some());
        assert!(roster.by_identity("111").is_some());
        assert!(roster.by_identity(" ").is_none());
    }

    #[test]
    fn malformed_xp_is_a_validation_error() {
        let t = roster_table(&[&["Bo", "bo@x.com", "", "", "lots", "Newcomer", "N"]]);
        let err = Roster::decode(&t).unwrap_err();
        assert!(matches!(err, GuildXpError::Validation(ref m) if m.contains("row 2")));

        let blank = roster_table(&[&["Bo", "bo@x.com", "", "", "", "Newcomer", "N"]]);
        assert!(Roster::decode(&blank).is_err());
    }

    #[test]
    fn missing_roster_column_is_reported() {
        let t = table(&[&["Name", "Email", "Total_XP"]]);
        let err = Roster::decode(&t).unwrap_err();
        assert!(err.to_string().contains("Discord_ID"));
    }

    #[test]
    fn layout_follows_header_order() {
        let t = table(&[&[
            "Email",
            "Board_Member",
            "Rank",
            "Name",
            "Total_XP",
            "Discord_ID",
            "Year",
        ]]);
        let layout = RosterLayout::from_table(&t).unwrap();
        assert_eq!(layout.email, 0);
        assert_eq!(layout.total_xp, 4);
        // Rank is not right of Total_XP, so two separate writes.
        assert_eq!(layout.xp_updates(5, 120, "Rank 1").len(), 2);
        assert_eq!(RosterLayout::STANDARD.xp_updates(5, 120, "Rank 1").len(), 1);
    }

    #[test]
    fn upsert_queues_new_rows_after_last_record() {
        let t = roster_table(&[&["Ann", "ann@x.com", "", "1", "0", "Newcomer", "N"]]);
        let mut roster = Roster::decode(&t).unwrap();
        let member = |email: &str| Member {
            row: 0,
            name: String::new(),
            email: email.to_string(),
            year: String::new(),
            discord_id: String::new(),
            total_xp: 10,
            rank: "Newcomer".into(),
            board: false,
        };

        assert_eq!(
            roster.upsert(member("ann@x.com")),
            Upserted { row: 2, created: false }
        );
        assert_eq!(
            roster.upsert(member("new@x.com")),
            Upserted { row: 3, created: true }
        );
        let pending = roster.pending_rows();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0][1], "new@x.com");
        assert_eq!(pending[0][4], "10");
        assert_eq!(pending[0][6], "N");
    }

    #[test]
    fn approval_day_is_timestamp_prefix() {
        let entry = ApprovalEntry {
            message_id: MANUAL_MESSAGE_ID.into(),
            timestamp: "2026-03-09 17:45:00".into(),
            officer_id: "9".into(),
            recipient_id: "1".into(),
            xp_amount: 20,
            reason: "event X".into(),
        };
        assert_eq!(entry.day(), "2026-03-09");
        assert!(entry.is_manual());
        let encoded = entry.encode();
        let row: Vec<&str> = encoded.iter().map(String::as_str).collect();
        let t = table(&[&APPROVAL_HEADERS[..], &row[..]]);
        assert_eq!(ApprovalEntry::decode(&t, &t.records[0]).unwrap(), entry);
    }
}
