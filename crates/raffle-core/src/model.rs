// Participant and winner records.

use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an active participant.
///
/// Backed by the store's row id. Ids are never reused, so a ledger entry
/// that remembers the id of the participant it removed can never match a
/// participant added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ToSql for ParticipantId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for ParticipantId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(ParticipantId)
    }
}

/// An active entrant, eligible to be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Non-empty, trimmed display name with its first-seen casing.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of the winner ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// Ledger row id.
    pub id: i64,
    /// Copy of the participant's name at draw time. Survives the
    /// participant's deletion.
    pub name: String,
    pub drawn_at: DateTime<Utc>,
    /// The participant this draw removed from the pool, when known.
    pub participant_id: Option<ParticipantId>,
}
