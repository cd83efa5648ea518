//! Votes and follow-up comments owned by a report.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::AppError;
use tidewatch_core::types::UserId;

/// Helpful / not-helpful tally plus the set of users who voted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Helpful votes.
    pub helpful: u32,
    /// Not-helpful votes.
    pub not_helpful: u32,
    /// Everyone who has voted.
    pub voters: BTreeSet<UserId>,
}

impl VoteTally {
    /// Record one vote. A repeat voter is a conflict and changes nothing.
    pub fn record(&mut self, voter: UserId, helpful: bool) -> Result<(), AppError> {
        if self.voters.contains(&voter) {
            return Err(AppError::conflict(format!(
                "User {voter} has already voted on this report"
            )));
        }
        self.voters.insert(voter);
        if helpful {
            self.helpful += 1;
        } else {
            self.not_helpful += 1;
        }
        Ok(())
    }

    /// Whether `user` has voted.
    pub fn has_voted(&self, user: &UserId) -> bool {
        self.voters.contains(user)
    }
}

/// One entry of the append-only follow-up log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Who wrote it.
    pub author_id: UserId,
    /// Text.
    pub message: String,
    /// When it was written.
    pub created_at: DateTime<Utc>,
}
