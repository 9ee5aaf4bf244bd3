// Error taxonomy for raffle operations.

use thiserror::Error;

use crate::model::ParticipantId;

#[derive(Debug, Error)]
pub enum RaffleError {
    /// The submitted text contained no non-empty lines.
    #[error("At least one name is required")]
    EmptyInput,

    /// Every submitted name is already in the pool.
    #[error("All names already exist")]
    AllDuplicates { submitted: usize },

    /// A draw was requested with no participants.
    #[error("No participants available")]
    EmptyPool,

    /// The participant is not (or no longer) in the pool.
    #[error("participant {id} not found")]
    NotFound { id: ParticipantId },

    /// A draw was requested while another draw is still animating.
    #[error("A draw is already in progress")]
    DrawInProgress,

    /// The backing store failed. Never recovered silently: continuing
    /// could break the pool/ledger consistency.
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl RaffleError {
    /// Whether the caller may surface this error as a message and carry on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RaffleError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_is_the_only_hard_failure() {
        assert!(RaffleError::EmptyInput.is_recoverable());
        assert!(RaffleError::AllDuplicates { submitted: 3 }.is_recoverable());
        assert!(RaffleError::EmptyPool.is_recoverable());
        assert!(RaffleError::NotFound { id: ParticipantId(1) }.is_recoverable());
        assert!(RaffleError::DrawInProgress.is_recoverable());
        assert!(!RaffleError::Storage(anyhow::anyhow!("disk gone")).is_recoverable());
    }

    #[test]
    fn storage_message_includes_context_chain() {
        let err = anyhow::anyhow!("disk I/O error").context("failed to insert winner");
        let msg = RaffleError::Storage(err).to_string();
        assert!(msg.starts_with("storage failure: failed to insert winner"));
        assert!(msg.contains("disk I/O error"));
    }
}
