//! Generation lifecycle state machine.
//!
//! A record advances through a fixed stage order; `Failed` is reachable
//! from every non-terminal state. Terminal records never transition
//! again — the persistence layer additionally guards every UPDATE with
//! the terminal-status check, so the invariant holds even against
//! racing writers.

use serde::{Deserialize, Serialize};

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Lifecycle status of a generation record. Discriminants match the
/// seed order of the `generation_statuses` lookup table (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending = 1,
    Validating = 2,
    Analyzing = 3,
    Matching = 4,
    Prompting = 5,
    Generating = 6,
    PostProcessing = 7,
    Completed = 8,
    Failed = 9,
}

/// Status ids that terminate the lifecycle.
pub const TERMINAL_STATUS_IDS: &[StatusId] = &[
    GenerationStatus::Completed as StatusId,
    GenerationStatus::Failed as StatusId,
];

impl GenerationStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Inverse of [`id`](Self::id); `None` for unknown ids.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Validating),
            3 => Some(Self::Analyzing),
            4 => Some(Self::Matching),
            5 => Some(Self::Prompting),
            6 => Some(Self::Generating),
            7 => Some(Self::PostProcessing),
            8 => Some(Self::Completed),
            9 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Wire/API label, e.g. `"post_processing"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Analyzing => "analyzing",
            Self::Matching => "matching",
            Self::Prompting => "prompting",
            Self::Generating => "generating",
            Self::PostProcessing => "post_processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `true` for [`Completed`](Self::Completed) and [`Failed`](Self::Failed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The stage that follows this one on the happy path.
    pub fn next_stage(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Validating),
            Self::Validating => Some(Self::Analyzing),
            Self::Analyzing => Some(Self::Matching),
            Self::Matching => Some(Self::Prompting),
            Self::Prompting => Some(Self::Generating),
            Self::Generating => Some(Self::PostProcessing),
            Self::PostProcessing => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Whether `self -> to` is a legal transition: the next happy-path
    /// stage, or `Failed` from any non-terminal state.
    pub fn can_transition(self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if to == Self::Failed {
            return true;
        }
        self.next_stage() == Some(to)
    }

    /// Stages at or past the debit point: a failure here obligates a
    /// compensating refund.
    pub fn refund_required_on_failure(self) -> bool {
        matches!(self, Self::Generating | Self::PostProcessing)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [GenerationStatus; 9] = [
        GenerationStatus::Pending,
        GenerationStatus::Validating,
        GenerationStatus::Analyzing,
        GenerationStatus::Matching,
        GenerationStatus::Prompting,
        GenerationStatus::Generating,
        GenerationStatus::PostProcessing,
        GenerationStatus::Completed,
        GenerationStatus::Failed,
    ];

    #[test]
    fn happy_path_chain_reaches_completed() {
        let mut status = GenerationStatus::Pending;
        let mut hops = 0;
        while let Some(next) = status.next_stage() {
            assert!(status.can_transition(next));
            status = next;
            hops += 1;
        }
        assert_eq!(status, GenerationStatus::Completed);
        assert_eq!(hops, 7);
    }

    #[test]
    fn failed_reachable_from_every_non_terminal_state() {
        for status in ALL {
            assert_eq!(
                status.can_transition(GenerationStatus::Failed),
                !status.is_terminal()
            );
        }
    }

    #[test]
    fn terminal_states_are_absorbing() {
        for terminal in [GenerationStatus::Completed, GenerationStatus::Failed] {
            for target in ALL {
                assert!(!terminal.can_transition(target));
            }
        }
    }

    #[test]
    fn no_skipping_stages() {
        assert!(!GenerationStatus::Pending.can_transition(GenerationStatus::Generating));
        assert!(!GenerationStatus::Analyzing.can_transition(GenerationStatus::Prompting));
    }

    #[test]
    fn no_backward_transitions() {
        assert!(!GenerationStatus::Generating.can_transition(GenerationStatus::Matching));
        assert!(!GenerationStatus::PostProcessing.can_transition(GenerationStatus::Generating));
    }

    #[test]
    fn ids_round_trip() {
        for status in ALL {
            assert_eq!(GenerationStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(GenerationStatus::from_id(0), None);
        assert_eq!(GenerationStatus::from_id(42), None);
    }

    #[test]
    fn refund_obligation_starts_at_generating() {
        assert!(!GenerationStatus::Prompting.refund_required_on_failure());
        assert!(GenerationStatus::Generating.refund_required_on_failure());
        assert!(GenerationStatus::PostProcessing.refund_required_on_failure());
    }

    #[test]
    fn terminal_ids_match_enum() {
        assert_eq!(TERMINAL_STATUS_IDS, &[8, 9]);
    }
}
