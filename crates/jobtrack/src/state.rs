//! Application lifecycle states and the legal transition table.
//!
//! The state machine is the authority on which lifecycle moves are legal;
//! parsing of prose labels happens only at the boundary (`parse_label`) and
//! never influences validity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationState {
    Drafting,
    Applied,
    InterviewInvited,
    InterviewCompleted,
    Offer,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationState {
    pub const ALL: [ApplicationState; 8] = [
        ApplicationState::Drafting,
        ApplicationState::Applied,
        ApplicationState::InterviewInvited,
        ApplicationState::InterviewCompleted,
        ApplicationState::Offer,
        ApplicationState::Accepted,
        ApplicationState::Rejected,
        ApplicationState::Withdrawn,
    ];

    /// Parse a human-written state label. Accepts any case, with words
    /// separated by spaces, hyphens or underscores. `analyzing` and
    /// `analysis phase` are historical aliases for `drafting`.
    pub fn parse_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "drafting" | "analyzing" | "analysis-phase" | "analyzed" => {
                Some(ApplicationState::Drafting)
            }
            "applied" => Some(ApplicationState::Applied),
            "interview-invited" => Some(ApplicationState::InterviewInvited),
            "interview-completed" => Some(ApplicationState::InterviewCompleted),
            "offer" => Some(ApplicationState::Offer),
            "accepted" => Some(ApplicationState::Accepted),
            "rejected" => Some(ApplicationState::Rejected),
            "withdrawn" => Some(ApplicationState::Withdrawn),
            _ => None,
        }
    }

    /// Canonical lower-case token, as written in `**Current Status:**`.
    pub fn as_token(&self) -> &'static str {
        match self {
            ApplicationState::Drafting => "drafting",
            ApplicationState::Applied => "applied",
            ApplicationState::InterviewInvited => "interview-invited",
            ApplicationState::InterviewCompleted => "interview-completed",
            ApplicationState::Offer => "offer",
            ApplicationState::Accepted => "accepted",
            ApplicationState::Rejected => "rejected",
            ApplicationState::Withdrawn => "withdrawn",
        }
    }

    /// Heading form used for timeline entries (`### Interview-Invited - ...`).
    pub fn heading_label(&self) -> &'static str {
        match self {
            ApplicationState::Drafting => "Drafting",
            ApplicationState::Applied => "Applied",
            ApplicationState::InterviewInvited => "Interview-Invited",
            ApplicationState::InterviewCompleted => "Interview-Completed",
            ApplicationState::Offer => "Offer",
            ApplicationState::Accepted => "Accepted",
            ApplicationState::Rejected => "Rejected",
            ApplicationState::Withdrawn => "Withdrawn",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationState::Accepted | ApplicationState::Rejected | ApplicationState::Withdrawn
        )
    }

    /// The static transition table. Withdrawal is permitted from any
    /// non-terminal state; every other edge is a one-directional
    /// real-world progression. Skipping states is disallowed so that the
    /// funnel metrics stay accurate.
    pub fn allowed_targets(&self) -> &'static [ApplicationState] {
        match self {
            ApplicationState::Drafting => {
                &[ApplicationState::Applied, ApplicationState::Withdrawn]
            }
            ApplicationState::Applied => &[
                ApplicationState::InterviewInvited,
                ApplicationState::Rejected,
                ApplicationState::Withdrawn,
            ],
            ApplicationState::InterviewInvited => &[
                ApplicationState::InterviewCompleted,
                ApplicationState::Withdrawn,
            ],
            ApplicationState::InterviewCompleted => &[
                ApplicationState::Offer,
                ApplicationState::Rejected,
                ApplicationState::Withdrawn,
            ],
            ApplicationState::Offer => {
                &[ApplicationState::Accepted, ApplicationState::Withdrawn]
            }
            ApplicationState::Accepted
            | ApplicationState::Rejected
            | ApplicationState::Withdrawn => &[],
        }
    }

    pub fn can_transition_to(&self, to: ApplicationState) -> bool {
        self.allowed_targets().contains(&to)
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for ApplicationState {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| TransitionError::UnknownState(s.to_string()))
    }
}

/// Returns `Ok(())` iff `to` is a legal successor of `from`.
pub fn validate_transition(
    from: ApplicationState,
    to: ApplicationState,
) -> Result<(), TransitionError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition { from, to })
    }
}
