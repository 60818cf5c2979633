//! Budget status.

use serde::{Deserialize, Serialize};

/// The status of a budget in its lifecycle.
///
/// Guarded transitions:
/// ```text
/// Generated ──send──► Sent
///
/// any (except Approved, unexpired) ──approve──► Approved
/// any (except Rejected, unexpired) ──reject───► Rejected
/// ```
/// `Received` and `Expired` are set by unguarded overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    /// Budget was generated and has not been sent yet.
    #[default]
    Generated,

    /// Budget was sent to the client.
    Sent,

    /// Client confirmed receipt of the budget.
    Received,

    /// Client approved the budget.
    Approved,

    /// Client rejected the budget.
    Rejected,

    /// Validity period elapsed before a decision was made.
    Expired,
}

impl BudgetStatus {
    /// Returns true if the budget can be sent in this status.
    pub fn can_send(&self) -> bool {
        matches!(self, BudgetStatus::Generated)
    }

    /// Returns true if the client has already decided on the budget.
    pub fn is_decided(&self) -> bool {
        matches!(self, BudgetStatus::Approved | BudgetStatus::Rejected)
    }

    /// Returns true if the budget is still waiting for a client decision.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            BudgetStatus::Generated | BudgetStatus::Sent | BudgetStatus::Received
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Generated => "GENERATED",
            BudgetStatus::Sent => "SENT",
            BudgetStatus::Received => "RECEIVED",
            BudgetStatus::Approved => "APPROVED",
            BudgetStatus::Rejected => "REJECTED",
            BudgetStatus::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
