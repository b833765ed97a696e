//! Repair order status values and transition rules.
//!
//! The `order_status` column stores the lowercase names below; a CHECK
//! constraint in `20261019000005_create_orders.sql` keeps it to this set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const STATUS_RECEIVED: &str = "received";
pub const STATUS_IN_PROGRESS: &str = "inprogress";
pub const STATUS_COMPLETED: &str = "completed";

/// All valid order statuses, in workflow order.
pub const VALID_STATUSES: &[&str] = &[STATUS_RECEIVED, STATUS_IN_PROGRESS, STATUS_COMPLETED];

/// Where a repair order sits in the shop workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Received,
    InProgress,
    Completed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Received => STATUS_RECEIVED,
            OrderStatus::InProgress => STATUS_IN_PROGRESS,
            OrderStatus::Completed => STATUS_COMPLETED,
        }
    }

    /// Statuses reachable from `self`, including `self`.
    ///
    /// - `received`   -> `received`, `inprogress`, `completed`
    /// - `inprogress` -> `inprogress`, `completed`
    /// - `completed`  -> `completed`
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Received => &[
                OrderStatus::Received,
                OrderStatus::InProgress,
                OrderStatus::Completed,
            ],
            OrderStatus::InProgress => &[OrderStatus::InProgress, OrderStatus::Completed],
            OrderStatus::Completed => &[OrderStatus::Completed],
        }
    }

    /// Validate that moving from `self` to `next` is allowed.
    pub fn validate_transition(self, next: OrderStatus) -> Result<(), CoreError> {
        if self.allowed_next().contains(&next) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Cannot move order from '{self}' back to '{next}'"
            )))
        }
    }

    pub fn is_completed(self) -> bool {
        self == OrderStatus::Completed
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    /// Accepts the stored names plus the spellings the admin console sends
    /// (`"In Progress"`, `"in_progress"`, any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            STATUS_RECEIVED => Ok(OrderStatus::Received),
            STATUS_IN_PROGRESS => Ok(OrderStatus::InProgress),
            STATUS_COMPLETED => Ok(OrderStatus::Completed),
            _ => Err(CoreError::Validation(format!(
                "Invalid order status '{s}'. Must be one of: {VALID_STATUSES:?}"
            ))),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_statuses_parse() {
        for s in VALID_STATUSES {
            let parsed: OrderStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
    }

    #[test]
    fn console_spellings_parse() {
        assert_eq!("In Progress".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert_eq!("in_progress".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert_eq!("COMPLETED".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn default_is_received() {
        assert_eq!(OrderStatus::default(), OrderStatus::Received);
    }

    #[test]
    fn forward_transitions_are_allowed() {
        use OrderStatus::*;
        assert!(Received.validate_transition(InProgress).is_ok());
        assert!(Received.validate_transition(Completed).is_ok());
        assert!(InProgress.validate_transition(Completed).is_ok());
    }

    #[test]
    fn same_status_is_allowed() {
        use OrderStatus::*;
        for s in [Received, InProgress, Completed] {
            assert!(s.validate_transition(s).is_ok());
        }
    }

    #[test]
    fn backward_transitions_are_rejected() {
        use OrderStatus::*;
        assert!(InProgress.validate_transition(Received).is_err());
        assert!(Completed.validate_transition(InProgress).is_err());
        assert!(Completed.validate_transition(Received).is_err());
    }

    #[test]
    fn serde_uses_stored_names() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"inprogress\"");
        let back: OrderStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, OrderStatus::InProgress);
        assert!(serde_json::from_str::<OrderStatus>("\"lost\"").is_err());
    }
}
