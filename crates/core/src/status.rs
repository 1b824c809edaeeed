//! Enum-valued status columns and shared field validation.
//!
//! Every status is stored as `TEXT` guarded by a `CHECK` constraint in the
//! database, so the string forms here must match the migrations exactly.
//! Request DTOs carry these enums directly; serde rejects unknown values
//! before a handler ever runs, and [`std::str::FromStr`] reads the stored
//! text back into the enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of names and titles.
pub const MAX_NAME_LEN: usize = 255;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, label = $label:literal, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The database / wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        $label,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

text_enum! {
    /// Lifecycle of a strategic scenario.
    ScenarioStatus, label = "scenario status", default = Draft {
        Draft => "draft",
        Active => "active",
        Voting => "voting",
        Concluded => "concluded",
    }
}

text_enum! {
    TaskStatus, label = "task status", default = Pending {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Blocked => "blocked",
    }
}

text_enum! {
    Priority, label = "priority", default = Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

text_enum! {
    /// Shared by playbooks, triggers and alerts. Ordered low -> critical.
    Severity, label = "severity", default = Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

text_enum! {
    AlertStatus, label = "alert status", default = Open {
        Open => "open",
        Acknowledged => "acknowledged",
        Resolved => "resolved",
    }
}

text_enum! {
    /// War-room session lifecycle.
    SessionStatus, label = "session status", default = Scheduled {
        Scheduled => "scheduled",
        Active => "active",
        Ended => "ended",
    }
}

text_enum! {
    /// Publication state for briefings and board reports.
    DocumentStatus, label = "document status", default = Draft {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

text_enum! {
    UserRole, label = "user role", default = Analyst {
        Executive => "executive",
        Analyst => "analyst",
        Admin => "admin",
        Observer => "observer",
    }
}

impl Severity {
    /// Numeric rank used for ordering and escalation (low = 0).
    pub fn rank(self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }

    /// The more severe of two values.
    pub fn max(self, other: Severity) -> Severity {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

/// Validate a required human-readable name or title.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional name on a patch DTO.
pub fn validate_optional_name(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    value.map_or(Ok(()), |v| validate_name(field, v))
}
