//! Activity-log constants and sensitive-field redaction.
//!
//! Every mutation is recorded in `activity_logs`; this module holds the
//! action vocabulary and the redaction applied to `details` before storage.

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known activity actions.
pub mod actions {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const DELETED: &str = "deleted";
    pub const ACTIVATED: &str = "activated";
    pub const EVALUATED: &str = "evaluated";
    pub const ACKNOWLEDGED: &str = "acknowledged";
    pub const RESOLVED: &str = "resolved";
    pub const STARTED: &str = "started";
    pub const ENDED: &str = "ended";
    pub const GENERATED: &str = "generated";
    pub const RESET: &str = "reset";
}

/// Entity names used in activity rows and `entity_changed` frames.
pub mod entities {
    pub const ORGANIZATION: &str = "organization";
    pub const USER: &str = "user";
    pub const SCENARIO: &str = "scenario";
    pub const TASK: &str = "task";
    pub const PLAYBOOK: &str = "playbook";
    pub const TRIGGER: &str = "trigger";
    pub const ALERT: &str = "alert";
    pub const WAR_ROOM: &str = "war_room";
    pub const BRIEFING: &str = "briefing";
    pub const BOARD_REPORT: &str = "board_report";
    pub const DEMO: &str = "demo";
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Key fragments whose values are redacted from activity details.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "apikey",
    "private_key",
    "authorization",
    "credential",
    "session_token",
];

const REDACTED: &str = "[REDACTED]";

/// Redact sensitive fields from a JSON value, recursing into objects and arrays.
///
/// Key matching is case-insensitive and by substring, so `openaiApiKey` and
/// `refresh_token` are both caught.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), serde_json::Value::String(REDACTED.into()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}
