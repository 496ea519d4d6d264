//! Tracking event types.
//!
//! `TrackSubmission` is the loosely-typed shape a browser client posts;
//! `TrackingEvent` is the fully-typed record that comes out of the
//! validation boundary and goes into storage unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum stored length for `ip_address` (fits IPv6 with scope).
pub const MAX_IP_ADDRESS_LEN: usize = 45;

/// Device category reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceType {
    pub const ALL: &'static [&'static str] = &["Desktop", "Tablet", "Mobile"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Tablet => "Tablet",
            Self::Mobile => "Mobile",
        }
    }

    /// Parse the exact client-facing spelling. No case folding.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Desktop" => Some(Self::Desktop),
            "Tablet" => Some(Self::Tablet),
            "Mobile" => Some(Self::Mobile),
            _ => None,
        }
    }
}

/// Outcome of the consent dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentDecision {
    Agree,
    Disagree,
}

impl ConsentDecision {
    pub const ALL: &'static [&'static str] = &["Agree", "Disagree"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agree => "Agree",
            Self::Disagree => "Disagree",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Agree" => Some(Self::Agree),
            "Disagree" => Some(Self::Disagree),
            _ => None,
        }
    }
}

/// Outcome of the browser permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    Allow,
    Block,
    Dismiss,
}

impl PermissionDecision {
    pub const ALL: &'static [&'static str] = &["allow", "block", "dismiss"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Block => "block",
            Self::Dismiss => "dismiss",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "allow" => Some(Self::Allow),
            "block" => Some(Self::Block),
            "dismiss" => Some(Self::Dismiss),
            _ => None,
        }
    }
}

/// Raw submission body as posted by the client.
///
/// Every field is optional here so that missing values surface as
/// validation messages instead of a deserialization failure.
/// `user_step` and `survey_clicked` stay untyped because clients send
/// them as either numbers/bools or strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackSubmission {
    pub session_id: Option<String>,
    pub experiment_run_id: Option<String>,
    pub user_id: Option<String>,
    pub user_step: Option<Value>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub browser: Option<String>,
    pub operating_system: Option<String>,
    pub device_type: Option<String>,
    pub consent_decision: Option<String>,
    pub consent_timestamp: Option<String>,
    pub icon_timestamp: Option<String>,
    pub permission_decision: Option<String>,
    pub decision_timestamp: Option<String>,
    pub survey_clicked: Option<Value>,
    pub survey_timestamp: Option<String>,
}

/// A fully validated consent/permission decision record.
///
/// Timestamps are kept as the client-supplied strings; only
/// `decision_time_taken_sec` is derived (and never supplied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub session_id: String,
    pub experiment_run_id: String,
    pub user_id: String,
    pub user_step: i32,
    pub ip_address: String,
    pub country: String,
    pub browser: String,
    pub operating_system: String,
    pub device_type: DeviceType,
    pub consent_decision: ConsentDecision,
    pub consent_timestamp: String,
    pub icon_timestamp: Option<String>,
    pub permission_decision: PermissionDecision,
    pub decision_timestamp: String,
    pub decision_time_taken_sec: Option<f64>,
    /// Normalized to "true" or "N/A".
    pub survey_clicked: String,
    /// Present only when the survey was clicked.
    pub survey_timestamp: Option<String>,
}
