//! The validation boundary.
//!
//! Turns a raw [`TrackSubmission`] into a fully-typed [`TrackingEvent`]
//! or fails with every violated rule collected. Rules are evaluated
//! independently, never short-circuited, so a single response tells the
//! client about all of its problems at once.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::event::{
    ConsentDecision, DeviceType, PermissionDecision, TrackSubmission, TrackingEvent,
    MAX_IP_ADDRESS_LEN,
};
use crate::timing::decision_seconds;

static SESSION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^session_\d+_[a-zA-Z0-9]+$").unwrap());
static RUN_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^run_\d+_[a-zA-Z0-9]+$").unwrap());
static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^user_\d+_[a-zA-Z0-9]+$").unwrap());

/// The ordered list of field problems found in one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub errors: Vec<String>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors.join(", "))
    }
}

impl std::error::Error for ValidationFailure {}

/// Validate a submission and build the storage-ready record.
///
/// Pure and deterministic: no I/O, and the only derived field
/// (`decision_time_taken_sec`) depends solely on the two supplied
/// timestamps.
pub fn validate(input: &TrackSubmission) -> Result<TrackingEvent, ValidationFailure> {
    let mut errors = Vec::new();

    let session_id = require_pattern(
        input.session_id.as_deref(),
        &SESSION_ID_RE,
        "session_id",
        "session_<digits>_<alphanumeric>",
        &mut errors,
    );
    let experiment_run_id = require_pattern(
        input.experiment_run_id.as_deref(),
        &RUN_ID_RE,
        "experiment_run_id",
        "run_<digits>_<alphanumeric>",
        &mut errors,
    );
    let user_id = require_pattern(
        input.user_id.as_deref(),
        &USER_ID_RE,
        "user_id",
        "user_<digits>_<alphanumeric>",
        &mut errors,
    );

    let user_step = match coerce_user_step(input.user_step.as_ref()) {
        Ok(step) => step,
        Err(()) => {
            errors.push("Invalid user_step: must be an integer >= 1".to_string());
            1
        }
    };

    let ip_address = match input.ip_address.as_deref() {
        Some(ip) if !ip.is_empty() && ip.len() <= MAX_IP_ADDRESS_LEN => ip.to_string(),
        Some(ip) if ip.len() > MAX_IP_ADDRESS_LEN => {
            errors.push(format!(
                "Invalid ip_address: exceeds {} characters",
                MAX_IP_ADDRESS_LEN
            ));
            // The record is rejected; the clipped value only feeds logs.
            ip.chars().take(MAX_IP_ADDRESS_LEN).collect()
        }
        _ => {
            errors.push("Invalid or missing ip_address".to_string());
            String::new()
        }
    };

    let country = require_text(input.country.as_deref(), "country", &mut errors);
    let browser = require_text(input.browser.as_deref(), "browser", &mut errors);
    let operating_system =
        require_text(input.operating_system.as_deref(), "operating_system", &mut errors);

    let device_type = match input.device_type.as_deref().and_then(DeviceType::parse) {
        Some(d) => d,
        None => {
            errors.push(format!(
                "Invalid device_type: must be one of {}",
                DeviceType::ALL.join(", ")
            ));
            DeviceType::Desktop
        }
    };

    let consent_decision = match input
        .consent_decision
        .as_deref()
        .and_then(ConsentDecision::parse)
    {
        Some(c) => c,
        None => {
            errors.push(format!(
                "Invalid consent_decision: must be one of {}",
                ConsentDecision::ALL.join(", ")
            ));
            ConsentDecision::Disagree
        }
    };

    let consent_timestamp =
        require_text(input.consent_timestamp.as_deref(), "consent_timestamp", &mut errors);

    let permission_decision = match input
        .permission_decision
        .as_deref()
        .and_then(PermissionDecision::parse)
    {
        Some(p) => p,
        None => {
            errors.push(format!(
                "Invalid permission_decision: must be one of {}",
                PermissionDecision::ALL.join(", ")
            ));
            PermissionDecision::Dismiss
        }
    };

    let decision_timestamp =
        require_text(input.decision_timestamp.as_deref(), "decision_timestamp", &mut errors);

    if !errors.is_empty() {
        return Err(ValidationFailure { errors });
    }

    let icon_timestamp = input
        .icon_timestamp
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    let decision_time_taken_sec =
        decision_seconds(icon_timestamp.as_deref(), Some(&decision_timestamp));

    let survey_clicked = if is_truthy(input.survey_clicked.as_ref()) {
        "true".to_string()
    } else {
        "N/A".to_string()
    };
    let survey_timestamp = if survey_clicked == "true" {
        input.survey_timestamp.clone()
    } else {
        None
    };

    Ok(TrackingEvent {
        session_id,
        experiment_run_id,
        user_id,
        user_step,
        ip_address,
        country,
        browser,
        operating_system,
        device_type,
        consent_decision,
        consent_timestamp,
        icon_timestamp,
        permission_decision,
        decision_timestamp,
        decision_time_taken_sec,
        survey_clicked,
        survey_timestamp,
    })
}

fn require_pattern(
    value: Option<&str>,
    pattern: &Regex,
    field: &str,
    shape: &str,
    errors: &mut Vec<String>,
) -> String {
    match value {
        Some(v) if pattern.is_match(v) => v.to_string(),
        _ => {
            errors.push(format!("Invalid or missing {} (expected {})", field, shape));
            String::new()
        }
    }
}

fn require_text(value: Option<&str>, field: &str, errors: &mut Vec<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => {
            errors.push(format!("Invalid or missing {}", field));
            String::new()
        }
    }
}

/// Coerce `user_step` from a JSON number or numeric string.
/// Absent defaults to 1; anything below 1 or non-numeric is an error.
fn coerce_user_step(value: Option<&Value>) -> Result<i32, ()> {
    let step = match value {
        None | Some(Value::Null) => return Ok(1),
        Some(Value::Number(n)) => n.as_i64().ok_or(())?,
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| ())?,
        Some(_) => return Err(()),
    };

    if (1..=i64::from(i32::MAX)).contains(&step) {
        Ok(step as i32)
    } else {
        Err(())
    }
}

/// `survey_clicked` arrives as a bool or a string; only `true`/"true"
/// count as clicked.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
