use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Session key holding the unix timestamp of the last accepted submission.
pub const LAST_SUBMISSION_KEY: &str = "last_contact_submission";

/// Timestamp layout used by the contact log and the notification email.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const UNKNOWN: &str = "Unknown";

/// Largest accepted contact form body, urlencoded or multipart.
pub const FORM_BODY_LIMIT: usize = 1024 * 1024;

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MSG_INVALID_DATA: &str = "Invalid data";
pub const MSG_RATE_LIMITED: &str = "Please wait before sending another message.";
pub const MSG_SERVER_ERROR: &str = "A server error occurred. Please try again later.";
pub const MSG_SENT: &str = "Your message was sent. Thank you!";
pub const MSG_PAYLOAD_TOO_LARGE: &str = "Your message is too large.";
pub const MSG_MALFORMED_FORM: &str = "The form data could not be read.";
