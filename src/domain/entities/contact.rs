use actix_multipart::form::{text::Text, MultipartForm};
use actix_web::http::Method;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use validator::{ValidateEmail, ValidateLength};

use crate::{
    constants::{TIMESTAMP_FORMAT, UNKNOWN},
    utils::sanitize::{escape_html, sanitize_email},
};

/// Raw form fields as posted. Missing fields deserialize to empty strings.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// The same fields sent as `multipart/form-data`, e.g. a `FormData` body from `fetch`.
#[derive(Debug, MultipartForm)]
pub struct ContactFormUpload {
    pub name: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub subject: Option<Text<String>>,
    pub message: Option<Text<String>>,
}

impl From<ContactFormUpload> for ContactForm {
    fn from(upload: ContactFormUpload) -> Self {
        let text = |field: Option<Text<String>>| field.map(|t| t.0).unwrap_or_default();
        ContactForm {
            name: text(upload.name),
            email: text(upload.email),
            subject: text(upload.subject),
            message: text(upload.message),
        }
    }
}

/// Everything the handler needs to know about one incoming request.
#[derive(Debug, Clone)]
pub struct ContactRequest {
    pub method: Method,
    pub form: ContactForm,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub requested_with: Option<String>,
    pub session_id: String,
}

impl ContactRequest {
    pub fn is_ajax(&self) -> bool {
        self.requested_with
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("XMLHttpRequest"))
    }

    pub fn client_ip_or_unknown(&self) -> &str {
        self.client_ip.as_deref().filter(|ip| !ip.is_empty()).unwrap_or(UNKNOWN)
    }

    pub fn user_agent_or_unknown(&self) -> &str {
        self.user_agent.as_deref().filter(|ua| !ua.is_empty()).unwrap_or(UNKNOWN)
    }
}

/// A trimmed and escaped submission. Only constructed through [`ContactSubmission::sanitize`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn sanitize(form: &ContactForm) -> Self {
        ContactSubmission {
            name: escape_html(form.name.trim()),
            email: sanitize_email(form.email.trim()),
            subject: escape_html(form.subject.trim()),
            message: escape_html(form.message.trim()),
        }
    }

    /// Checks every field and returns all problems in field order.
    ///
    /// Minimum lengths count Unicode characters of the escaped text, not bytes,
    /// so a one-letter name like "é" is too short.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("Name is required.".to_string());
        } else if !self.name.validate_length(Some(2u64), None, None) {
            errors.push("Name must be at least 2 characters.".to_string());
        }

        if self.email.is_empty() {
            errors.push("Email is required.".to_string());
        } else if !self.email.validate_email() {
            errors.push("Invalid email format.".to_string());
        }

        if self.subject.is_empty() {
            errors.push("Subject is required.".to_string());
        }

        if self.message.is_empty() {
            errors.push("Message is required.".to_string());
        } else if !self.message.validate_length(Some(10u64), None, None) {
            errors.push("Message must be at least 10 characters.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Plain text body of the notification email.
    pub fn email_body(&self, sent_at: &DateTime<Local>, client_ip: &str, user_agent: &str) -> String {
        let mut body = String::with_capacity(self.message.len() + 256);
        body.push_str("Pesan baru dari portofolio website:\n\n");
        body.push_str(&format!("Nama: {}\n", self.name));
        body.push_str(&format!("Email: {}\n", self.email));
        body.push_str(&format!("Subjek: {}\n\n", self.subject));
        body.push_str(&format!("Pesan:\n{}\n\n", self.message));
        body.push_str("---\n");
        body.push_str(&format!("Dikirim pada: {}\n", sent_at.format(TIMESTAMP_FORMAT)));
        body.push_str(&format!("IP Address: {}\n", client_ip));
        body.push_str(&format!("User Agent: {}", user_agent));
        body
    }
}

/// JSON body shared by every contact response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ContactResponse {
    pub fn success(message: &str) -> Self {
        ContactResponse { success: true, message: message.to_string(), errors: None }
    }

    pub fn failure(message: &str) -> Self {
        ContactResponse { success: false, message: message.to_string(), errors: None }
    }

    pub fn invalid(message: &str, errors: Vec<String>) -> Self {
        ContactResponse { success: false, message: message.to_string(), errors: Some(errors) }
    }
}

/// How a successful submission is answered.
#[derive(Debug, PartialEq)]
pub enum ContactReply {
    Json(ContactResponse),
    Redirect(String),
}

/// Row shape for the optional message archive.
#[derive(Debug, Clone, Serialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub ip_address: String,
    pub created_at: DateTime<Local>,
}

impl NewContactMessage {
    pub fn from_submission(submission: &ContactSubmission, ip_address: &str, created_at: DateTime<Local>) -> Self {
        NewContactMessage {
            name: submission.name.clone(),
            email: submission.email.clone(),
            subject: submission.subject.clone(),
            message: submission.message.clone(),
            ip_address: ip_address.to_string(),
            created_at,
        }
    }
}

/// Appends `status=success` to the configured redirect target, keeping any fragment last.
pub fn success_redirect(base: &str) -> String {
    let (path, fragment) = match base.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (base, None),
    };
    let separator = if path.contains('?') { '&' } else { '?' };

    match fragment {
        Some(fragment) => format!("{path}{separator}status=success#{fragment}"),
        None => format!("{path}{separator}status=success"),
    }
}
