use std::sync::Arc;

use actix_web::http::Method;

use crate::{
    constants::{LAST_SUBMISSION_KEY, MSG_SENT},
    entities::contact::{
        success_redirect, ContactReply, ContactRequest, ContactResponse, ContactSubmission,
        NewContactMessage,
    },
    errors::ContactError,
    logging::contact_log::ContactLog,
    mail::{MailHeaders, MailTransport, OutgoingMail},
    repositories::contact_message::ContactMessageRepository,
    session::SessionStore,
    settings::ContactSettings,
    utils::clock::Clock,
};

/// Processes contact form submissions end to end.
pub struct ContactHandler {
    pub settings: ContactSettings,
    mailer: Arc<dyn MailTransport>,
    sessions: Arc<dyn SessionStore>,
    log: ContactLog,
    clock: Arc<dyn Clock>,
    archive: Option<Arc<dyn ContactMessageRepository>>,
}

impl ContactHandler {
    pub fn new(
        settings: ContactSettings,
        mailer: Arc<dyn MailTransport>,
        sessions: Arc<dyn SessionStore>,
        log: ContactLog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ContactHandler {
            settings,
            mailer,
            sessions,
            log,
            clock,
            archive: None,
        }
    }

    /// Also store every delivered message in the given repository.
    pub fn with_archive(mut self, archive: Arc<dyn ContactMessageRepository>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Handles one submission. Server-side failures are logged before they are returned.
    pub async fn handle(&self, request: ContactRequest) -> Result<ContactReply, ContactError> {
        if request.method != Method::POST {
            return Err(ContactError::MethodNotAllowed);
        }

        match self.process(&request).await {
            Ok(reply) => Ok(reply),
            Err(e) if e.is_server_error() => {
                self.log.error(&format!("Error: {}", e)).await;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn process(&self, request: &ContactRequest) -> Result<ContactReply, ContactError> {
        let submission = ContactSubmission::sanitize(&request.form);
        submission.validate().map_err(ContactError::ValidationFailed)?;

        self.enforce_cooldown(&request.session_id).await?;

        self.log.info(&format!(
            "New contact message from: {} ({})",
            submission.name, submission.email
        )).await;

        let mail = self.compose(&submission, request);
        if !self.mailer.send(&mail).await {
            return Err(ContactError::MailSendFailed);
        }

        self.log.info(&format!(
            "Email sent successfully to: {}",
            self.settings.recipient_email
        )).await;

        self.archive_message(&submission, request).await;

        if request.is_ajax() {
            Ok(ContactReply::Json(ContactResponse::success(MSG_SENT)))
        } else {
            Ok(ContactReply::Redirect(success_redirect(&self.settings.redirect_url)))
        }
    }

    /// Rejects the request if this session submitted within the cooldown window,
    /// otherwise records the current time as the latest submission.
    async fn enforce_cooldown(&self, session_id: &str) -> Result<(), ContactError> {
        let now = self.clock.now().timestamp();
        let last = self.sessions
            .get(session_id, LAST_SUBMISSION_KEY)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);

        let elapsed = now - last;
        if elapsed < self.settings.cooldown_secs {
            let retry_after = (self.settings.cooldown_secs - elapsed).max(1) as u64;
            tracing::debug!(session_id, retry_after, "Contact submission rate limited");
            return Err(ContactError::RateLimited { retry_after });
        }

        self.sessions
            .set(session_id, LAST_SUBMISSION_KEY, &now.to_string())
            .await?;

        Ok(())
    }

    fn compose(&self, submission: &ContactSubmission, request: &ContactRequest) -> OutgoingMail {
        let body = submission.email_body(
            &self.clock.now(),
            request.client_ip_or_unknown(),
            request.user_agent_or_unknown(),
        );

        OutgoingMail {
            to: self.settings.recipient_email.clone(),
            subject: format!("{}{}", self.settings.subject_prefix, submission.subject),
            body,
            headers: MailHeaders {
                from: submission.email.clone(),
                reply_to: submission.email.clone(),
                x_mailer: self.settings.mailer_tag.clone(),
            },
        }
    }

    async fn archive_message(&self, submission: &ContactSubmission, request: &ContactRequest) {
        let Some(repo) = &self.archive else {
            return;
        };

        let record = NewContactMessage::from_submission(
            submission,
            request.client_ip_or_unknown(),
            self.clock.now(),
        );

        if let Err(e) = repo.save_contact_message(&record).await {
            self.log.error(&format!("Database error: {}", e)).await;
        }
    }
}
