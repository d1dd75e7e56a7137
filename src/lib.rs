use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{db, logging, mail, session, utils};

use logging::contact_log::{ContactLog, FileLogSink, LogSink};
use mail::{LettreMailTransport, MailTransport, MailerConfig};
use repositories::{contact_message::ContactMessageRepository, sqlx_repo::SqlxContactMessageRepo};
use session::SessionBackend;
use use_cases::contact::ContactHandler;
use utils::clock::{Clock, SystemClock};

pub struct AppState {
    pub contact_handler: ContactHandler,
    pub sessions: SessionBackend,
    pub contact_repo: Option<Arc<dyn ContactMessageRepository>>,
    pub trust_x_forwarded_for: bool,
}

impl AppState {
    /// Wires the production collaborators: lettre transport, configured session
    /// backend, file contact log and, when a pool is given, the message archive.
    pub fn new(config: &settings::AppConfig, pool: Option<sqlx::PgPool>) -> anyhow::Result<Self> {
        let mailer = LettreMailTransport::new(&MailerConfig::from(config))?;
        let sessions = SessionBackend::from_config(config)?;
        let log_sink = Arc::new(FileLogSink::new(&config.contact_log_path));
        let contact_repo = pool.map(|pool| {
            Arc::new(SqlxContactMessageRepo::new(pool)) as Arc<dyn ContactMessageRepository>
        });

        Ok(Self::with_collaborators(
            config,
            Arc::new(mailer),
            sessions,
            log_sink,
            Arc::new(SystemClock),
            contact_repo,
        ))
    }

    pub fn with_collaborators(
        config: &settings::AppConfig,
        mailer: Arc<dyn MailTransport>,
        sessions: SessionBackend,
        log_sink: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
        contact_repo: Option<Arc<dyn ContactMessageRepository>>,
    ) -> Self {
        let log = ContactLog::new(log_sink, clock.clone());
        let mut contact_handler = ContactHandler::new(
            config.contact_settings(),
            mailer,
            sessions.store(),
            log,
            clock,
        );
        if let Some(repo) = &contact_repo {
            contact_handler = contact_handler.with_archive(repo.clone());
        }

        AppState {
            contact_handler,
            sessions,
            contact_repo,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
        }
    }
}
