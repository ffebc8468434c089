use crate::domain::auth::AuthService;
use crate::domain::base::Repository;
use crate::domain::mailer::Mailer;
use crate::domain::password::PasswordHashingService;
use crate::domain::todos::Todo;
use crate::domain::users::User;
use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::config::{AppConfig, MailConfig};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::mailer::{LogMailer, SmtpMailer};
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::repositories::memory::InMemoryRepository;
use crate::infrastructure::repositories::postgres::PostgresRepository;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: Arc<dyn AuthService>,
    pub password_service: Arc<dyn PasswordHashingService>,
    pub mailer: Arc<dyn Mailer>,
    pub todos: Arc<dyn Repository<Todo>>,
    pub users: Arc<dyn Repository<User>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        todos: Arc<dyn Repository<Todo>>,
        users: Arc<dyn Repository<User>>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            auth_service: Arc::new(JwtAuthService::new(&config.jwt)),
            password_service: Arc::new(PasswordService::new()),
            config: Arc::new(config),
            mailer,
            todos,
            users,
        }
    }

    /// State backed by Postgres, with SMTP delivery when a host is configured.
    pub fn postgres(config: AppConfig, pool: DbPool) -> anyhow::Result<Self> {
        let mailer = mailer_from_config(&config.mail)?;

        Ok(Self::new(
            config,
            Arc::new(PostgresRepository::<Todo>::new(pool.clone())),
            Arc::new(PostgresRepository::<User>::new(pool)),
            mailer,
        ))
    }

    /// State keeping every record in memory.
    pub fn in_memory(config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRepository::<Todo>::new()),
            Arc::new(InMemoryRepository::<User>::new()),
            mailer,
        )
    }
}

pub fn mailer_from_config(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.smtp_host.is_some() {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        tracing::warn!("SMTP_HOST is not set, outgoing mail will only be logged");
        Ok(Arc::new(LogMailer))
    }
}
