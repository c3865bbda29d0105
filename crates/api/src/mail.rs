//! Account emails sent over SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport. Configuration comes
//! from the environment; when `SMTP_HOST` is unset [`EmailConfig::from_env`]
//! returns `None` and registration skips the welcome email.

use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use spookify_core::types::DbId;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "Spookify <no-reply@spookify.local>";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables, or `None` when
    /// `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default                               |
    /// |-----------------|----------|---------------------------------------|
    /// | `SMTP_HOST`     | yes      |                                       |
    /// | `SMTP_PORT`     | no       | `587`                                 |
    /// | `SMTP_FROM`     | no       | `Spookify <no-reply@spookify.local>`  |
    /// | `SMTP_USER`     | no       |                                       |
    /// | `SMTP_PASSWORD` | no       |                                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Assemble the welcome email carrying the activation token.
    pub fn activation_message(
        &self,
        to_email: &str,
        name: &str,
        user_id: DbId,
        token: &str,
    ) -> Result<Message, EmailError> {
        let body = format!(
            "Hi {name},\n\n\
             Thanks for signing up for a Spookify account. Your user ID is {user_id}.\n\n\
             To activate your account, send a PUT request to /v1/users/activated with\n\
             the following body:\n\n\
             {{\"token\": \"{token}\"}}\n\n\
             This token is valid for a limited time and can only be used once.\n\n\
             Thanks,\n\
             The Spookify Team\n"
        );

        Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("Welcome to Spookify!")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Send the activation email.
    pub async fn send_activation(
        &self,
        to_email: &str,
        name: &str,
        user_id: DbId,
        token: &str,
    ) -> Result<(), EmailError> {
        let email = self.activation_message(to_email, name, user_id, token)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        transport_builder.build().send(email).await?;

        tracing::info!(to = to_email, user_id, "Activation email sent");
        Ok(())
    }
}

/// Send the activation email in a background task. Failures are logged and
/// never reach the caller.
pub fn spawn_activation_email(
    mailer: Arc<Mailer>,
    to_email: String,
    name: String,
    user_id: DbId,
    token: String,
) {
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_activation(&to_email, &name, user_id, &token)
            .await
        {
            tracing::error!(error = %e, user_id, "Failed to send activation email");
        }
    });
}
