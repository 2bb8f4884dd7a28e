//! Email notification delivery via SMTP.
//!
//! Configuration comes from the environment; without `SMTP_HOST`,
//! [`EmailConfig::from_env`] returns `Ok(None)` and no mailer is built.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::bus::PlatformEvent;
use crate::delivery::message;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Invalid {var}: {reason}")]
    Config { var: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@helpdesk.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | -                         |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@helpdesk.local`  |
    /// | `SMTP_USER`     | no       | -                         |
    /// | `SMTP_PASSWORD` | no       | -                         |
    ///
    /// Returns `Ok(None)` when `SMTP_HOST` is unset and an error when a set
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Option<Self>, EmailError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, EmailError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let Some(smtp_host) = var("SMTP_HOST") else {
            return Ok(None);
        };
        let smtp_port = match var("SMTP_PORT") {
            Some(raw) => raw.parse().map_err(|_| EmailError::Config {
                var: "SMTP_PORT",
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            from_address: var("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: var("SMTP_USER"),
            smtp_password: var("SMTP_PASSWORD"),
        }))
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends ticket notification emails over a pooled SMTP transport.
pub struct EmailDelivery {
    from_address: lettre::message::Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the transport. Fails if the sender address or relay host is
    /// invalid; no connection is attempted here.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let from_address = config.from_address.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            from_address,
            mailer: builder.build(),
        })
    }

    /// Send the rendered notification for `event` to `to_email`.
    pub async fn deliver(&self, to_email: &str, event: &PlatformEvent) -> Result<(), EmailError> {
        let rendered = message::render(event);

        let email = Message::builder()
            .from(self.from_address.clone())
            .to(to_email.parse()?)
            .subject(rendered.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(rendered.body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(email).await?;

        tracing::info!(to = to_email, event_type = %event.event_type, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(from: &str) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 2525,
            from_address: from.to_string(),
            smtp_user: None,
            smtp_password: None,
        }
    }

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn missing_host_disables_email() {
        let config = EmailConfig::from_vars(vars(&[("SMTP_PORT", "25")])).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn port_defaults_when_unset() {
        let config = EmailConfig::from_vars(vars(&[("SMTP_HOST", "smtp.example.com")]))
            .unwrap()
            .unwrap();
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.from_address, "noreply@helpdesk.local");
    }

    #[test]
    fn unparseable_port_is_an_error() {
        let result = EmailConfig::from_vars(vars(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "twenty-five"),
        ]));
        assert!(matches!(
            result,
            Err(EmailError::Config { var: "SMTP_PORT", .. })
        ));
    }

    #[test]
    fn new_rejects_bad_sender() {
        let result = EmailDelivery::new(config("not-an-email"));
        assert!(matches!(result, Err(EmailError::Address(_))));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
