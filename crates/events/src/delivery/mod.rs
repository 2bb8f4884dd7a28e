//! Outbound notification channels.
//!
//! [`Delivery`] is chosen once at startup: SMTP email when `SMTP_HOST` is
//! configured, otherwise a log-only sink so notifications remain visible in
//! development.

pub mod email;
pub mod message;

use helpdesk_core::types::DbId;

use crate::bus::PlatformEvent;
use email::{EmailConfig, EmailDelivery, EmailError};

/// A resolved notification target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: DbId,
    pub email: String,
}

pub enum Delivery {
    Email(EmailDelivery),
    Log,
}

impl Delivery {
    /// Build the delivery channel from the environment.
    ///
    /// A present but unusable SMTP configuration is logged and falls back to
    /// the log sink; notifications never stop the server from starting.
    pub fn from_env() -> Self {
        let mailer = EmailConfig::from_env()
            .and_then(|config| config.map(EmailDelivery::new).transpose());
        match mailer {
            Ok(Some(mailer)) => Delivery::Email(mailer),
            Ok(None) => Delivery::Log,
            Err(e) => {
                tracing::error!(error = %e, "Invalid SMTP configuration, logging notifications instead");
                Delivery::Log
            }
        }
    }

    pub async fn deliver(&self, recipient: &Recipient, event: &PlatformEvent) -> Result<(), EmailError> {
        match self {
            Delivery::Email(mailer) => mailer.deliver(&recipient.email, event).await,
            Delivery::Log => {
                let rendered = message::render(event);
                tracing::info!(
                    user_id = recipient.user_id,
                    to = %recipient.email,
                    event_type = %event.event_type,
                    subject = %rendered.subject,
                    "Notification (email delivery not configured)"
                );
                Ok(())
            }
        }
    }
}
