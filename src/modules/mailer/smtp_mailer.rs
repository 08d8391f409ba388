//! Fire-and-forget SMTP notifications.
//!
//! Sends run on detached tasks: a slow or failing relay never blocks or fails
//! the calling request. Failures are logged and dropped. With no SMTP host
//! configured the mailer is disabled and sends are skipped with a log line.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use crate::core::config::SmtpConfig;

pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Self {
        let (Some(host), Some(from_addr)) = (&config.host, &config.from) else {
            info!("Mailer disabled (SMTP host or sender address not configured)");
            return Self {
                transport: None,
                from: None,
            };
        };

        let from = match from_addr.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("Invalid SMTP_FROM address '{}': {}. Mailer disabled.", from_addr, e);
                return Self {
                    transport: None,
                    from: None,
                };
            }
        };

        let builder = match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
            Ok(builder) => builder,
            Err(e) => {
                warn!("Failed to configure SMTP relay '{}': {}. Mailer disabled.", host, e);
                return Self {
                    transport: None,
                    from: None,
                };
            }
        };

        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => builder
                .credentials(Credentials::new(user.clone(), pass.clone()))
                .build(),
            _ => builder.build(),
        };

        info!("Mailer initialized for relay: {}", host);
        Self {
            transport: Some(transport),
            from: Some(from),
        }
    }

    /// Construct a disabled mailer (used in tests)
    #[allow(dead_code)]
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Queue a notification on a detached task. Never blocks the caller and
    /// never reports failure to it; delivery errors are logged and dropped.
    pub fn send_best_effort(&self, to: &str, subject: &str, body: String) {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            debug!("Mail disabled, skipping notification '{}' to {}", subject, to);
            return;
        };

        let mailbox: Mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("Skipping notification to invalid address '{}': {}", to, e);
                return;
            }
        };

        let message = match Message::builder()
            .from(from.clone())
            .to(mailbox)
            .subject(subject)
            .body(body)
        {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to build notification '{}': {}", subject, e);
                return;
            }
        };

        let transport = transport.clone();
        let subject = subject.to_string();
        let to = to.to_string();
        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => debug!("Notification '{}' sent to {}", subject, to),
                Err(e) => warn!("Failed to send notification '{}' to {}: {}", subject, to, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SmtpConfig;

    #[test]
    fn test_disabled_without_host() {
        let mailer = Mailer::new(&SmtpConfig {
            host: None,
            username: None,
            password: None,
            from: Some("edms@example.com".to_string()),
        });
        assert!(!mailer.is_enabled());
    }

    #[test]
    fn test_disabled_with_bad_from_address() {
        let mailer = Mailer::new(&SmtpConfig {
            host: Some("smtp.example.com".to_string()),
            username: None,
            password: None,
            from: Some("not an address".to_string()),
        });
        assert!(!mailer.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_send_is_a_quiet_no_op() {
        let mailer = Mailer::disabled();
        mailer.send_best_effort("user@example.com", "Welcome", "hello".to_string());
    }
}
