//! Outbound email transport (§6, §10.1). Mirrors [`super::push::PushClient`]:
//! missing SMTP credentials make this a log-and-succeed no-op rather than a
//! startup failure, so local/dev environments never need a mail server.

use crate::config::EmailConfig;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

#[derive(Clone)]
pub struct EmailClient {
    config: EmailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailClient {
    pub fn new(config: EmailConfig) -> Self {
        let transport = config.smtp_host.as_ref().map(|host| {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .expect("valid SMTP host")
                .port(config.smtp_port);
            if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder = builder
                    .credentials(Credentials::new(username.clone(), password.clone()));
            }
            builder.build()
        });

        Self { config, transport }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Sends `body` as plain text to `to`. Logs and returns successfully
    /// when SMTP isn't configured (§6 "email falls back to log-and-succeed").
    pub async fn send(&self, to: &str, subject: &str, body: &str) {
        let Some(transport) = &self.transport else {
            info!(%to, subject, "SMTP not configured, logging email instead of sending");
            return;
        };

        let message = match Message::builder()
            .from(self.config.from_address.parse().unwrap_or_else(|_| {
                "noreply@example.com".parse().expect("valid fallback address")
            }))
            .to(match to.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    warn!(%to, error = %err, "invalid recipient address");
                    return;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
        {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "failed to build email message");
                return;
            }
        };

        if let Err(err) = transport.send(message).await {
            warn!(%to, error = %err, "email delivery failed");
        }
    }
}
