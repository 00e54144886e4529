//! SMTP-based mailer for production

use lettre::{
    message::MultiPart, transport::smtp::authentication::Credentials, Message, SmtpTransport,
    Transport,
};

use super::{Mailer, OutgoingEmail};
use crate::config::ConfigError;

/// Configuration for SMTP email sending
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// 465 uses implicit TLS, any other port STARTTLS.
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .finish_non_exhaustive()
    }
}

impl SmtpConfig {
    /// Reads `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM_EMAIL` (all required)
    /// and `SMTP_PORT` (default 465), `SMTP_FROM_NAME` (default "UpTask").
    /// Returns `Ok(None)` if any required variable is missing and an error if the port
    /// does not parse.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        let port = match get_env("SMTP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("SMTP_PORT", raw.clone()))?,
            None => 465,
        };

        let (host, username, password, from_email) = match (
            get_env("SMTP_HOST"),
            get_env("SMTP_USERNAME"),
            get_env("SMTP_PASSWORD"),
            get_env("SMTP_FROM_EMAIL"),
        ) {
            (Some(host), Some(username), Some(password), Some(from_email)) => {
                (host, username, password, from_email)
            }
            _ => return Ok(None),
        };

        Ok(Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            from_name: get_env("SMTP_FROM_NAME").unwrap_or_else(|| "UpTask".to_string()),
        }))
    }

    fn from_address(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, String> {
        let builder = if config.port == 465 {
            SmtpTransport::relay(&config.host)
        } else {
            SmtpTransport::starttls_relay(&config.host)
        }
        .map_err(|e| format!("Failed to create SMTP transport: {}", e))?;

        let from = config.from_address();
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        log::info!("SMTP mailer configured for {}:{}", config.host, config.port);
        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {}", e))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport
            .send(&message)
            .map_err(|e| format!("Failed to send email: {}", e))?;
        Ok(())
    }
}
