//! Mailer that only logs, used when no SMTP server is configured.

use super::{Mailer, OutgoingEmail};

#[derive(Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    pub fn new() -> Self {
        Self
    }
}

impl Mailer for ConsoleMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), String> {
        log::info!(
            "[console mailer] to: {} | subject: {}\n{}",
            email.to,
            email.subject,
            email.text
        );
        Ok(())
    }
}
