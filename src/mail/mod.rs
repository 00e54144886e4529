//! Transactional email: account confirmation and password reset.

pub mod console;
pub mod smtp;

pub use console::ConsoleMailer;
pub use smtp::{SmtpConfig, SmtpMailer};

use std::sync::Arc;

/// A fully rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Trait for delivering rendered emails
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<(), String>;
}

/// Recipient and code of an account email.
#[derive(Debug, Clone)]
pub struct AuthEmail<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub token: &'a str,
}

impl AuthEmail<'_> {
    pub fn confirmation(&self, frontend_url: &str, ttl_minutes: i64) -> OutgoingEmail {
        let link = format!("{}/auth/confirm-account", frontend_url.trim_end_matches('/'));
        OutgoingEmail {
            to: self.email.to_string(),
            subject: "UpTask - Confirm your account".to_string(),
            text: format!(
                "Hi {}, confirm your account at {} using the code {}.\n\
                 This code expires in {} minutes.",
                self.name, link, self.token, ttl_minutes
            ),
            html: render_html(
                &format!("Welcome to UpTask, {}!", self.name),
                "You have created your UpTask account. Confirm it to start using it.",
                &link,
                "Confirm account",
                self.token,
                ttl_minutes,
            ),
        }
    }

    pub fn password_reset(&self, frontend_url: &str, ttl_minutes: i64) -> OutgoingEmail {
        let link = format!("{}/auth/new-password", frontend_url.trim_end_matches('/'));
        OutgoingEmail {
            to: self.email.to_string(),
            subject: "UpTask - Reset your password".to_string(),
            text: format!(
                "Hi {}, you asked to reset your password. Visit {} and enter the code {}.\n\
                 This code expires in {} minutes.",
                self.name, link, self.token, ttl_minutes
            ),
            html: render_html(
                &format!("Here is your recovery code, {}", self.name),
                "To recover your account, visit the link below.",
                &link,
                "Reset password",
                self.token,
                ttl_minutes,
            ),
        }
    }
}

/// Escapes text for interpolation into HTML element content or attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_html(
    heading: &str,
    intro: &str,
    link: &str,
    action: &str,
    token: &str,
    ttl_minutes: i64,
) -> String {
    let heading = escape_html(heading);
    let link = escape_html(link);
    format!(
        r#"<div style="font-family: Arial, sans-serif; color: #333; background-color: #f4f4f4; padding: 20px; border-radius: 8px;">
  <div style="max-width: 600px; margin: 0 auto; background-color: white; padding: 20px; border-radius: 8px;">
    <h2 style="color: #444; text-align: center;">{heading}</h2>
    <p style="font-size: 16px; line-height: 1.5; color: #555;">{intro}</p>
    <div style="text-align: center; margin: 20px 0;">
      <a href="{link}" style="display: inline-block; padding: 10px 20px; background-color: #4CAF50; color: white; text-decoration: none; font-weight: bold; border-radius: 5px;">{action}</a>
    </div>
    <p style="font-size: 16px; line-height: 1.5; color: #555;">Then enter the following code:</p>
    <div style="text-align: center; font-size: 18px; font-weight: bold; margin: 20px 0;">{token}</div>
    <p style="font-size: 16px; line-height: 1.5; color: #555;"><strong>Note:</strong> this code expires in {ttl_minutes} minutes.</p>
    <p style="text-align: center; color: #999; font-size: 14px; margin-top: 20px;">If you did not request this, you can ignore this message.</p>
  </div>
</div>"#
    )
}

/// Sends `email` on the blocking pool without waiting for the result. Delivery failures
/// are logged and never reach the caller.
pub fn dispatch(mailer: Arc<dyn Mailer>, email: OutgoingEmail) {
    tokio::task::spawn_blocking(move || match mailer.send(&email) {
        Ok(()) => log::info!("Email \"{}\" sent to {}", email.subject, email.to),
        Err(e) => log::error!("Failed to send \"{}\" to {}: {}", email.subject, email.to, e),
    });
}
