//!
//! # Mail collaborator
//!
//! Sends the verification and password-reset mails. The transport is built
//! once at startup from `MailConfig`; handlers clone the `Mailer` handle and
//! spawn the send so the HTTP response never waits on SMTP. Delivery failures
//! are logged, never surfaced to the client.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    base_url: String,
}

impl Mailer {
    /// Builds the SMTP transport (STARTTLS). Fails fast at startup on a bad
    /// server name or malformed from-address rather than on first send.
    pub fn from_config(config: &MailConfig) -> Result<Self, AppError> {
        let from = config
            .username
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| AppError::Internal(format!("invalid SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            base_url: config.public_base_url.clone(),
        })
    }

    /// Link for the verification mail. Must match the mounted route exactly;
    /// actix does not normalize a trailing slash away.
    fn verification_link(&self, token: &str) -> String {
        format!("{}/api/v1/users/verification?token={}", self.base_url, token)
    }

    /// Sends the account-verification mail carrying the given token.
    pub async fn send_verification(&self, email: &str, token: &str) -> Result<(), AppError> {
        let link = self.verification_link(token);
        let body = format!(
            "<h3>Account Verification</h3>\
             <p>Thanks for registering, please click on the link below to verify your account.</p>\
             <p><a href=\"{}\">Verify your email</a></p>\
             <p>If you did not register for the ToDo List, please kindly ignore this email \
             and nothing will happen. Thanks.</p>",
            link
        );
        self.send(email, "ToDo List verification.", body).await
    }

    /// Sends the password-reset mail carrying the given token.
    pub async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), AppError> {
        let body = format!(
            "<h3>Reset password</h3>\
             <p>Use the token below to set a new password. It expires shortly.</p>\
             <p><code>{}</code></p>\
             <p>If you did not request a password reset, please ignore this email.</p>",
            token
        );
        self.send(email, "Reset password.", body).await
    }

    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), AppError> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::Internal(format!("failed to build mail: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("failed to send mail: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: &str) -> MailConfig {
        MailConfig {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: username.to_string(),
            password: "mailpass".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }

    #[test]
    fn test_mailer_builds_from_valid_config() {
        assert!(Mailer::from_config(&config("todo@example.com")).is_ok());
    }

    #[test]
    fn test_verification_link_matches_mounted_route() {
        let mailer = Mailer::from_config(&config("todo@example.com")).unwrap();
        // No slash before the query string: the route is /users/verification.
        assert_eq!(
            mailer.verification_link("abc.def.ghi"),
            "http://localhost:8080/api/v1/users/verification?token=abc.def.ghi"
        );
    }

    #[test]
    fn test_mailer_rejects_malformed_sender() {
        let result = Mailer::from_config(&config("not an address"));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
