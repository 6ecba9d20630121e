//! Outbound email adapter.
//!
//! Delivery is fire-and-forget: callers spawn the send and a failure is
//! logged, never propagated — a failed mail does not undo the token that
//! was issued for it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Errors from the mail transport.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// Outbound email sender.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the signup email-verification message.
    async fn send_verification_email(
        &self,
        to: &str,
        username: &str,
        verify_url: &str,
    ) -> Result<(), MailError>;

    /// Send a classroom invitation message.
    async fn send_invite_email(
        &self,
        to: &str,
        classroom_name: &str,
        invited_by: &str,
        invite_url: &str,
    ) -> Result<(), MailError>;
}

/// Mailer that records sends in the log instead of delivering them.
///
/// Default transport for development and tests; deployments wire a real
/// SMTP-backed implementation of [`Mailer`] here.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        username: &str,
        verify_url: &str,
    ) -> Result<(), MailError> {
        info!(to, username, verify_url, "verification email (log transport)");
        Ok(())
    }

    async fn send_invite_email(
        &self,
        to: &str,
        classroom_name: &str,
        invited_by: &str,
        invite_url: &str,
    ) -> Result<(), MailError> {
        info!(
            to,
            classroom_name, invited_by, invite_url, "classroom invite email (log transport)"
        );
        Ok(())
    }
}
