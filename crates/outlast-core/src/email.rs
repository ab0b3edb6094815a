//! Transactional email seam
//!
//! Delivery is an external collaborator. The services compose the message
//! parameters; an implementation of `Mailer` carries them out of process.

/// Outbound transactional email
pub trait Mailer: Send + Sync {
    /// Send the address-confirmation email for a fresh signup
    fn send_verification(&self, recipient: &str, token: &str);

    /// Send the password reset email
    fn send_password_reset(&self, recipient: &str, token: &str);
}

/// Records outbound messages in the log stream. Used wherever a real
/// transport is not wired in (tests, local development).
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_verification(&self, recipient: &str, token: &str) {
        tracing::info!(recipient, token, "Verification email queued");
    }

    fn send_password_reset(&self, recipient: &str, token: &str) {
        tracing::info!(recipient, token, "Password reset email queued");
    }
}
