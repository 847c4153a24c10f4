use async_trait::async_trait;
use compclub_volunteering::notifier::{Mailer, StatusEmail};
use compclub_volunteering::TransportError;
use tracing::info;

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_mass(&self, emails: &[StatusEmail]) -> Result<(), TransportError> {
        for email in emails {
            info!(
                from = %email.from,
                to = ?email.recipients,
                subject = %email.subject,
                "{}",
                email.body
            );
        }
        Ok(())
    }
}
