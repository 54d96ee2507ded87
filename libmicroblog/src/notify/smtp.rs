//! SMTP delivery through lettre

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use crate::config::MailConfig;
use crate::error::{NotifyError, Result};
use crate::notify::{Notification, Notifier};

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    base_url: String,
}

impl SmtpNotifier {
    /// Build a notifier from mail settings
    ///
    /// No connection is made until the first delivery.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.server.as_str())
                .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_string(),
            ));
        }

        let from: Mailbox = config.admin.parse().map_err(NotifyError::Address)?;

        Ok(Self {
            transport: builder.build(),
            from,
            base_url: config.base_url.clone(),
        })
    }

    /// Assemble the email for a notification
    pub fn message(&self, notification: &Notification) -> Result<Message> {
        let email = notification.render(&self.base_url)?;
        let to: Mailbox = notification
            .recipient()
            .email
            .parse()
            .map_err(NotifyError::Address)?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.plain_text, email.html))
            .map_err(NotifyError::Message)?;

        Ok(message)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let message = self.message(notification)?;
        self.transport
            .send(message)
            .await
            .map_err(NotifyError::Smtp)?;

        tracing::debug!(
            recipient = %notification.recipient().nickname,
            "Notification mail sent"
        );
        Ok(())
    }
}
