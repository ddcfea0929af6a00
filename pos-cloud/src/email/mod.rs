//! Outgoing mail
//!
//! Handlers build an [`OutgoingEmail`] from one of the [`templates`] and hand
//! it to the configured [`Mailer`]. Production uses SES; `MAIL_TRANSPORT=memory`
//! keeps messages in process.

pub mod mime;
pub mod templates;

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message, RawMessage};
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid message: {0}")]
    Build(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn pdf(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf".into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingEmail {
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.bcc.len()
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// AWS SES v2 transport
pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub async fn from_env(from: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };
        Self { client, from }
    }

    fn destination(email: &OutgoingEmail) -> Destination {
        Destination::builder()
            .set_to_addresses(Some(email.to.clone()).filter(|v| !v.is_empty()))
            .set_bcc_addresses(Some(email.bcc.clone()).filter(|v| !v.is_empty()))
            .build()
    }

    fn simple_content(email: &OutgoingEmail) -> Result<EmailContent, MailError> {
        let build = |e: aws_sdk_sesv2::error::BuildError| MailError::Build(e.to_string());
        let subject = Content::builder()
            .data(&email.subject)
            .charset("UTF-8")
            .build()
            .map_err(build)?;
        let body = Body::builder()
            .text(
                Content::builder()
                    .data(&email.text)
                    .charset("UTF-8")
                    .build()
                    .map_err(build)?,
            )
            .build();
        let message = Message::builder().subject(subject).body(body).build();
        Ok(EmailContent::builder().simple(message).build())
    }

    fn raw_content(&self, email: &OutgoingEmail) -> Result<EmailContent, MailError> {
        let boundary = format!("=_pos_{}", uuid::Uuid::new_v4().simple());
        let raw = mime::build_raw_message(&self.from, email, &boundary);
        let message = RawMessage::builder()
            .data(Blob::new(raw.into_bytes()))
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;
        Ok(EmailContent::builder().raw(message).build())
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if email.recipient_count() == 0 {
            return Err(MailError::Build("no recipients".into()));
        }

        let content = if email.attachments.is_empty() {
            Self::simple_content(&email)?
        } else {
            self.raw_content(&email)?
        };

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Self::destination(&email))
            .content(content)
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        tracing::info!(
            recipients = email.recipient_count(),
            subject = %email.subject,
            "Email sent"
        );
        Ok(())
    }
}

/// In-process transport: keeps every message and logs it.
///
/// `failing()` builds one that rejects every message.
#[derive(Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Delivery("memory transport set to fail".into()));
        }
        tracing::info!(
            to = ?email.to,
            bcc = email.bcc.len(),
            subject = %email.subject,
            attachments = email.attachments.len(),
            "Email kept in memory"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_mailer_records() {
        let mailer = MemoryMailer::new();
        mailer
            .send(OutgoingEmail {
                to: vec!["guest@example.com".into()],
                subject: "Hi".into(),
                text: "Hello".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].subject, "Hi");
    }

    #[tokio::test]
    async fn failing_mailer_rejects() {
        let mailer = MemoryMailer::failing();
        let err = mailer.send(OutgoingEmail::default()).await.unwrap_err();
        assert!(matches!(err, MailError::Delivery(_)));
        assert!(mailer.sent().is_empty());
    }
}
