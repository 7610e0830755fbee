//! Notification dispatcher

use std::path::PathBuf;
use std::sync::Arc;
use transfer_core::{AppError, UploadedFile};

use super::message::{attachment_content_type, build_message, parse_mailbox, Envelope, FilePart};
use super::transport::MailTransport;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("could not read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not build message: {0}")]
    Build(String),

    #[error("{0}")]
    Transport(String),
}

impl DeliveryError {
    /// Client-facing error that points the user at a human contact.
    pub fn into_app_error(self, fallback_contact: &str) -> AppError {
        AppError::Delivery {
            cause: self.to_string(),
            fallback_contact: fallback_contact.to_string(),
        }
    }
}

/// One outbound message: the rendered document plus the uploaded files.
#[derive(Debug, Clone)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub document_path: PathBuf,
    pub attachments: Vec<UploadedFile>,
    pub cc: Option<String>,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    sender: String,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, sender: impl Into<String>) -> Self {
        Self {
            transport,
            sender: sender.into(),
        }
    }

    /// Build and deliver one message. Nothing is sent if any part cannot be prepared.
    pub async fn send(&self, notification: Notification) -> Result<(), DeliveryError> {
        let from = parse_mailbox(&self.sender)?;
        let to = parse_mailbox(&notification.recipient)?;
        let cc = notification.cc.as_deref().map(parse_mailbox).transpose()?;

        let document = tokio::fs::read(&notification.document_path)
            .await
            .map_err(|source| DeliveryError::Attachment {
                path: notification.document_path.clone(),
                source,
            })?;
        let document_name = notification
            .document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let mut files = Vec::with_capacity(notification.attachments.len() + 1);
        files.push(FilePart {
            name: document_name,
            content_type: attachment_content_type("pdf"),
            data: document,
        });
        for file in &notification.attachments {
            files.push(FilePart {
                name: file.name().to_string(),
                content_type: attachment_content_type(&file.extension()),
                data: file.data().to_vec(),
            });
        }

        let message = build_message(
            Envelope {
                from,
                to,
                cc,
                subject: &notification.subject,
                html_body: &notification.html_body,
            },
            files,
        )?;

        self.transport.send(message).await?;

        tracing::info!(
            recipient = %notification.recipient,
            cc = notification.cc.as_deref().unwrap_or(""),
            subject = %notification.subject,
            attachments = notification.attachments.len(),
            "Notification sent"
        );
        Ok(())
    }
}
