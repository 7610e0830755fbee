//! MIME assembly

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;

use super::dispatcher::DeliveryError;

/// MIME type of an uploaded file, by lower-cased extension.
pub fn attachment_content_type(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

pub(crate) fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| DeliveryError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn content_type(value: &str) -> Result<ContentType, DeliveryError> {
    ContentType::parse(value).map_err(|e| DeliveryError::Build(e.to_string()))
}

/// One file part of the message.
pub(crate) struct FilePart {
    pub name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

pub(crate) struct Envelope<'a> {
    pub from: Mailbox,
    pub to: Mailbox,
    pub cc: Option<Mailbox>,
    pub subject: &'a str,
    pub html_body: &'a str,
}

/// multipart/mixed: the HTML body first, then every file in order.
pub(crate) fn build_message(
    envelope: Envelope<'_>,
    files: Vec<FilePart>,
) -> Result<Message, DeliveryError> {
    let mut builder = Message::builder()
        .from(envelope.from)
        .to(envelope.to)
        .subject(envelope.subject);
    if let Some(cc) = envelope.cc {
        builder = builder.cc(cc);
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::html(envelope.html_body.to_string()));
    for file in files {
        let attachment = Attachment::new(file.name).body(file.data, content_type(file.content_type)?);
        parts = parts.singlepart(attachment);
    }

    builder
        .multipart(parts)
        .map_err(|e| DeliveryError::Build(e.to_string()))
}
