//! E-mail notifications
//!
//! This module turns a rendered transfer request into a multipart message and hands
//! it to a [`MailTransport`].

pub mod body;
pub mod dispatcher;
pub mod message;
pub mod transport;

pub use body::{EmailLogo, HtmlBody};
pub use dispatcher::{DeliveryError, Notification, NotificationDispatcher};
pub use transport::{MailTransport, SmtpMailTransport};
