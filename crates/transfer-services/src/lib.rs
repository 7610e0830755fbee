//! Transfer Services Layer
//!
//! Outbound notifications: the HTML summary body, MIME message assembly and SMTP
//! delivery. The HTTP crate depends on this facade and never on lettre directly.

pub mod email;

pub use email::{
    DeliveryError, EmailLogo, HtmlBody, MailTransport, Notification, NotificationDispatcher,
    SmtpMailTransport,
};
