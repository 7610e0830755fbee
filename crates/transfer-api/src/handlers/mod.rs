pub mod attachments;
pub mod document;
pub mod fields;
pub mod health;
pub mod preview;
pub mod session;
pub mod submit;
