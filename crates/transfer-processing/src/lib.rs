//! Transfer Processing Library
//!
//! Renders a transfer request into a paginated PDF document.

pub mod document;

pub use document::{DocumentRenderer, LogoImage, RenderError};
