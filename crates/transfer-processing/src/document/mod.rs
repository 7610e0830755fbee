//! PDF document rendering

mod layout;
pub mod logo;
pub mod metrics;
pub mod renderer;
pub mod text;

pub use logo::LogoImage;
pub use renderer::{DocumentRenderer, RenderError};
