pub mod access;
pub mod security_headers;

pub use access::access_key_middleware;
pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
