//! API constants

/// Versioned path prefix of every session route
pub const API_PREFIX: &str = "/api/v0";

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "transfer-session";

/// Header carrying the shared access key
pub const ACCESS_KEY_HEADER: &str = "x-access-key";

/// Multipart field holding uploaded attachments (`file` is accepted too)
pub const UPLOAD_FIELD: &str = "files";
