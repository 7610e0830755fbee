pub mod submission;
pub mod session_cleanup;
