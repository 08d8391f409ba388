//! Mail module
//!
//! Best-effort SMTP notifications, detached from the request lifecycle.

mod smtp_mailer;

pub use smtp_mailer::Mailer;
