//! Signboard notice bus.
//!
//! - [`NoticeBus`] -- in-process publish/subscribe hub for transient
//!   user-visible notices, backed by `tokio::sync::broadcast`.
//! - [`Notice`] -- the notice envelope.
//! - [`NoticeLog`] -- background subscriber that writes notices to `tracing`.

pub mod bus;
pub mod log;

pub use bus::{Notice, NoticeBus, NoticeLevel, NOTICE_TIMER};
pub use log::NoticeLog;
