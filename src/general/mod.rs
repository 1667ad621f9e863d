//! Terminal front-end: status banners and the command loop.

pub mod check;
pub mod stdin_handler;

pub use stdin_handler::{DeviceLister, Flow, Session};
