//! Managers for dispatching backups, notifications, and logging

pub mod dispatch;
pub mod logging;
pub mod notification;
