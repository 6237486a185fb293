//! Route handlers, one module per API area.

pub mod auth;
pub mod dashboard;
pub mod hierarchy;
pub mod payment;
pub mod profile;
pub mod timeline;
pub mod uploads;
pub mod verification;
