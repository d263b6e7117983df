//! Notification channels and the fan-out dispatcher.
//!
//! This crate provides:
//! - The `NotificationChannel` trait, the seam to the external message
//!   gateway
//! - A reqwest-based gateway client implementation
//! - The dispatcher that fans one alert out to N recipients with
//!   per-recipient timeouts and failure isolation

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod gateway;

pub use channel::NotificationChannel;
pub use dispatcher::{DispatchConfig, Dispatcher};
pub use error::{NotifyError, NotifyResult};
pub use gateway::{GatewayClient, GatewayHealth};
