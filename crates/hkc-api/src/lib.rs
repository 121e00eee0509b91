// hkc-api: Async Rust client for the HKC alarm panel cloud API

pub mod auth;
pub mod client;
mod commands;
pub mod error;
pub mod models;
mod panel;
pub mod transport;

pub use auth::PanelCredentials;
pub use client::{DEFAULT_BASE_URL, HkcClient};
pub use error::Error;
pub use models::{Block, Input, PanelData, SystemStatus};
pub use transport::{TlsMode, TransportConfig};
