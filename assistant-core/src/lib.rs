//! Email Assistant - client data synchronization core
//!
//! Holds the client-side state of the email assistant and keeps it in sync
//! with the remote service. A host shell (mobile or desktop) owns one
//! `AppStore`, dispatches actions into it and re-reads the state tree when a
//! `StateChanged` event arrives.
//!
//! ## Module Organization
//!
//! - `state/`: Entity stores and the root store
//! - `gateway/`: Remote API seam and fallback policy
//! - `adapters/`: HTTP implementation of the gateway
//! - `types/`: Data structures and types
//! - `config/`: Configuration management
//! - `credentials/`: Secure bearer token storage

pub mod adapters;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod state;
pub mod types;

use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{ApiError, AppError};
pub use gateway::{AssistantApi, FallbackMode, ResilientApi};
pub use state::{AppAction, AppStore, RootState, Slice, StateChanged};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. A subscriber that is already installed is
/// left in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            // Debug build: show debug logs for our crate, info for others
            EnvFilter::new("email_assistant_lib=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
