//! Client state management
//!
//! Each slice is a plain state struct with a pure `reduce` and a store that
//! owns it behind a tokio `RwLock`. Async operations dispatch a pending
//! action, call the gateway, then dispatch the outcome.

pub mod dashboard;
pub mod emails;
pub mod notifications;
pub mod notify;
pub mod request;
mod root;
pub mod settings;

pub use dashboard::{DashboardAction, DashboardState, DashboardStore};
pub use emails::{EmailStore, EmailsAction, EmailsState, PageRequest, PaginationCursor};
pub use notifications::{NotificationStore, NotificationsAction, NotificationsState};
pub use notify::{Notifier, Slice, StateChanged};
pub use request::RequestId;
pub use root::{AppAction, AppStore, RootState};
pub use settings::{SettingsAction, SettingsState, SettingsStore};

use crate::error::ApiError;

/// Error text recorded on a rejected operation, falling back to the
/// operation's default when the failure carried no usable message.
pub(crate) fn rejection_message(err: &ApiError, default: &str) -> String {
    if err.message.trim().is_empty() {
        default.to_string()
    } else {
        err.message.clone()
    }
}
