//! Change-notification infrastructure for the contract store.
//!
//! - [`ChangeNotifier`] — synchronous observer registry with per-callback
//!   panic isolation.
//! - [`SubscriberId`] — unsubscribe handle returned by
//!   [`ChangeNotifier::subscribe`].

pub mod notifier;

pub use notifier::{ChangeNotifier, SubscriberId};
