//! # bazaar-notify
//!
//! **Notification Dispatcher** for the Bazaar core.
//!
//! The escrow engine hands every state-change notification to a
//! [`NotificationSink`] after the transition has committed. The sink never
//! reports back: delivery is best-effort and its failures stay inside this
//! crate.
//!
//! ```text
//! engine ──notify()──▶ Dispatcher ──mpsc──▶ worker ──┬─▶ task ─▶ Transport::deliver(buyer)
//!                                                    ├─▶ task ─▶ Transport::deliver(seller)
//!                                                    └─▶ task ─▶ Transport::deliver(operator)
//! ```
//!
//! Each recipient is delivered on its own task with its own timeout, so a
//! slow or failing recipient never holds up another.

pub mod dispatcher;
pub mod error;
pub mod sink;

pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::NotifyError;
pub use sink::{NotificationSink, Transport};

#[cfg(any(test, feature = "test-helpers"))]
pub use sink::RecordingSink;
