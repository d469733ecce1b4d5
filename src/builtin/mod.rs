//! Built-in Bundles
//!
//! Two small bundles the binary runs as a demonstration: `greeter` publishes
//! a [`Greeter`](greeter::Greeter) service and `watcher` follows it with a
//! service tracker.

pub mod greeter;
pub mod watcher;

pub use greeter::{Greeter, GreeterActivator, GREETER_INTERFACE};
pub use watcher::{WatcherActivator, WatcherView};
