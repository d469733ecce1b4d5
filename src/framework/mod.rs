//! Module Framework
//!
//! In-process registry of bundles that publish and discover services by
//! interface name, with synchronous service events.

// Internal modules - all access should go through api module
pub(crate) mod bundle;
pub(crate) mod constants;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod filter;
pub(crate) mod registry;
pub(crate) mod service;
pub(crate) mod settings;

// Public API module - the only public interface for the framework
pub mod api;

#[cfg(test)]
mod tests;
