//! Test modules for the framework
//!
//! Lifecycle, event delivery and context tests share the activators and
//! listeners in `utils`.

mod utils;
