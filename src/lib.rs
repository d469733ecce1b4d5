pub mod app;
pub mod builtin;
pub mod core;
pub mod framework;
pub mod tracker;
