pub mod action_executor;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod cursor;
pub mod keymap;
pub mod listeners;
pub mod logging;
pub mod model;
pub mod overlay_state;
pub mod runtime;
pub mod search;
pub mod session;
pub mod transport;
