//! Terminal client for the Snap2Sheet invoice extraction service.
//!
//! The core is the [`workflow`] state machine; [`worker`] executes its
//! network requests, [`api`] talks to the service, and the [`app`] module
//! renders whatever state the workflow produces.

pub mod api;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod events;
pub mod input;
pub mod layout;
pub mod model;
pub mod progress;
pub mod shortcuts;
pub mod ui;
pub mod validate;
pub mod worker;
pub mod workflow;
