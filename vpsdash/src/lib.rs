//! Library API for vpsdash: the live synchronization core of a server dashboard.
//!
//! Pipeline: connection (`ws`) -> frame routing (`router`) -> update gating
//! (`gate`) -> rolling histories (`history`), and readiness edges (`readiness`)
//! -> scan status polls (`scan`). UI code only reads [`state::SharedState`].

pub mod config;
pub mod control;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod history;
pub mod pipeline;
pub mod prefs;
pub mod readiness;
pub mod router;
pub mod scan;
pub mod state;
pub mod types;
pub mod ws;

pub use dashboard::Dashboard;
pub use error::ControlError;
