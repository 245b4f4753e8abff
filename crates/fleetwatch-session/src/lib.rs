//! ---
//! fw_section: "04-session-orchestration"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Scenario session lifecycle and KPI publication."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
//! Scenario session management.
//!
//! A [`SessionHandle`] is the one shared object views receive: it carries the
//! active scenario id (single writer, many watchers) and a subscription to
//! scenario-level KPIs. Nothing in the workspace reaches for ambient global
//! state to learn which scenario is running.

pub mod session;

pub use session::{SessionHandle, SessionManager, SessionTask};
