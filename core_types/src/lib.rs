//! # Core Types
//!
//! Identifiers shared by every crate in the gizmo workspace.
//!
//! ## Key Types
//!
//! - [`SessionId`]: Identifies one open maneuver-edit gizmo on the host
//! - [`ListenerId`]: Identifies one subscription the host handed out

pub mod ids;

pub use ids::{ListenerId, SessionId};
