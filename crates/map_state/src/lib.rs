//! Keeps a map display in sync with a serialized (query string) application
//! state, applying only what changed since the last update.

pub mod config;
pub mod display;
pub mod leading;
pub mod query;
pub mod reconcile;
pub mod report;
pub mod state;

pub use config::{ConfigError, MapConfig};
pub use display::{DisplayCall, DisplayError, DisplayOp, MapDisplay, RecordingDisplay};
pub use leading::{GEOGRAPHIC, leading_extent, supports_leading_edge};
pub use query::parse_query;
pub use reconcile::{Changes, Outcome, ReconcileError, StateReconciler, UPDATE_FAILED};
pub use report::{ErrorReporter, RecordingReporter, Report, TracingReporter};
pub use state::ParsedState;
