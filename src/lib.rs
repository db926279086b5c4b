//! Detects where a recorded workout effectively stopped and rebuilds the
//! activity's summary metrics as if the recording had ended there.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod types;

pub use pipeline::detect::{detect_stop, Thresholds};
pub use pipeline::manual::{resolve_manual_trim, ManualBounds};
pub use pipeline::normalize::normalize;
pub use pipeline::synthesize::synthesize;
pub use pipeline::trim::{trim_activity, TrimRequest};
pub use pipeline::validate::validate_trim;
