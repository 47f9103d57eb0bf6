//! Small helpers shared by the wire-facing modules.

mod ids;
pub mod timestamps;

pub use ids::completion_id;
pub use timestamps::{format_iso8601, iso_timestamp, unix_timestamp};
