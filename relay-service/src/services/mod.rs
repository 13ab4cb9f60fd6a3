pub mod metrics;
pub mod providers;

pub use self::metrics::{get_metrics, init_metrics, record_upstream_request};
