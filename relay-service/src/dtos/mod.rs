pub mod relay;

pub use relay::{RelayRequest, RelayResponse};
