//! OSM API client implementation.

mod changesets;
mod config;
mod documents;
mod elements;
mod fetch;
pub mod native_transport;
pub mod normalize;
mod notes;
mod preferences;
mod users;
pub mod utils;

pub use config::{ClientConfig, Credentials, DEFAULT_ENDPOINT};
pub use fetch::OsmClient;
pub use native_transport::NativeTransport;
pub use utils::{build_query_string, encode_component, trim_trailing_slashes};
