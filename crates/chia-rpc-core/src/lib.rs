pub mod amount;
pub mod api;
pub mod codec;
pub mod error;
pub mod manager;
pub mod provider;
#[cfg(test)]
mod test_util;
pub mod types;

pub use api::ChiaClient;
pub use error::CoreError;
pub use manager::{ConnectionManager, ProviderSpec};
pub use types::{BlockId, EndpointName, HttpVerb, RpcParams, RpcRequest, RpcResult};
