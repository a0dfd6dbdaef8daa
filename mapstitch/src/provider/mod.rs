//! Tile provider abstraction
//!
//! A provider is described by a URL template ([`ProviderTemplate`]) and
//! reached through an [`AsyncHttpClient`]. Short provider keys are resolved
//! through a [`ProviderRegistry`].
//!
//! ```ignore
//! use mapstitch::provider::{AsyncReqwestClient, ProviderRegistry};
//!
//! let client = AsyncReqwestClient::new()?;
//! let template = ProviderRegistry::with_builtins().resolve("osm")?;
//! ```

mod http;
mod registry;
mod template;

pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, TransportError, TransportOutcome};
pub use registry::ProviderRegistry;
pub use template::{build_urls, ProviderTemplate};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
