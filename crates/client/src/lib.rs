//! HTTP client for the board backend and the model API.
//!
//! [`BoardApi`] is the seam callers depend on; [`ApiClient`] implements it
//! over `reqwest`. Every backend reply is checked against the contract
//! catalog before it is handed back.

pub mod api;
pub mod endpoints;
pub mod http;

pub use api::{ApiReply, BoardApi, ImageUpload, RawReply};
#[cfg(any(test, feature = "test-utils"))]
pub use api::MockBoardApi;
pub use endpoints::Endpoints;
pub use http::ApiClient;
