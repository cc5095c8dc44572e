//! Role-scoped HTTP requests against the records-store API.

mod api_client;
mod query;
mod request;

pub use api_client::ApiClient;
pub use query::{build_params, AlbumQuery, ParamMap, SortOrder};
pub use request::{ApiResponse, RequestSpec};
