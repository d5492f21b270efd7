//! API endpoint implementations.

mod chat;
mod datasources;
mod explore;
mod search;

pub use chat::ChatApi;
pub use datasources::DataSourcesApi;
pub use explore::ExploreApi;
pub use search::SearchApi;
