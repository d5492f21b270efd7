//! HTTP client SDK for the CodeAlive semantic code search service.
//!
//! Provides a typed client for the hosted (or self-hosted) CodeAlive API:
//! single-shot search, conversational chat with continuation, predefined
//! explore workflows, and the data-source catalog.
//!
//! # Example
//!
//! ```no_run
//! use codealive_client::{CodeAliveClient, DataSourceRef, SearchMode, SearchRequest};
//!
//! # async fn example() -> codealive_client::Result<()> {
//! let client = CodeAliveClient::builder()
//!     .api_key("secret")
//!     .build()?;
//!
//! let request = SearchRequest::new(
//!     "How is authentication handled?",
//!     vec![DataSourceRef::parse("my-backend")?],
//! )
//! .with_mode(SearchMode::Auto);
//!
//! let results = client.search().run(&request).await?;
//! for hit in &results.matches {
//!     println!("{}", hit.path().unwrap_or("(unknown)"));
//! }
//!
//! // Ask a question, then continue the conversation.
//! let refs = vec![DataSourceRef::parse("my-backend")?];
//! let reply = client.chat().ask("What does the session layer do?", &refs, None).await?;
//! let follow_up = client
//!     .chat()
//!     .ask("And how is it tested?", &refs, Some(&reply.conversation))
//!     .await?;
//! println!("{}", follow_up.answer);
//! # Ok(())
//! # }
//! ```
//!
//! # API coverage
//!
//! - **Search**: semantic/lexical queries with `auto`/`fast`/`deep` modes
//! - **Chat**: question/answer turns referenced by an opaque conversation
//!   token; mismatched data-source sets on continuation are rejected
//! - **Explore**: fixed multi-step workflows (search + chat recipes)
//! - **Data sources**: catalog listing with transparent pagination

pub mod api;
pub mod client;
pub mod error;
pub mod types;
pub mod workflow;

pub use client::{CodeAliveClient, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use types::*;
pub use workflow::{ExploreReport, Step, StepReport, Workflow, WORKFLOWS};
