//! Network plumbing shared by the content loader, the cache worker and the
//! notification stream.
//!
//! Everything that wants a document goes through the [`Fetch`] trait. The
//! direct implementation is [`HttpFetcher`]; the client normally talks to the
//! cache worker's handle instead, which implements the same trait and falls
//! back to stored responses when the network is unreachable.

mod fetch;

pub use fetch::{build_client, Fetch, FetchError, HttpFetcher, Response, MAX_DOCUMENT_SIZE};
