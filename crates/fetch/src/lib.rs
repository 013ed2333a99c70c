//! # Warden Fetch
//!
//! Cached background fetches for hosts that poll for results.
//!
//! A [`ReplyCache`] starts fetches on request, bounds each one by a timeout
//! and a payload size cap, and reports per-key [`Status`]. The
//! [`QuestionCache`] façade exposes the same operations over string keys.
//!
//! ```rust,no_run
//! use warden_fetch::{FetchConfig, HttpFetcher, QuestionCache};
//!
//! # async fn run() -> warden_fetch::Result<()> {
//! let questions = QuestionCache::new(HttpFetcher::default(), FetchConfig::default())?;
//! questions.prefetch("33088614");
//! println!("{}", questions.status("33088614"));
//! let body = questions.get("33088614").await;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod question;
pub mod status;

pub use cache::ReplyCache;
pub use config::FetchConfig;
pub use error::{FetchError, Result};
#[cfg(feature = "http")]
pub use fetcher::{DEFAULT_URL_TEMPLATE, HttpFetcher};
pub use fetcher::{CappedBody, Fetcher};
pub use question::{QuestionCache, parse_id};
pub use status::Status;
