//! Transports that produce raw payloads for the cache.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::error::{FetchError, Result};

/// Source of payloads keyed by numeric identifier.
///
/// Timeouts are enforced by the cache. The size cap is handed to the
/// fetcher so it can stop reading as soon as a payload is known to exceed
/// it; the cache checks the returned payload again.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch the payload for `id`, failing with [`FetchError::TooLarge`]
    /// once more than `max_bytes` have been received.
    async fn fetch(&self, id: i64, max_bytes: usize) -> Result<Bytes>;
}

/// Accumulates a payload chunk by chunk, refusing to grow past a limit.
#[derive(Debug)]
pub struct CappedBody {
    buf: BytesMut,
    limit: usize,
}

impl CappedBody {
    /// Empty body accepting at most `limit` bytes.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            limit,
        }
    }

    /// Reject a payload whose announced length already exceeds the limit.
    pub fn check_announced(&self, length: Option<u64>) -> Result<()> {
        match length {
            Some(length) if length > self.limit as u64 => Err(FetchError::TooLarge {
                size: usize::try_from(length).unwrap_or(usize::MAX),
                limit: self.limit,
            }),
            _ => Ok(()),
        }
    }

    /// Append a chunk. Fails as soon as the total exceeds the limit, so the
    /// caller can stop reading.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        let size = self.buf.len() + chunk.len();
        if size > self.limit {
            return Err(FetchError::TooLarge {
                size,
                limit: self.limit,
            });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    /// Bytes accepted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accepted payload.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(feature = "http")]
pub use http::{DEFAULT_URL_TEMPLATE, HttpFetcher};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_body_accepts_up_to_limit() {
        let mut body = CappedBody::new(8);
        body.push(b"abcd").unwrap();
        body.push(b"efgh").unwrap();
        assert_eq!(body.len(), 8);
        assert_eq!(body.finish(), Bytes::from_static(b"abcdefgh"));
    }

    #[test]
    fn capped_body_stops_at_first_overflowing_chunk() {
        let mut body = CappedBody::new(6);
        body.push(b"abcd").unwrap();
        let error = body.push(b"efgh").unwrap_err();
        assert!(matches!(error, FetchError::TooLarge { size: 8, limit: 6 }));
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn announced_length_is_checked_before_reading() {
        let body = CappedBody::new(100);
        assert!(body.check_announced(None).is_ok());
        assert!(body.check_announced(Some(100)).is_ok());
        assert!(matches!(
            body.check_announced(Some(5_000_000)),
            Err(FetchError::TooLarge { size: 5_000_000, limit: 100 })
        ));
        assert!(body.is_empty());
    }
}

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use bytes::Bytes;

    use super::{CappedBody, Fetcher};
    use crate::error::{FetchError, Result};

    /// Default template: the question page on Stack Overflow.
    pub const DEFAULT_URL_TEMPLATE: &str = "https://stackoverflow.com/questions/{id}";

    /// Fetches payloads over HTTP from a URL template containing `{id}`.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: reqwest::Client,
        url_template: String,
    }

    impl HttpFetcher {
        /// Create a fetcher for `url_template`.
        pub fn new(url_template: impl Into<String>) -> Result<Self> {
            Self::with_client(reqwest::Client::new(), url_template)
        }

        /// Create a fetcher for `url_template` that sends through `client`.
        pub fn with_client(
            client: reqwest::Client,
            url_template: impl Into<String>,
        ) -> Result<Self> {
            let url_template = url_template.into();
            if !url_template.contains("{id}") {
                return Err(FetchError::config(format!(
                    "url template '{url_template}' has no {{id}} placeholder"
                )));
            }
            Ok(Self {
                client,
                url_template,
            })
        }

        /// URL requested for `id`.
        #[must_use]
        pub fn url_for(&self, id: i64) -> String {
            self.url_template.replace("{id}", &id.to_string())
        }
    }

    impl Default for HttpFetcher {
        fn default() -> Self {
            Self {
                client: reqwest::Client::new(),
                url_template: DEFAULT_URL_TEMPLATE.to_string(),
            }
        }
    }

    #[async_trait]
    impl Fetcher for HttpFetcher {
        async fn fetch(&self, id: i64, max_bytes: usize) -> Result<Bytes> {
            let url = self.url_for(id);
            tracing::debug!(%url, "fetching");
            let mut response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(FetchError::transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    code: status.as_u16(),
                });
            }

            let mut body = CappedBody::new(max_bytes);
            body.check_announced(response.content_length())?;
            while let Some(chunk) = response.chunk().await.map_err(FetchError::transport)? {
                body.push(&chunk)?;
            }
            Ok(body.finish())
        }
    }

}
