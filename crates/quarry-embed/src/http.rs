//! HTTP client construction for embedding backends.

use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client used for embedding API calls.
///
/// Embedding requests carry whole text batches, so the request timeout is
/// generous relative to the connect timeout. The embedding endpoints never
/// redirect, so no redirect policy is configured.
#[must_use]
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("quarry/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("default HTTP client construction must not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_documented_timeouts() {
        let _client = default_client();
        assert_eq!(CONNECT_TIMEOUT, Duration::from_secs(30));
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(60));
    }
}
