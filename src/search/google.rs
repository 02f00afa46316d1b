use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use super::{RetryPolicy, SearchFailure, SearchOutcome, SearchProvider};
use crate::config::SearchConfig;

/// Builds the advanced-search URL for a vendor.
///
/// Every parameter goes through the URL encoder, so vendor names containing
/// `&`, `#` or spaces cannot break out of their parameter.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    endpoint: Url,
    negative_terms: String,
    recency: String,
}

impl SearchQuery {
    pub fn new(
        endpoint: &str,
        negative_terms: impl Into<String>,
        recency: impl Into<String>,
    ) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid search endpoint: {endpoint}"))?;
        Ok(Self {
            endpoint,
            negative_terms: negative_terms.into(),
            recency: recency.into(),
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Self::new(&config.endpoint, &config.negative_terms, &config.recency)
    }

    pub fn url_for(&self, vendor: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("as_q", vendor)
            .append_pair("as_oq", &self.negative_terms)
            .append_pair("as_qdr", &self.recency);
        url
    }
}

/// Searches the web for negative news about a vendor.
///
/// Throttled responses (429) are retried with exponential backoff until the
/// attempt budget runs out. Other error statuses and transport errors fail
/// immediately.
pub struct GoogleSearch {
    client: reqwest::Client,
    query: SearchQuery,
    retry: RetryPolicy,
}

impl GoogleSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            query: SearchQuery::from_config(config)?,
            retry: RetryPolicy::from(config),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &'static str {
        "Google"
    }

    async fn search(&self, vendor: &str) -> SearchOutcome {
        let url = self.query.url_for(vendor);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(vendor, attempt, error = %e, "Search request failed");
                    return SearchOutcome::Failed(SearchFailure::Transport(e.to_string()));
                }
            };

            let status = response.status();

            if status.is_success() {
                return match response.text().await {
                    Ok(body) if body.trim().is_empty() => SearchOutcome::NoResults,
                    Ok(body) => SearchOutcome::Found(body),
                    Err(e) => {
                        warn!(vendor, attempt, error = %e, "Failed to read search response");
                        SearchOutcome::Failed(SearchFailure::Transport(e.to_string()))
                    }
                };
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !self.retry.can_retry(attempt) {
                    warn!(vendor, attempts = attempt, "Search throttled, giving up");
                    return SearchOutcome::Failed(SearchFailure::Throttled { attempts: attempt });
                }

                let delay = self.retry.delay_after(attempt);
                debug!(vendor, attempt, ?delay, "Search throttled, backing off");
                tokio::time::sleep(delay).await;
                continue;
            }

            warn!(vendor, status = status.as_u16(), "Unexpected search response");
            return SearchOutcome::Failed(SearchFailure::UnexpectedStatus(status.as_u16()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        routing::get,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Local stand-in for the search endpoint that replays a fixed script of
    /// responses and records what it was asked.
    struct ScriptedEndpoint {
        script: Vec<(StatusCode, &'static str)>,
        hits: AtomicUsize,
        last_query: Mutex<Option<HashMap<String, String>>>,
    }

    async fn respond(
        State(endpoint): State<Arc<ScriptedEndpoint>>,
        Query(query): Query<HashMap<String, String>>,
    ) -> (StatusCode, String) {
        let n = endpoint.hits.fetch_add(1, Ordering::SeqCst);
        *endpoint.last_query.lock().unwrap() = Some(query);
        let (status, body) = endpoint.script[n.min(endpoint.script.len() - 1)];
        (status, body.to_string())
    }

    async fn serve(script: Vec<(StatusCode, &'static str)>) -> (Arc<ScriptedEndpoint>, String) {
        let endpoint = Arc::new(ScriptedEndpoint {
            script,
            hits: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        });
        let router = Router::new()
            .route("/search", get(respond))
            .with_state(endpoint.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (endpoint, format!("http://{addr}/search"))
    }

    fn client_for(endpoint: String) -> GoogleSearch {
        GoogleSearch::new(&SearchConfig {
            endpoint,
            backoff_base_ms: 1,
            timeout_secs: 5,
            ..SearchConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_query_encodes_vendor_name() {
        let query = SearchQuery::new("https://www.google.com/search", "fraud or scam", "d").unwrap();
        let url = query.url_for("AT&T #1 \"Corp\"");

        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["as_q"], "AT&T #1 \"Corp\"");
        assert_eq!(pairs["as_oq"], "fraud or scam");
        assert_eq!(pairs["as_qdr"], "d");
        assert_eq!(pairs.len(), 3);
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(SearchQuery::new("not a url", "x", "d").is_err());
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let (endpoint, url) = serve(vec![(StatusCode::OK, "<html>breach</html>")]).await;
        let client = client_for(url);

        let outcome = client.search("Acme").await;

        assert_eq!(outcome, SearchOutcome::Found("<html>breach</html>".to_string()));
        assert_eq!(endpoint.hits.load(Ordering::SeqCst), 1);

        let query = endpoint.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query["as_q"], "Acme");
        assert_eq!(query["as_qdr"], "d");
        assert!(query["as_oq"].contains("data breach"));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_results() {
        let (_, url) = serve(vec![(StatusCode::OK, "  \n")]).await;
        assert_eq!(client_for(url).search("Acme").await, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn test_throttled_then_success_retries_until_success() {
        let (endpoint, url) = serve(vec![
            (StatusCode::TOO_MANY_REQUESTS, ""),
            (StatusCode::TOO_MANY_REQUESTS, ""),
            (StatusCode::OK, "third time"),
        ])
        .await;

        let outcome = client_for(url).search("Acme").await;

        assert_eq!(outcome, SearchOutcome::Found("third time".to_string()));
        assert_eq!(endpoint.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_five_throttled_attempts() {
        let (endpoint, url) = serve(vec![(StatusCode::TOO_MANY_REQUESTS, "slow down")]).await;

        let outcome = client_for(url).search("Globex").await;

        assert_eq!(
            outcome,
            SearchOutcome::Failed(SearchFailure::Throttled { attempts: 5 })
        );
        assert_eq!(endpoint.hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_throttled_backoff_waits_between_attempts_only() {
        let (endpoint, url) = serve(vec![(StatusCode::TOO_MANY_REQUESTS, "")]).await;
        let client = GoogleSearch::new(&SearchConfig {
            endpoint: url,
            backoff_base_ms: 20,
            timeout_secs: 5,
            ..SearchConfig::default()
        })
        .unwrap();

        let started = Instant::now();
        let outcome = client.search("Globex").await;
        let elapsed = started.elapsed();

        assert_eq!(
            outcome,
            SearchOutcome::Failed(SearchFailure::Throttled { attempts: 5 })
        );
        assert_eq!(endpoint.hits.load(Ordering::SeqCst), 5);
        // 20ms * (2 + 4 + 8 + 16); a sleep after the last attempt would add 640ms.
        assert!(elapsed >= Duration::from_millis(600), "waited only {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1200), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn test_other_status_fails_without_retry() {
        let (endpoint, url) = serve(vec![
            (StatusCode::SERVICE_UNAVAILABLE, ""),
            (StatusCode::OK, "never reached"),
        ])
        .await;

        let outcome = client_for(url).search("Acme").await;

        assert_eq!(
            outcome,
            SearchOutcome::Failed(SearchFailure::UnexpectedStatus(503))
        );
        assert_eq!(endpoint.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_error_fails_immediately() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = client_for(format!("http://{addr}/search")).search("Acme").await;

        assert!(matches!(
            outcome,
            SearchOutcome::Failed(SearchFailure::Transport(_))
        ));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let client = client_for("http://127.0.0.1:1/search".to_string());
        assert_eq!(client.retry_policy().max_attempts, 5);
        assert_eq!(client.name(), "Google");
    }
}
