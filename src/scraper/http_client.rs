use crate::config::ScraperConfig;
use crate::error::FetchError;
use rand::RngExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub struct HttpClient {
    inner: reqwest::Client,
    config: ScraperConfig,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based listing pages work
            .cookie_store(true)
            .build()?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// Fetch a URL as text with rate-limiting. At most one retry per call;
    /// 4xx other than 429 is final on the first attempt.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.polite_delay().await;

        let mut last_err = FetchError::Request("no attempts made".to_string());

        for attempt in 1..=2u32 {
            debug!("GET {} (attempt {})", url, attempt);

            match self.inner.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.text().await?);
                    }

                    last_err = FetchError::Status(status.as_u16());

                    if status.as_u16() == 429 || status.is_server_error() {
                        // Rate limited or upstream hiccup — back off once
                        let backoff = Duration::from_millis(
                            self.config.request_delay_ms * (2u64.pow(attempt)),
                        );
                        warn!(
                            "HTTP {} from {} on attempt {}, sleeping {:?}",
                            status, url, attempt, backoff
                        );
                        sleep(backoff).await;
                    } else {
                        break; // Other 4xx are final
                    }
                }
                Err(e) => {
                    warn!("Request failed on attempt {}: {}", attempt, e);
                    last_err = FetchError::from(e);
                    sleep(Duration::from_millis(
                        self.config.request_delay_ms * (attempt as u64),
                    ))
                    .await;
                }
            }
        }

        Err(last_err)
    }

    /// Sleep for the configured inter-request delay + random jitter.
    async fn polite_delay(&self) {
        let jitter = rand::rng().random_range(0..=self.config.jitter_ms);
        let total = Duration::from_millis(self.config.request_delay_ms + jitter);
        sleep(total).await;
    }
}
