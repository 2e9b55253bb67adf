//! Alpaca market-data bar source.
//!
//! Fetches stock bars from the v2 bars endpoint on the free IEX feed.
//! Handles pagination, retries with exponential backoff on 429/5xx/timeouts,
//! and the circuit breaker. Credentials come from `APCA_API_KEY_ID` and
//! `APCA_API_SECRET_KEY`.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{BarRequest, BarSource, BarWindow, DataError, Timeframe};
use crate::domain::{canonicalize, Bar};
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const KEY_ID_VAR: &str = "APCA_API_KEY_ID";
pub const SECRET_KEY_VAR: &str = "APCA_API_SECRET_KEY";
const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets";
const PAGE_LIMIT: usize = 10_000;

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Option<Vec<AlpacaBar>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: DateTime<Utc>,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Debug, Clone)]
pub struct AlpacaCredentials {
    pub key_id: String,
    pub secret_key: String,
}

impl AlpacaCredentials {
    pub fn from_env() -> Result<Self, DataError> {
        let read = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DataError::AuthenticationRequired(format!("{var} is not set")))
        };
        Ok(Self {
            key_id: read(KEY_ID_VAR)?,
            secret_key: read(SECRET_KEY_VAR)?,
        })
    }
}

pub struct AlpacaBarSource {
    client: reqwest::blocking::Client,
    credentials: AlpacaCredentials,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    feed: String,
    max_retries: u32,
    base_delay: Duration,
}

impl AlpacaBarSource {
    pub fn new(
        credentials: AlpacaCredentials,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            circuit_breaker,
            base_url: DEFAULT_BASE_URL.into(),
            feed: "iex".into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Credentials from the environment, default circuit breaker.
    pub fn from_env() -> Result<Self, DataError> {
        Self::new(
            AlpacaCredentials::from_env()?,
            Arc::new(CircuitBreaker::default_source()),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = feed.into();
        self
    }

    fn timeframe_param(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::Minute => "1Min",
            Timeframe::Day => "1Day",
        }
    }

    /// Look-back used to anchor a `Limit(n)` request, generous enough to
    /// cover weekends and the overnight gap.
    fn lookback(timeframe: Timeframe, limit: usize) -> ChronoDuration {
        match timeframe {
            Timeframe::Minute => ChronoDuration::days(5),
            Timeframe::Day => ChronoDuration::days(limit as i64 * 2 + 10),
        }
    }

    fn query(&self, request: &BarRequest, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let fmt = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut params = vec![
            ("timeframe", Self::timeframe_param(request.timeframe).to_string()),
            ("feed", self.feed.clone()),
            ("adjustment", "raw".to_string()),
        ];
        match request.window {
            BarWindow::Limit(n) => {
                let start = Utc::now() - Self::lookback(request.timeframe, n);
                params.push(("start", fmt(start)));
                params.push(("limit", n.clamp(1, PAGE_LIMIT).to_string()));
                params.push(("sort", "desc".to_string()));
            }
            BarWindow::Range { start, end } => {
                params.push(("start", fmt(start)));
                params.push(("end", fmt(end)));
                params.push(("limit", PAGE_LIMIT.to_string()));
                params.push(("sort", "asc".to_string()));
            }
        }
        if let Some(token) = page_token {
            params.push(("page_token", token.to_string()));
        }
        params
    }

    /// One HTTP page with retry and circuit breaker logic.
    fn fetch_page(
        &self,
        request: &BarRequest,
        page_token: Option<&str>,
    ) -> Result<BarsResponse, DataError> {
        let url = format!(
            "{}/v2/stocks/{}/bars",
            self.base_url.trim_end_matches('/'),
            request.symbol
        );
        let params = self.query(request, page_token);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol = %request.symbol, attempt, ?delay, "retrying bar request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let sent = self
                .client
                .get(&url)
                .header("APCA-API-KEY-ID", &self.credentials.key_id)
                .header("APCA-API-SECRET-KEY", &self.credentials.secret_key)
                .query(&params)
                .send();

            let resp = match sent {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::AuthenticationRequired(format!(
                    "HTTP 403 for {}",
                    request.symbol
                )));
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Alpaca rejected the API credentials".into(),
                ));
            }
            if status == reqwest::StatusCode::NOT_FOUND
                || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
            {
                return Err(DataError::NoData {
                    symbol: request.symbol.clone(),
                });
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(symbol = %request.symbol, retry_after, "rate limited");
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!(
                    "HTTP {status} for {}",
                    request.symbol
                )));
                continue;
            }

            let page: BarsResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse bars for {}: {e}",
                    request.symbol
                ))
            })?;
            self.circuit_breaker.record_success();
            return Ok(page);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    fn to_bar(symbol: &str, raw: AlpacaBar) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            timestamp: raw.t,
            open: raw.o,
            high: raw.h,
            low: raw.l,
            close: raw.c,
            volume: if raw.v.is_finite() && raw.v > 0.0 {
                raw.v.round() as u64
            } else {
                0
            },
        }
    }
}

impl BarSource for AlpacaBarSource {
    fn name(&self) -> &str {
        "alpaca"
    }

    fn fetch(&self, request: &BarRequest) -> Result<Vec<Bar>, DataError> {
        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(request, page_token.as_deref())?;
            bars.extend(
                page.bars
                    .unwrap_or_default()
                    .into_iter()
                    .map(|raw| Self::to_bar(&request.symbol, raw))
                    .filter(Bar::is_sane),
            );
            // A limit request is satisfied by its first (newest-first) page.
            page_token = match (request.window, page.next_page_token) {
                (BarWindow::Range { .. }, Some(token)) if !token.is_empty() => Some(token),
                _ => None,
            };
            if page_token.is_none() {
                break;
            }
        }

        let bars = request.window.apply(canonicalize(bars));
        debug!(symbol = %request.symbol, timeframe = %request.timeframe, bars = bars.len(), "fetched Alpaca bars");
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: request.symbol.clone(),
            });
        }
        Ok(bars)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> AlpacaBarSource {
        AlpacaBarSource::new(
            AlpacaCredentials {
                key_id: "key".into(),
                secret_key: "secret".into(),
            },
            Arc::new(CircuitBreaker::default_source()),
        )
        .unwrap()
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn limit_query_is_newest_first_on_iex() {
        let params = source().query(&BarRequest::latest("AAPL", Timeframe::Minute, 120), None);
        assert_eq!(param(&params, "timeframe"), Some("1Min"));
        assert_eq!(param(&params, "feed"), Some("iex"));
        assert_eq!(param(&params, "limit"), Some("120"));
        assert_eq!(param(&params, "sort"), Some("desc"));
        assert!(param(&params, "start").is_some());
        assert_eq!(param(&params, "page_token"), None);
    }

    #[test]
    fn range_query_carries_bounds_and_token() {
        let start = "2024-01-02T14:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let end = "2024-01-02T21:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let request = BarRequest::new("NVDA", Timeframe::Day, BarWindow::Range { start, end });
        let params = source().query(&request, Some("abc"));
        assert_eq!(param(&params, "timeframe"), Some("1Day"));
        assert_eq!(param(&params, "start"), Some("2024-01-02T14:30:00Z"));
        assert_eq!(param(&params, "end"), Some("2024-01-02T21:00:00Z"));
        assert_eq!(param(&params, "sort"), Some("asc"));
        assert_eq!(param(&params, "page_token"), Some("abc"));
    }

    #[test]
    fn parses_bars_payload() {
        let json = r#"{
            "bars": [
                {"t":"2024-01-02T14:31:00Z","o":101.0,"h":102.0,"l":100.5,"c":101.5,"v":1200,"n":10,"vw":101.2},
                {"t":"2024-01-02T14:30:00Z","o":100.0,"h":101.0,"l":99.5,"c":100.5,"v":1000,"n":8,"vw":100.4}
            ],
            "symbol": "AAPL",
            "next_page_token": null
        }"#;
        let page: BarsResponse = serde_json::from_str(json).unwrap();
        assert!(page.next_page_token.is_none());
        let bars: Vec<Bar> = page
            .bars
            .unwrap()
            .into_iter()
            .map(|b| AlpacaBarSource::to_bar("AAPL", b))
            .collect();
        let bars = canonicalize(bars);
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn null_bars_payload_is_empty() {
        let page: BarsResponse =
            serde_json::from_str(r#"{"bars":null,"symbol":"XYZ","next_page_token":null}"#).unwrap();
        assert!(page.bars.unwrap_or_default().is_empty());
    }

    #[test]
    fn tripped_breaker_refuses_requests() {
        let breaker = Arc::new(CircuitBreaker::default_source());
        breaker.trip();
        let source = AlpacaBarSource::new(
            AlpacaCredentials {
                key_id: "key".into(),
                secret_key: "secret".into(),
            },
            breaker,
        )
        .unwrap();
        assert!(!source.is_available());
        let err = source
            .fetch(&BarRequest::latest("AAPL", Timeframe::Minute, 10))
            .unwrap_err();
        assert!(matches!(err, DataError::CircuitBreakerTripped));
    }
}
