use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use research_core::{
    CashFlowStatement, FinancialRatios, FundamentalsProvider, IncomeStatement, KeyMetrics,
    PriceHistoryProvider, PricePoint, ResearchError, is_valid_symbol,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://financialmodelingprep.com";
const DEFAULT_RATE_LIMIT: usize = 300;
const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(15);
const MAX_RETRY_WAIT: Duration = Duration::from_secs(120);
const SLOT_SLACK: Duration = Duration::from_millis(50);

/// Requests FMP has accepted within the last `window`, capped at `max_requests`
#[derive(Clone)]
struct RateLimiter {
    sent: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            sent: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Record a request at `now` if a slot is free, otherwise return how long
    /// until the oldest recorded request leaves the window.
    fn try_admit(&self, sent: &mut VecDeque<Instant>, now: Instant) -> Result<(), Duration> {
        while sent
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            sent.pop_front();
        }

        if sent.len() < self.max_requests {
            sent.push_back(now);
            return Ok(());
        }
        match sent.front().copied() {
            Some(oldest) => Err((oldest + self.window).duration_since(now)),
            None => {
                sent.push_back(now);
                Ok(())
            }
        }
    }

    async fn acquire(&self) {
        loop {
            let wait = {
                let mut sent = self.sent.lock().await;
                match self.try_admit(&mut sent, Instant::now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            tracing::debug!("FMP rate limit reached, next slot in {:.1}s", wait.as_secs_f64());
            tokio::time::sleep(wait + SLOT_SLACK).await;
        }
    }
}

/// How long to back off after a 429: the server's `Retry-After` seconds when
/// it sends a usable one, otherwise `fallback`. Never longer than `MAX_RETRY_WAIT`.
fn retry_wait(headers: &HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
        .min(MAX_RETRY_WAIT)
}

/// Financial Modeling Prep REST client
#[derive(Clone)]
pub struct FmpClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl FmpClient {
    pub fn new(api_key: String) -> Self {
        // Free plan allows 250 calls per day; paid plans allow 300+/min.
        let rate_limit: usize = std::env::var("FMP_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);
        let retry_wait = std::env::var("FMP_RETRY_WAIT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_WAIT);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
            retry_wait,
        }
    }

    pub fn from_env() -> Result<Self, ResearchError> {
        let api_key = std::env::var("FMP_API_KEY")
            .map_err(|_| ResearchError::ApiError("FMP_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Point the client at another host (a proxy or a local stub)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Back-off after a 429 when FMP sends no `Retry-After`
    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request through the rate limiter, backing off and retrying on 429.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ResearchError> {
        let request = builder.build().map_err(|e| ResearchError::ApiError(e.to_string()))?;

        for attempt in 1..=MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let attempt_request = request
                .try_clone()
                .ok_or_else(|| ResearchError::ApiError("request body cannot be retried".to_string()))?;
            let response = self
                .client
                .execute(attempt_request)
                .await
                .map_err(|e| ResearchError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }
            if attempt == MAX_ATTEMPTS {
                break;
            }

            let wait = retry_wait(response.headers(), self.retry_wait);
            tracing::warn!(
                "FMP returned 429 for {}, retrying in {}s ({}/{})",
                request.url().path(),
                wait.as_secs(),
                attempt,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(wait).await;
        }

        Err(ResearchError::ApiError(format!(
            "FMP rate limit still exceeded after {} attempts",
            MAX_ATTEMPTS
        )))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ResearchError> {
        let url = self.endpoint(path);
        let mut params: Vec<(&str, String)> = vec![("apikey", self.api_key.clone())];
        params.extend(query.iter().cloned());

        tracing::debug!("GET {}", path);
        let response = self.send_request(self.client.get(&url).query(&params)).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ResearchError::ApiError(format!(
                "HTTP {} for {}: check the API key and plan access",
                status, path
            )));
        }
        if !status.is_success() {
            return Err(ResearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ResearchError::ApiError(e.to_string()))?;

        decode_body(body)
    }

    /// Daily closes between `from` and `to`, oldest first
    pub async fn get_historical_prices(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, ResearchError> {
        let path = symbol_path("/api/v3/historical-price-full", symbol)?;
        let response: HistoricalPriceResponse = self
            .get_json(
                &path,
                &[
                    ("serietype", "line".to_string()),
                    ("from", from.format("%Y-%m-%d").to_string()),
                    ("to", to.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        let prices = normalize_prices(response.historical);
        tracing::debug!("Fetched {} daily closes for {}", prices.len(), symbol);
        Ok(prices)
    }

    /// Annual ratios, most recent first
    pub async fn get_financial_ratios(&self, symbol: &str) -> Result<Vec<FinancialRatios>, ResearchError> {
        let path = symbol_path("/api/v3/ratios", symbol)?;
        let records: Vec<RatiosRecord> = self.get_json(&path, &annual()).await?;
        Ok(records.into_iter().map(FinancialRatios::from).collect())
    }

    /// Annual key metrics, most recent first
    pub async fn get_key_metrics(&self, symbol: &str) -> Result<Vec<KeyMetrics>, ResearchError> {
        let path = symbol_path("/api/v3/key-metrics", symbol)?;
        let records: Vec<KeyMetricsRecord> = self.get_json(&path, &annual()).await?;
        Ok(records.into_iter().map(KeyMetrics::from).collect())
    }

    /// Annual income statements, most recent first
    pub async fn get_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>, ResearchError> {
        let path = symbol_path("/api/v3/income-statement", symbol)?;
        let records: Vec<IncomeRecord> = self.get_json(&path, &annual()).await?;
        Ok(records.into_iter().map(IncomeStatement::from).collect())
    }

    /// Annual cash flow statements, most recent first
    pub async fn get_cash_flow_statements(&self, symbol: &str) -> Result<Vec<CashFlowStatement>, ResearchError> {
        let path = symbol_path("/api/v3/cash-flow-statement", symbol)?;
        let records: Vec<CashFlowRecord> = self.get_json(&path, &annual()).await?;
        Ok(records.into_iter().map(CashFlowStatement::from).collect())
    }
}

/// Symbols end up as a path segment, so anything beyond letters, digits,
/// dots and dashes is refused before a URL is built
fn symbol_path(prefix: &str, symbol: &str) -> Result<String, ResearchError> {
    if !is_valid_symbol(symbol) {
        return Err(ResearchError::InvalidData(format!("invalid ticker symbol {:?}", symbol)));
    }
    Ok(format!("{}/{}", prefix, symbol))
}

fn annual() -> [(&'static str, String); 1] {
    [("period", "annual".to_string())]
}

/// FMP reports some failures as a 200 with an "Error Message" body
fn decode_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ResearchError> {
    if let Some(message) = body.get("Error Message").and_then(|v| v.as_str()) {
        return Err(ResearchError::ApiError(message.to_string()));
    }
    serde_json::from_value(body).map_err(|e| ResearchError::InvalidData(e.to_string()))
}

/// Oldest first, one point per date, finite closes only
fn normalize_prices(records: Vec<HistoricalPrice>) -> Vec<PricePoint> {
    let mut prices: Vec<PricePoint> = records
        .into_iter()
        .filter(|r| r.close.is_finite())
        .map(|r| PricePoint::new(r.date, r.close))
        .collect();
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);
    prices
}

#[async_trait]
impl PriceHistoryProvider for FmpClient {
    async fn price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, ResearchError> {
        self.get_historical_prices(symbol, from, to).await
    }
}

#[async_trait]
impl FundamentalsProvider for FmpClient {
    async fn financial_ratios(&self, symbol: &str) -> Result<Vec<FinancialRatios>, ResearchError> {
        self.get_financial_ratios(symbol).await
    }

    async fn key_metrics(&self, symbol: &str) -> Result<Vec<KeyMetrics>, ResearchError> {
        self.get_key_metrics(symbol).await
    }

    async fn income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>, ResearchError> {
        self.get_income_statements(symbol).await
    }

    async fn cash_flow_statements(&self, symbol: &str) -> Result<Vec<CashFlowStatement>, ResearchError> {
        self.get_cash_flow_statements(symbol).await
    }
}

// Response structures

#[derive(Debug, Deserialize)]
struct HistoricalPriceResponse {
    // Unknown symbols come back as `{}`
    #[serde(default)]
    historical: Vec<HistoricalPrice>,
}

#[derive(Debug, Deserialize)]
struct HistoricalPrice {
    date: NaiveDate,
    close: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatiosRecord {
    date: NaiveDate,
    #[serde(default)]
    price_to_book_ratio: Option<f64>,
    #[serde(default)]
    price_to_sales_ratio: Option<f64>,
    #[serde(default)]
    return_on_equity: Option<f64>,
    #[serde(default)]
    gross_profit_margin: Option<f64>,
    #[serde(default)]
    net_profit_margin: Option<f64>,
}

impl From<RatiosRecord> for FinancialRatios {
    fn from(r: RatiosRecord) -> Self {
        FinancialRatios {
            date: r.date,
            price_to_book: r.price_to_book_ratio,
            price_to_sales: r.price_to_sales_ratio,
            return_on_equity: r.return_on_equity,
            gross_profit_margin: r.gross_profit_margin,
            net_profit_margin: r.net_profit_margin,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyMetricsRecord {
    date: NaiveDate,
    #[serde(default)]
    debt_to_equity: Option<f64>,
}

impl From<KeyMetricsRecord> for KeyMetrics {
    fn from(r: KeyMetricsRecord) -> Self {
        KeyMetrics {
            date: r.date,
            debt_to_equity: r.debt_to_equity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IncomeRecord {
    date: NaiveDate,
    #[serde(default)]
    eps: Option<f64>,
    #[serde(default)]
    epsdiluted: Option<f64>,
}

impl From<IncomeRecord> for IncomeStatement {
    fn from(r: IncomeRecord) -> Self {
        IncomeStatement {
            date: r.date,
            eps: r.eps,
            eps_diluted: r.epsdiluted,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CashFlowRecord {
    date: NaiveDate,
    #[serde(default, rename = "operatingCashFlow")]
    operating_cash_flow: Option<f64>,
    // FMP's own spelling
    #[serde(default, rename = "netCashUsedForInvestingActivites")]
    investing: Option<f64>,
    #[serde(default, rename = "netCashUsedProvidedByFinancingActivities")]
    financing: Option<f64>,
}

impl From<CashFlowRecord> for CashFlowStatement {
    fn from(r: CashFlowRecord) -> Self {
        CashFlowStatement {
            date: r.date,
            operating: r.operating_cash_flow,
            investing: r.investing,
            financing: r.financing,
        }
    }
}
