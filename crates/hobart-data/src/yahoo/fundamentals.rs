//! Fundamental ratio fetching from Yahoo Finance.
//!
//! Pulls the four ratios the value and quality factors consume from the
//! quoteSummary endpoint. Absent fields stay `None`; scoring treats them as
//! worst-rank rather than excluding the stock.

use crate::error::{DataError, Result};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "summaryDetail,financialData,defaultKeyStatistics";

/// The fundamental ratios a snapshot is built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FundamentalFacts {
    /// Trailing price-to-earnings ratio.
    pub trailing_pe: Option<f64>,
    /// Price-to-book ratio.
    pub price_to_book: Option<f64>,
    /// Return on equity.
    pub return_on_equity: Option<f64>,
    /// Debt-to-equity ratio.
    pub debt_to_equity: Option<f64>,
}

/// Yahoo Finance fundamentals provider with rate limiting.
#[derive(Debug)]
pub struct YahooFundamentalsProvider {
    client: reqwest::Client,
    rate_limit_delay: Duration,
}

impl YahooFundamentalsProvider {
    /// Create a provider with default rate limiting (1 req/sec).
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
                .build()
                .expect("Failed to create HTTP client"),
            rate_limit_delay: Duration::from_millis(1000),
        }
    }

    /// Create a provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
                .build()
                .expect("Failed to create HTTP client"),
            rate_limit_delay,
        }
    }

    /// Fetch the latest known fundamental ratios for a symbol.
    pub async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalFacts> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!("{}/{}", QUOTE_SUMMARY_URL, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", MODULES)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::YahooApi(format!(
                "quoteSummary returned {} for {}",
                response.status(),
                symbol
            )));
        }

        let body: Value = response.json().await?;
        let facts = parse_quote_summary(&body, symbol)?;

        // Apply rate limiting.
        sleep(self.rate_limit_delay).await;

        Ok(facts)
    }
}

impl Default for YahooFundamentalsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the four ratios from a quoteSummary response body.
fn parse_quote_summary(body: &Value, symbol: &str) -> Result<FundamentalFacts> {
    let result = body
        .pointer("/quoteSummary/result/0")
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "Empty quoteSummary result".to_string(),
        })?;

    Ok(FundamentalFacts {
        trailing_pe: raw_number(result, "/summaryDetail/trailingPE/raw"),
        price_to_book: raw_number(result, "/defaultKeyStatistics/priceToBook/raw"),
        return_on_equity: raw_number(result, "/financialData/returnOnEquity/raw"),
        debt_to_equity: raw_number(result, "/financialData/debtToEquity/raw"),
    })
}

fn raw_number(value: &Value, pointer: &str) -> Option<f64> {
    value.pointer(pointer).and_then(Value::as_f64)
}
