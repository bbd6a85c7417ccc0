//! Close-price fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime};
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// One downloaded daily close.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClose {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price (adjusted).
    pub close: f64,
    /// Traded volume.
    pub volume: u64,
}

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider with default rate limiting (1 req/sec).
    pub fn new() -> Self {
        Self {
            provider: yahoo::YahooConnector::new().expect("Failed to create Yahoo connector"),
            rate_limit_delay: Duration::from_millis(1000),
        }
    }

    /// Create a provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Self {
        Self {
            provider: yahoo::YahooConnector::new().expect("Failed to create Yahoo connector"),
            rate_limit_delay,
        }
    }

    /// Fetch daily closes for a single symbol over `[start, end]`.
    pub async fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Convert chrono dates to time::OffsetDateTime at midnight UTC.
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        let start_time = time::OffsetDateTime::from_unix_timestamp(start_ts)
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end_ts)
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let mut closes = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let date = DateTime::from_timestamp(quote.timestamp as i64, 0)
                .ok_or_else(|| {
                    DataError::TimeConversion(format!("Bad quote timestamp: {}", quote.timestamp))
                })?
                .date_naive();
            closes.push(DailyClose {
                date,
                close: quote.adjclose,
                volume: quote.volume,
            });
        }

        // Apply rate limiting.
        sleep(self.rate_limit_delay).await;

        Ok(closes)
    }

    /// Fetch closes for multiple symbols.
    ///
    /// Symbols that fail to download are reported and dropped, matching the
    /// "missing tickers are dropped, not errored" provider contract.
    pub async fn fetch_closes_batch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, Vec<DailyClose>)>> {
        let mut all = Vec::new();

        for symbol in symbols {
            match self.fetch_closes(symbol, start, end).await {
                Ok(closes) => all.push((symbol.clone(), closes)),
                Err(e) => {
                    eprintln!("Warning: Failed to fetch data for {}: {}", symbol, e);
                    continue;
                }
            }
        }

        if all.is_empty() {
            return Err(DataError::MissingData {
                symbol: "batch".to_string(),
                reason: "No data fetched for any symbol".to_string(),
            });
        }

        Ok(all)
    }
}

impl Default for YahooQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}
