use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use crate::errors::{LookbackError, Result};
use crate::history::PriceHistory;
use crate::models::report::DailyQuote;
use crate::providers::base::HistoryProvider;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance 历史行情数据提供者
pub struct YahooProvider {
    client: Client,
    last_request: Mutex<Option<Instant>>,
}

impl YahooProvider {
    /// 创建新的 Yahoo Finance 数据提供者
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(LookbackError::RequestError)?;

        Ok(Self {
            client,
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        const MIN_INTERVAL: Duration = Duration::from_millis(500);

        let now = Instant::now();
        let should_wait = {
            let mut last = self.last_request.lock().unwrap();
            let should_wait = if let Some(instant) = *last {
                let elapsed = instant.elapsed();
                if elapsed < MIN_INTERVAL {
                    Some(MIN_INTERVAL - elapsed)
                } else {
                    None
                }
            } else {
                None
            };
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("等待 {:?} 以遵守频率限制", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    fn unix_seconds(date: NaiveDate) -> i64 {
        // 午夜总是有效时刻
        date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp()
    }
}

#[async_trait]
impl HistoryProvider for YahooProvider {
    fn source_name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory> {
        if symbol.trim().is_empty() {
            return Err(LookbackError::InvalidInput(
                "ticker symbol is empty".to_string(),
            ));
        }

        info!("获取 {} 从 {} 到 {} 的日线数据", symbol, start, end);

        // 限制请求频率
        self.wait_for_rate_limit().await;

        let response = self
            .client
            .get(format!("{}/{}", CHART_URL, symbol))
            .query(&[
                ("period1", Self::unix_seconds(start).to_string()),
                ("period2", Self::unix_seconds(end).to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await
            .map_err(LookbackError::RequestError)?;

        let text = response.text().await?;
        let json: Value = serde_json::from_str(&text)?;
        let chart = json.get("chart").ok_or_else(|| {
            LookbackError::ProviderError(format!("{}: malformed chart response", symbol))
        })?;

        // Yahoo 在代码未知时返回 200 并在 error 字段中给出原因
        if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
            let description = error
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("unknown error");
            return Err(LookbackError::ProviderError(format!(
                "{}: {}",
                symbol, description
            )));
        }

        let result = chart
            .get("result")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
            .ok_or_else(|| {
                LookbackError::ProviderError(format!("{}: empty chart result", symbol))
            })?;

        let timestamps = result
            .get("timestamp")
            .and_then(|t| t.as_array())
            .cloned()
            .unwrap_or_default();

        let quote = result
            .pointer("/indicators/quote/0")
            .ok_or_else(|| {
                LookbackError::ProviderError(format!("{}: missing quote indicators", symbol))
            })?;

        let opens = quote.get("open").and_then(|v| v.as_array());
        let highs = quote.get("high").and_then(|v| v.as_array());
        let lows = quote.get("low").and_then(|v| v.as_array());
        let closes = quote.get("close").and_then(|v| v.as_array());
        let volumes = quote.get("volume").and_then(|v| v.as_array());

        let mut history = PriceHistory::new();
        for (i, ts) in timestamps.iter().enumerate() {
            let seconds = match ts.as_i64() {
                Some(s) => s,
                None => continue,
            };
            let date = match Utc.timestamp_opt(seconds, 0).single() {
                Some(dt) => dt.date_naive(),
                None => continue,
            };

            // 停牌或尚未收盘的交易日收盘价为 null，跳过
            let close = match closes.and_then(|c| c.get(i)).and_then(|c| c.as_f64()) {
                Some(c) => c,
                None => continue,
            };

            let field = |values: Option<&Vec<Value>>| {
                values
                    .and_then(|v| v.get(i))
                    .and_then(|v| v.as_f64())
                    .unwrap_or(close)
            };

            history.insert(DailyQuote {
                date,
                open: field(opens),
                high: field(highs),
                low: field(lows),
                close,
                volume: volumes
                    .and_then(|v| v.get(i))
                    .and_then(|v| v.as_i64())
                    .unwrap_or_default(),
            });
        }

        if history.is_empty() {
            return Err(LookbackError::ProviderError(format!(
                "{}: no usable daily data between {} and {}",
                symbol, start, end
            )));
        }

        debug!("获取到 {} 条日线记录", history.len());

        Ok(history)
    }
}
