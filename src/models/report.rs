use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::{LookbackError, Result};

/// 单个交易日的原始行情记录
#[derive(Debug, Clone, Serialize)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// 某个交易日的收盘价
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    /// 创建收盘价记录，收盘价必须为正数
    pub fn new(date: NaiveDate, price: f64) -> Result<Self> {
        if price <= 0.0 || !price.is_finite() {
            return Err(LookbackError::InvalidInput(format!(
                "price must be positive, got {} for {}",
                price, date
            )));
        }
        Ok(Self { date, price })
    }
}

/// 单个回看期的涨跌幅
///
/// `lookback_period` 是请求的日历天数，`lookback_date` 是实际
/// 解析到的交易日，遇到周末或假日时两者会相差几天。
#[derive(Debug, Clone, Serialize)]
pub struct LookbackChange {
    pub lookback_date: NaiveDate,
    pub lookback_period: u32,
    pub lookback_price: f64,
    pub current_price: f64,
    pub change_percent: f64,
}

impl LookbackChange {
    /// 创建涨跌幅记录，涨跌幅由构造函数计算
    pub fn new(
        lookback_date: NaiveDate,
        lookback_period: u32,
        lookback_price: f64,
        current_price: f64,
    ) -> Result<Self> {
        if lookback_price <= 0.0 || !lookback_price.is_finite() {
            return Err(LookbackError::InvalidInput(format!(
                "lookback price must be positive, got {} for {}",
                lookback_price, lookback_date
            )));
        }
        if current_price <= 0.0 || !current_price.is_finite() {
            return Err(LookbackError::InvalidInput(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }
        Ok(Self {
            lookback_date,
            lookback_period,
            lookback_price,
            current_price,
            change_percent: (current_price - lookback_price) / lookback_price,
        })
    }
}

/// 单个股票的涨跌幅报告，回看期顺序与配置一致
#[derive(Debug, Clone, Serialize)]
pub struct TickerReport {
    pub ticker: String,
    pub changes: Vec<LookbackChange>,
}

impl TickerReport {
    /// 创建空报告，股票代码不能为空
    pub fn new(ticker: &str) -> Result<Self> {
        if ticker.trim().is_empty() {
            return Err(LookbackError::InvalidInput(
                "ticker symbol is empty".to_string(),
            ));
        }
        Ok(Self {
            ticker: ticker.to_string(),
            changes: Vec::new(),
        })
    }

    pub fn push_change(&mut self, change: LookbackChange) {
        self.changes.push(change);
    }
}
