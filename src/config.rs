use crate::errors::{LookbackError, Result};

/// 报告配置：股票列表、回看期列表与抓取安全余量
pub struct Config {
    pub tickers: Vec<String>,
    pub lookback_periods: Vec<u32>,
    pub fetch_margin_days: u32,
}

impl Config {
    pub fn new() -> Self {
        Self {
            tickers: vec!["VT".to_string()],
            lookback_periods: vec![90, 60, 50, 40, 30, 20, 10],
            fetch_margin_days: 10,
        }
    }

    pub fn with_tickers(mut self, tickers: Vec<String>) -> Self {
        self.tickers = tickers;
        self
    }

    pub fn with_lookback_periods(mut self, periods: Vec<u32>) -> Self {
        self.lookback_periods = periods;
        self
    }

    pub fn with_fetch_margin_days(mut self, days: u32) -> Self {
        self.fetch_margin_days = days;
        self
    }

    /// 最大回看期，用于确定抓取窗口
    pub fn max_lookback_period(&self) -> u32 {
        self.lookback_periods.iter().copied().max().unwrap_or(0)
    }

    /// 校验配置，拒绝空列表与空代码
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(LookbackError::InvalidInput(
                "ticker list is empty".to_string(),
            ));
        }
        if let Some(bad) = self.tickers.iter().find(|t| t.trim().is_empty()) {
            return Err(LookbackError::InvalidInput(format!(
                "ticker symbol is empty: {:?}",
                bad
            )));
        }
        if self.lookback_periods.is_empty() {
            return Err(LookbackError::InvalidInput(
                "lookback period list is empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
