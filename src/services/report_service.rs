use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use log::{debug, info};

use crate::config::Config;
use crate::errors::{LookbackError, Result};
use crate::models::report::{LookbackChange, TickerReport};
use crate::providers::base::HistoryProvider;

/// 报告服务：逐个股票抓取历史行情并计算各回看期的涨跌幅
pub struct ReportService {
    config: Config,
    provider: Arc<dyn HistoryProvider + Send + Sync>,
}

impl ReportService {
    /// 创建新的报告服务实例
    pub fn new(config: Config, provider: Arc<dyn HistoryProvider + Send + Sync>) -> Self {
        Self { config, provider }
    }

    /// 为配置中的所有股票生成报告，顺序与配置一致
    ///
    /// 任一股票处理失败即中止整次运行，不会返回缺少回看期的
    /// 不完整报告。
    pub async fn build_reports(&self) -> Result<Vec<TickerReport>> {
        self.config.validate()?;

        let today = Local::now().date_naive();
        let mut reports = Vec::with_capacity(self.config.tickers.len());
        for ticker in &self.config.tickers {
            reports.push(self.build_report_as_of(ticker, today).await?);
        }
        Ok(reports)
    }

    /// 为单个股票生成报告
    pub async fn build_report(&self, ticker: &str) -> Result<TickerReport> {
        self.build_report_as_of(ticker, Local::now().date_naive())
            .await
    }

    /// 以指定基准日期生成单个股票的报告
    ///
    /// 抓取窗口为最大回看期加上安全余量，余量用于吸收窗口最早端
    /// 附近的周末和假日。
    async fn build_report_as_of(&self, ticker: &str, today: NaiveDate) -> Result<TickerReport> {
        let window_days = self.config.max_lookback_period() + self.config.fetch_margin_days;
        let start = today - Duration::days(window_days as i64);
        let end = today + Duration::days(1);

        info!(
            "Fetching {} days of history for {} from {}",
            window_days,
            ticker,
            self.provider.source_name()
        );
        let history = self.provider.fetch_daily_history(ticker, start, end).await?;
        if history.is_empty() {
            return Err(LookbackError::ProviderError(format!(
                "provider returned no data for {} between {} and {}",
                ticker, start, end
            )));
        }
        debug!(
            "{}: {} trading days between {:?} and {:?}",
            ticker,
            history.len(),
            history.min_date(),
            history.max_date()
        );

        let current = history.closing_price_as_of(today, 0)?;

        let mut report = TickerReport::new(ticker)?;
        for &period in &self.config.lookback_periods {
            let lookback = history
                .closing_price_as_of(today, period)
                .map_err(|e| match e {
                    LookbackError::DateOutOfRange(msg) => LookbackError::DateOutOfRange(format!(
                        "{} (ticker {}, lookback {} days)",
                        msg, ticker, period
                    )),
                    other => other,
                })?;
            report.push_change(LookbackChange::new(
                lookback.date,
                period,
                lookback.price,
                current.price,
            )?);
        }

        info!(
            "Built report for {} with {} lookback changes",
            ticker,
            report.changes.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use chrono::Datelike;

    use crate::history::PriceHistory;
    use crate::models::report::DailyQuote;

    /// 仅工作日有数据的内存假数据源，收盘价 = 基价 + 月内日序号
    struct FakeProvider {
        base_price: f64,
        empty: bool,
        // 若设置，只返回请求窗口末尾这么多天的数据
        max_coverage_days: Option<i64>,
    }

    impl FakeProvider {
        fn new(base_price: f64) -> Self {
            Self {
                base_price,
                empty: false,
                max_coverage_days: None,
            }
        }

        fn empty() -> Self {
            Self {
                base_price: 0.0,
                empty: true,
                max_coverage_days: None,
            }
        }

        fn with_coverage(base_price: f64, days: i64) -> Self {
            Self {
                base_price,
                empty: false,
                max_coverage_days: Some(days),
            }
        }
    }

    #[async_trait]
    impl HistoryProvider for FakeProvider {
        fn source_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_daily_history(
            &self,
            _symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<PriceHistory> {
            let mut history = PriceHistory::new();
            if self.empty {
                return Ok(history);
            }

            let mut date = match self.max_coverage_days {
                Some(days) => start.max(end - Duration::days(days)),
                None => start,
            };
            while date < end {
                // 周六、周日不是交易日
                if date.weekday().number_from_monday() <= 5 {
                    let close = self.base_price + date.day() as f64;
                    history.insert(DailyQuote {
                        date,
                        open: close,
                        high: close,
                        low: close,
                        close,
                        volume: 100,
                    });
                }
                date += Duration::days(1);
            }
            Ok(history)
        }
    }

    fn service(config: Config, provider: FakeProvider) -> ReportService {
        ReportService::new(config, Arc::new(provider))
    }

    #[tokio::test]
    async fn reports_preserve_ticker_and_period_order() {
        let config = Config::new()
            .with_tickers(vec!["VT".to_string(), "SPY".to_string()])
            .with_lookback_periods(vec![90, 30]);
        let service = service(config, FakeProvider::new(100.0));

        let reports = service.build_reports().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].ticker, "VT");
        assert_eq!(reports[1].ticker, "SPY");
        for report in &reports {
            let periods: Vec<u32> = report.changes.iter().map(|c| c.lookback_period).collect();
            assert_eq!(periods, vec![90, 30]);
        }
    }

    #[tokio::test]
    async fn change_percent_matches_definition() {
        let config = Config::new().with_lookback_periods(vec![10, 0]);
        let service = service(config, FakeProvider::new(100.0));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let report = service.build_report_as_of("VT", today).await.unwrap();

        for change in &report.changes {
            assert_relative_eq!(
                change.change_percent,
                (change.current_price - change.lookback_price) / change.lookback_price,
                epsilon = 1e-12
            );
        }
        // 回看 0 天时与当前价相同，涨跌幅为 0
        assert_relative_eq!(report.changes[1].change_percent, 0.0);
    }

    #[tokio::test]
    async fn weekend_lookback_resolves_to_friday() {
        // 2024-03-15 是周五；回看 5 天落在周日 3月10日，应解析到 3月8日（周五）
        let config = Config::new().with_lookback_periods(vec![5]);
        let service = service(config, FakeProvider::new(100.0));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let report = service.build_report_as_of("VT", today).await.unwrap();

        let change = &report.changes[0];
        assert_eq!(change.lookback_period, 5);
        assert_eq!(
            change.lookback_date,
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
        assert_relative_eq!(change.lookback_price, 108.0);
    }

    #[tokio::test]
    async fn lookback_past_history_start_aborts_ticker() {
        // 数据源只返回最近 7 天的数据，30 天回看期必然越界
        let config = Config::new().with_lookback_periods(vec![30]);
        let service = service(config, FakeProvider::with_coverage(100.0, 7));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let err = service.build_report_as_of("VT", today).await.unwrap_err();
        match err {
            LookbackError::DateOutOfRange(msg) => {
                assert!(msg.contains("VT"));
                assert!(msg.contains("30"));
            }
            other => panic!("expected DateOutOfRange, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_history_is_a_provider_error() {
        let config = Config::new();
        let service = service(config, FakeProvider::empty());

        let err = service.build_reports().await.unwrap_err();
        assert!(matches!(err, LookbackError::ProviderError(_)));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_any_fetch() {
        let config = Config::new().with_tickers(Vec::new());
        let service = service(config, FakeProvider::new(100.0));

        let err = service.build_reports().await.unwrap_err();
        assert!(matches!(err, LookbackError::InvalidInput(_)));
    }
}
