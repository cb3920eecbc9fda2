use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::history::PriceHistory;

/// Base trait for daily price history providers
#[async_trait]
pub trait HistoryProvider {
    /// Name of the data source this provider talks to
    fn source_name(&self) -> &'static str;

    /// Fetch daily history for a symbol within [start, end)
    ///
    /// 返回按交易日索引的历史表；代码未知或网络失败时返回错误。
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory>;
}
