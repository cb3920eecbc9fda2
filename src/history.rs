use std::collections::BTreeMap;

use chrono::{Duration, Local, NaiveDate};
use log::debug;

use crate::errors::{LookbackError, Result};
use crate::models::report::{DailyQuote, PricePoint};

/// 日线历史行情表，按交易日索引
///
/// 某个日期是否为有效交易日完全由数据决定：表中存在该日期的
/// 记录即为交易日，不查询任何假日日历。
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    quotes: BTreeMap<NaiveDate, DailyQuote>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self {
            quotes: BTreeMap::new(),
        }
    }

    /// 从行情记录列表创建历史表，重复日期以后出现的记录为准
    pub fn from_quotes(quotes: Vec<DailyQuote>) -> Self {
        let mut history = Self::new();
        for quote in quotes {
            history.insert(quote);
        }
        history
    }

    pub fn insert(&mut self, quote: DailyQuote) {
        self.quotes.insert(quote.date, quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// 表中最早的交易日
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.quotes.keys().next().copied()
    }

    /// 表中最新的交易日
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.quotes.keys().next_back().copied()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyQuote> {
        self.quotes.get(&date)
    }

    /// 交易日感知的收盘价查找
    ///
    /// 目标日期为 `today - days_ago`。若该日期不是交易日（周末、
    /// 假日或停牌），逐日向前回退，返回最近一个交易日的收盘价。
    /// 回退越过表中最早日期时返回 `DateOutOfRange`。
    pub fn closing_price_as_of(&self, today: NaiveDate, days_ago: u32) -> Result<PricePoint> {
        let requested = today - Duration::days(days_ago as i64);

        let min_date = self.min_date().ok_or_else(|| {
            LookbackError::DateOutOfRange(format!(
                "history table is empty, cannot resolve closing price for {}",
                requested
            ))
        })?;

        let mut target = requested;
        loop {
            if let Some(quote) = self.quotes.get(&target) {
                if target != requested {
                    debug!(
                        "requested date {} is not a trading day, resolved to {}",
                        requested, target
                    );
                }
                return PricePoint::new(target, quote.close);
            }

            target -= Duration::days(1);
            if target < min_date {
                return Err(LookbackError::DateOutOfRange(format!(
                    "no trading day at or before {} (history starts at {})",
                    requested, min_date
                )));
            }
        }
    }

    /// 以当前本地日期为基准的收盘价查找
    pub fn closing_price(&self, days_ago: u32) -> Result<PricePoint> {
        self.closing_price_as_of(Local::now().date_naive(), days_ago)
    }
}
