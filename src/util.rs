use crate::errors::{LookbackError, Result};

// 解析逗号分隔的股票代码列表
pub fn parse_symbol_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// 解析逗号分隔的回看期列表
pub fn parse_period_list(input: &str) -> Result<Vec<u32>> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| {
                LookbackError::InvalidInput(format!("invalid lookback period: {:?}", s))
            })
        })
        .collect()
}

/// 将比率格式化为带符号的百分比，如 `+4.27%`
pub fn format_percent(ratio: f64) -> String {
    format!("{:+.2}%", ratio * 100.0)
}
