use stock_lookback::config::Config;
use stock_lookback::models::report::TickerReport;
use stock_lookback::providers::yahoo::YahooProvider;
use stock_lookback::services::report_service::ReportService;
use stock_lookback::util;

use clap::{App, Arg};
use log::info;
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let matches = App::new("LookbackReport")
        .version("1.0.0")
        .about("Percentage price change over lookback windows, trading-day aware")
        .arg(
            Arg::with_name("tickers")
                .short('t')
                .long("tickers")
                .value_name("TICKERS")
                .help("Comma-separated ticker symbols")
                .takes_value(true)
                .default_value("VT"),
        )
        .arg(
            Arg::with_name("periods")
                .short('p')
                .long("periods")
                .value_name("PERIODS")
                .help("Comma-separated lookback periods in calendar days")
                .takes_value(true)
                .default_value("90,60,50,40,30,20,10"),
        )
        .arg(
            Arg::with_name("margin")
                .short('m')
                .long("margin")
                .value_name("DAYS")
                .help("Extra days fetched past the largest lookback period")
                .takes_value(true)
                .default_value("10"),
        )
        .get_matches();

    let tickers = util::parse_symbol_list(matches.value_of("tickers").unwrap());
    let periods = util::parse_period_list(matches.value_of("periods").unwrap())?;
    let margin = matches
        .value_of("margin")
        .unwrap()
        .parse::<u32>()
        .map_err(|e| format!("invalid margin: {}", e))?;

    let config = Config::new()
        .with_tickers(tickers)
        .with_lookback_periods(periods)
        .with_fetch_margin_days(margin);

    let provider = Arc::new(YahooProvider::new()?);
    let service = ReportService::new(config, provider);

    let reports = service.build_reports().await?;
    info!("Built {} ticker reports", reports.len());

    for report in &reports {
        print_report(report);
    }

    Ok(())
}

fn print_report(report: &TickerReport) {
    println!("Ticker: {}", report.ticker);
    for change in &report.changes {
        println!(
            "Lookback Period: {} days ({})",
            change.lookback_period, change.lookback_date
        );
        println!("Lookback Price: {:.2}", change.lookback_price);
        println!("Current Price: {:.2}", change.current_price);
        println!(
            "Price Change Percent: {}",
            util::format_percent(change.change_percent)
        );
        println!("{:-<40}", "");
    }
}
