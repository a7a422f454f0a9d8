//! One replay-query-export run

use crate::args::{Cli, NotionalRequest, PlaceRequest};
use anyhow::{Context, Result};
use depth_book::{BookEngine, LimitOrderOutcome};
use depth_feed::{write_levels_csv, FeedReader, OutputPrefix, Summary, LEVEL_DECIMALS};
use depth_types::Symbol;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// What a run wrote, for the console report
#[derive(Debug)]
pub struct RunReport {
    pub top_bids: PathBuf,
    pub top_asks: PathBuf,
    pub notional: Option<(NotionalRequest, Decimal)>,
    pub placement: Option<Placement>,
    pub summary: PathBuf,
}

#[derive(Debug)]
pub struct Placement {
    pub outcome: LimitOrderOutcome,
    pub preview: bool,
    pub bids: PathBuf,
    pub asks: PathBuf,
}

pub fn run(cli: &Cli) -> Result<RunReport> {
    // Validate every argument before touching the feed
    let symbol = cli.symbol()?;
    let config = cli.engine_config()?;
    let notional_request = cli.notional_request()?;
    let place_request = cli.place_request()?;

    let prefix = OutputPrefix::new(&cli.out_prefix);
    prefix.ensure_parent_dir()?;

    let started = Instant::now();
    let mut engine = BookEngine::with_config(config)?;
    let reader = FeedReader::from_path(&cli.file)?.for_symbol(symbol.as_str());
    let top = engine
        .build_until(symbol.as_str(), cli.until, reader)
        .with_context(|| format!("replaying {}", cli.file.display()))?;
    let elapsed = started.elapsed();
    info!(
        symbol = %symbol,
        until = cli.until,
        seconds = elapsed.as_secs_f64(),
        "book built"
    );

    let top_bids = prefix.top_bids();
    let top_asks = prefix.top_asks();
    write_levels_csv(&top_bids, &top.bids)?;
    write_levels_csv(&top_asks, &top.asks)?;

    let notional = match notional_request {
        Some(request) => {
            let book = engine.reference(symbol.as_str())?;
            let value = book.notional_ahead_on(request.side, request.price)?;
            Some((request, value))
        }
        None => None,
    };

    let placement = match place_request {
        Some(request) => Some(place(&mut engine, cli, &symbol, &prefix, request)?),
        None => None,
    };

    let mut summary = Summary::new();
    summary.insert("file", cli.file.display());
    summary.insert("symbol", &symbol);
    summary.insert("until", format!("{:?}", cli.until));
    summary.insert("process_seconds", format!("{:.6}", elapsed.as_secs_f64()));
    summary.insert("top10_bids_csv", top_bids.display());
    summary.insert("top10_asks_csv", top_asks.display());
    if let Some(stats) = engine.last_replay() {
        summary.insert("records_applied", stats.records_applied);
    }
    if let Some((request, value)) = &notional {
        summary.insert("notional_ahead", format!("{:.*}", LEVEL_DECIMALS, value));
        summary.insert("notional_side", &request.token);
        summary.insert("notional_price", &request.price_text);
    }
    if let Some(placement) = &placement {
        summary.insert("after_place_limit_bids_csv", placement.bids.display());
        summary.insert("after_place_limit_asks_csv", placement.asks.display());
        summary.insert("place_limit_filled", placement.outcome.filled());
        summary.insert("place_limit_rested", placement.outcome.rested);
        summary.insert("place_limit_preview", placement.preview);
    }

    let summary_path = prefix.summary();
    summary.write_csv(&summary_path)?;

    Ok(RunReport {
        top_bids,
        top_asks,
        notional,
        placement,
        summary: summary_path,
    })
}

fn place(
    engine: &mut BookEngine,
    cli: &Cli,
    symbol: &Symbol,
    prefix: &OutputPrefix,
    request: PlaceRequest,
) -> Result<Placement> {
    let book = engine.reference_mut(symbol.as_str())?;
    let outcome = if cli.preview {
        book.preview_limit_order(request.side, request.price, request.quantity)?
    } else {
        book.place_limit_order(request.side, request.price, request.quantity)?
    };
    info!(
        side = %request.side,
        price = %request.price,
        quantity = %request.quantity,
        filled = %outcome.filled(),
        rested = %outcome.rested,
        preview = cli.preview,
        "limit order placed"
    );

    let bids = prefix.after_place_limit_bids();
    let asks = prefix.after_place_limit_asks();
    write_levels_csv(&bids, &outcome.top.bids)?;
    write_levels_csv(&asks, &outcome.top.asks)?;

    Ok(Placement {
        outcome,
        preview: cli.preview,
        bids,
        asks,
    })
}

impl RunReport {
    /// Console lines printed after a successful run
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Done.".to_string(),
            "Top-10 written to:".to_string(),
            format!("  {}", self.top_bids.display()),
            format!("  {}", self.top_asks.display()),
        ];
        if let Some((request, value)) = &self.notional {
            lines.push(format!(
                "NotionalAhead({},{}) = {:.*}",
                request.token, request.price_text, LEVEL_DECIMALS, value
            ));
        }
        if let Some(placement) = &self.placement {
            lines.push(if placement.preview {
                "PlaceLimitOrder preview written to:".to_string()
            } else {
                "After PlaceLimitOrder written to:".to_string()
            });
            lines.push(format!("  {}", placement.bids.display()));
            lines.push(format!("  {}", placement.asks.display()));
        }
        lines.push(format!("Summary: {}", self.summary.display()));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use depth_types::BookError;
    use std::fs;
    use tempfile::TempDir;

    const FEED: &str = "\
symbol,time,bids,asks
BTC/USD,1.0,\"[[100, 1], [99, 2]]\",\"[[101, 1], [102, 3]]\"
BTC/USD,2.0,\"[[98, 4]]\",[]
BTC/USD,3.0,\"[[97, 1]]\",[]
";

    fn cli(dir: &TempDir, extra: &[&str]) -> Cli {
        let feed = dir.path().join("feed.csv");
        fs::write(&feed, FEED).unwrap();
        let prefix = dir.path().join("results/run1");

        let mut argv = vec![
            "depthbook".to_string(),
            "--file".to_string(),
            feed.display().to_string(),
            "--symbol".to_string(),
            "BTC/USD".to_string(),
            "--until".to_string(),
            "2".to_string(),
            "--out-prefix".to_string(),
            prefix.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    fn summary_value(report: &RunReport, key: &str) -> Option<String> {
        let text = fs::read_to_string(&report.summary).unwrap();
        text.lines()
            .skip(1)
            .filter_map(|line| line.split_once(','))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_run_writes_top_levels_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&cli(&dir, &["--notional-ahead", "ask", "102"])).unwrap();

        assert_eq!(
            fs::read_to_string(&report.top_bids).unwrap(),
            "price,quantity\n\
             100.0000000000,1.0000000000\n\
             99.0000000000,2.0000000000\n\
             98.0000000000,4.0000000000\n"
        );
        let (_, notional) = report.notional.as_ref().unwrap();
        assert_eq!(*notional, Decimal::from(407));

        assert_eq!(summary_value(&report, "symbol").as_deref(), Some("BTC/USD"));
        assert_eq!(summary_value(&report, "until").as_deref(), Some("2.0"));
        assert_eq!(summary_value(&report, "records_applied").as_deref(), Some("2"));
        assert_eq!(
            summary_value(&report, "notional_ahead").as_deref(),
            Some("407.0000000000")
        );
        assert!(report.placement.is_none());
        assert_eq!(report.lines()[0], "Done.");
    }

    #[test]
    fn test_run_place_limit_exports_new_top() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&cli(&dir, &["--place-limit", "buy", "101", "1.5"])).unwrap();

        let placement = report.placement.as_ref().unwrap();
        assert!(!placement.preview);
        assert_eq!(
            fs::read_to_string(&placement.asks).unwrap(),
            "price,quantity\n102.0000000000,3.0000000000\n"
        );
        assert_eq!(summary_value(&report, "place_limit_rested").as_deref(), Some("0.5"));
    }

    #[test]
    fn test_run_without_matching_records_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = cli(&dir, &["--notional-ahead", "bid", "100"]);
        args.symbol = "ETH/USD".to_string();

        let err = run(&args).unwrap_err();
        let book_err = err.downcast_ref::<BookError>().unwrap();
        assert!(book_err.is_not_found());
    }

    #[test]
    fn test_invalid_symbol_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = cli(&dir, &[]);
        args.symbol = "BTC USD".to_string();

        let err = run(&args).unwrap_err();
        assert!(err.downcast_ref::<BookError>().unwrap().is_invalid_argument());
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn test_notional_overflow_exits_with_overflow_code() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("large.csv");
        fs::write(
            &feed,
            "symbol,time,bids,asks\n\
             BTC/USD,1.0,\"[['1000000000000000', '100000000000000']]\",[]\n",
        )
        .unwrap();
        let mut args = cli(&dir, &["--notional-ahead", "bid", "1"]);
        args.file = feed;

        let err = run(&args).unwrap_err();
        let book_err = err.downcast_ref::<BookError>().unwrap();
        assert!(matches!(book_err, BookError::Overflow { .. }));
        assert_eq!(book_err.exit_code(), 6);
    }

    #[test]
    fn test_invalid_side_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = cli(&dir, &["--place-limit", "asks", "100", "1"]);

        let err = run(&args).unwrap_err();
        assert!(err.downcast_ref::<BookError>().unwrap().is_invalid_argument());
        assert!(!dir.path().join("results").exists());
    }
}
