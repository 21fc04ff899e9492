//! CLI integration tests for the backtest command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config, build_strategy, build_data_port)
//! - Dry-run mode with real INI files on disk
//! - Full pipeline over session CSVs on disk, outputs included
//! - Overrides for symbol and output directory

mod common;

use common::*;
use minutebt::adapters::file_config_adapter::FileConfigAdapter;
use minutebt::cli;
use minutebt::domain::error::BacktestError;
use minutebt::domain::strategy::aroon::AroonParams;
use minutebt::domain::strategy::StrategyKind;
use minutebt::ports::data_port::DataPort;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Writes `{symbol}_{YYYYMMDD}.csv` files of `bars` generated bars each.
fn write_sessions(dir: &Path, symbol: &str, days: &[u32], bars: usize) {
    for (i, &key) in days.iter().enumerate() {
        let mut content = String::from(",open,close,high,low\n");
        for (j, (open, close)) in generate_prices(bars, 100.0, i as u64 + 1).iter().enumerate() {
            content.push_str(&format!(
                "{},{},{},{},{}\n",
                j,
                open,
                close,
                open.max(*close) + 0.1,
                open.min(*close) - 0.1
            ));
        }
        fs::write(dir.join(format!("{symbol}_{key}.csv")), content).unwrap();
    }
}

fn ini(data: &Path, output: &Path, extra_backtest: &str) -> String {
    format!(
        r#"
[data]
path = {data}
session_bars = 60

[backtest]
symbol = IM
cost_rate = 0.0
{extra_backtest}

[strategy]
kind = aroon
nday = 10
upband = 70
lowband = 30

[output]
dir = {output}
"#,
        data = data.display(),
        output = output.display(),
    )
}

const DAYS: [u32; 4] = [20240102, 20240103, 20240104, 20240105];

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_full() {
        let content = r#"
[data]
path = /data
session_bars = 240

[backtest]
symbol = IM
start_date = 20220101
end_date = 20221231
cost_rate = 0.0003
parallel = yes

[strategy]
kind = aroon
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        let strategy = cli::build_strategy(&adapter, "IM").unwrap();
        let config = cli::build_backtest_config(&adapter, &strategy, "IM").unwrap();

        assert_eq!(config.symbol, "IM");
        assert_eq!(config.start_date, Some(date(2022, 1, 1)));
        assert_eq!(config.end_date, Some(date(2022, 12, 31)));
        assert!((config.cost_rate - 0.0003).abs() < f64::EPSILON);
        assert_eq!(config.session_bars, Some(240));
        assert!(config.parallel);
    }

    #[test]
    fn build_strategy_defaults_per_kind() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nkind = AROON\n").unwrap();
        let strategy = cli::build_strategy(&adapter, "IF").unwrap();
        assert_eq!(strategy.name, "IF_aroon");
        assert_eq!(strategy.kind, StrategyKind::Aroon(AroonParams::default()));
    }

    #[test]
    fn build_strategy_missing_kind() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nnday = 5\n").unwrap();
        let err = cli::build_strategy(&adapter, "IM").unwrap_err();
        assert!(matches!(err, BacktestError::ConfigMissing { key, .. } if key == "kind"));
    }

    #[test]
    fn build_data_port_lists_sessions() {
        let dir = TempDir::new().unwrap();
        write_sessions(dir.path(), "IM", &DAYS, 5);
        let adapter = FileConfigAdapter::from_string(&format!(
            "[data]\npath = {}\n",
            dir.path().display()
        ))
        .unwrap();

        let port = cli::build_data_port(&adapter).unwrap();
        assert_eq!(port.list_sessions("IM").unwrap().len(), 4);
        assert_eq!(port.trading_days().unwrap()[0], date(2024, 1, 2));
    }

    #[test]
    fn build_data_port_requires_path() {
        let adapter = FileConfigAdapter::from_string("[data]\n").unwrap();
        let err = cli::build_data_port(&adapter).err().unwrap();
        assert!(matches!(err, BacktestError::ConfigMissing { key, .. } if key == "path"));
    }
}

mod dry_run {
    use super::*;

    #[test]
    fn dry_run_valid_config_succeeds() {
        let data = TempDir::new().unwrap();
        let file = write_temp_ini(&ini(data.path(), data.path(), "start_date = 20240101"));
        let (strategy, config) = cli::dry_run(file.path(), None).unwrap();
        assert_eq!(strategy.name, "IM_aroon");
        assert_eq!(config.start_date, Some(date(2024, 1, 1)));
        assert_eq!(config.session_bars, Some(60));
    }

    #[test]
    fn dry_run_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/path/config.ini");
        let err = cli::dry_run(&path, None).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigParse { .. }));
    }

    #[test]
    fn dry_run_unknown_kind_fails() {
        let content = "[data]\npath = /data\n[backtest]\nsymbol = IM\n[strategy]\nkind = macd\n";
        let file = write_temp_ini(content);
        let err = cli::dry_run(file.path(), None).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn dry_run_symbol_only_on_command_line() {
        let content = "[data]\npath = /data\n[backtest]\ncost_rate = 0\n[strategy]\nkind = adx\n";
        let file = write_temp_ini(content);

        let (strategy, config) = cli::dry_run(file.path(), Some("if")).unwrap();
        assert_eq!(config.symbol, "IF");
        assert_eq!(strategy.name, "IF_adx");

        let err = cli::dry_run(file.path(), None).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigMissing { key, .. } if key == "symbol"));
    }

    #[test]
    fn dry_run_symbol_override() {
        let content = "[data]\npath = /data\n[backtest]\nsymbol = IM\n[strategy]\nkind = ao\n";
        let file = write_temp_ini(content);
        let (strategy, config) = cli::dry_run(file.path(), Some("ic")).unwrap();
        assert_eq!(config.symbol, "IC");
        assert_eq!(strategy.name, "IC_ao");
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn backtest_writes_all_outputs() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_sessions(data.path(), "IM", &DAYS, 60);
        let file = write_temp_ini(&ini(data.path(), out.path(), ""));

        let summary = cli::execute_backtest(file.path(), None, None).unwrap();

        assert_eq!(summary.result.daily.len(), 4);
        assert!(summary.result.skipped.is_empty());
        assert_eq!(summary.report.days, 4);
        assert_eq!(summary.output_dir, out.path());

        for name in [
            "IM_aroon_trades.csv",
            "IM_aroon_minutes.csv",
            "IM_aroon.csv",
            "IM_aroon_summary.txt",
        ] {
            assert!(out.path().join(name).exists(), "{name} should be written");
        }

        let daily = fs::read_to_string(out.path().join("IM_aroon.csv")).unwrap();
        let lines: Vec<&str> = daily.lines().collect();
        assert_eq!(lines[0], "date,ret,cum_ret");
        assert!(lines[1].starts_with("20240102,"));
        assert_eq!(lines.len(), 5);

        let total: f64 = summary.result.trades.iter().map(|t| t.pnl).sum();
        let daily_total: f64 = summary.result.daily.iter().map(|d| d.ret).sum();
        assert!((total - daily_total).abs() < 1e-9);
    }

    #[test]
    fn wrong_length_and_missing_sessions_are_skipped() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_sessions(data.path(), "IM", &DAYS[..2], 60);
        write_sessions(data.path(), "IM", &DAYS[2..3], 59);
        // A calendar day with no file for IM.
        write_sessions(data.path(), "IF", &DAYS[3..], 60);
        let file = write_temp_ini(&ini(data.path(), out.path(), ""));

        let summary = cli::execute_backtest(file.path(), None, None).unwrap();

        assert_eq!(summary.result.daily.len(), 2);
        assert_eq!(summary.result.skipped.len(), 2);
        let text = fs::read_to_string(out.path().join("IM_aroon_summary.txt")).unwrap();
        assert!(text.contains("Skipped Sessions:  2"));
        assert!(text.contains("expected 60 bars, found 59"));
    }

    #[test]
    fn date_window_and_calendar_file() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_sessions(data.path(), "IM", &DAYS, 60);
        let calendar = data.path().join("days.csv");
        fs::write(&calendar, "TradingDayInt\n20240102\n20240103\n20240104\n20240105\n").unwrap();

        let extra = "start_date = 20240103\nend_date = 20240104\n";
        let content = ini(data.path(), out.path(), extra).replace(
            "session_bars = 60",
            &format!("session_bars = 60\ntrading_days = {}", calendar.display()),
        );
        let file = write_temp_ini(&content);

        let summary = cli::execute_backtest(file.path(), None, None).unwrap();
        let dates: Vec<_> = summary.result.daily.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 3), date(2024, 1, 4)]);
    }

    #[test]
    fn overrides_change_symbol_and_output() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let other = out.path().join("nested");
        write_sessions(data.path(), "IC", &DAYS, 60);
        let file = write_temp_ini(&ini(data.path(), out.path(), ""));

        let summary = cli::execute_backtest(file.path(), Some("ic"), Some(&other)).unwrap();

        assert_eq!(summary.strategy.name, "IC_aroon");
        assert_eq!(summary.result.daily.len(), 4);
        assert!(other.join("IC_aroon_summary.txt").exists());
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_sessions(data.path(), "IM", &DAYS, 60);

        let sequential = write_temp_ini(&ini(data.path(), out.path(), ""));
        let parallel = write_temp_ini(&ini(data.path(), out.path(), "parallel = true"));

        let a = cli::execute_backtest(sequential.path(), None, None).unwrap();
        let b = cli::execute_backtest(parallel.path(), None, None).unwrap();
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn invalid_config_fails_before_loading_data() {
        let file = write_temp_ini("[backtest]\nsymbol = IM\n[strategy]\nkind = aroon\n");
        let err = cli::execute_backtest(file.path(), None, None).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigMissing { key, .. } if key == "path"));
    }
}
