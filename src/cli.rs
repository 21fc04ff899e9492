//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, eligible_days, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    optional_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::BacktestError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::session::date_key;
use crate::domain::signal::SignalSource;
use crate::domain::strategy::ac::AcParams;
use crate::domain::strategy::adx::AdxParams;
use crate::domain::strategy::alligator::AlligatorParams;
use crate::domain::strategy::ao::AoParams;
use crate::domain::strategy::aroon::AroonParams;
use crate::domain::strategy::bollinger::BollingerParams;
use crate::domain::strategy::regression::RegressionParams;
use crate::domain::strategy::{Strategy, StrategyKind};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_SESSION_BARS: i64 = 229;

#[derive(Parser, Debug)]
#[command(name = "minutebt", about = "Intraday minute-bar strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [backtest] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Override [output] dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List trading days with stored sessions for the configured symbol
    Days {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, symbol.as_deref())
            } else {
                run_backtest(&config, symbol.as_deref(), output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Days { config, symbol } => run_days(&config, symbol.as_deref()),
    }
}

fn fail(err: &BacktestError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Load and fully validate a config, returning the adapter.
fn load_validated(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_backtest_config(&adapter)?;
    validate_strategy_config(&adapter)?;
    Ok(adapter)
}

pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, BacktestError> {
    let value = config.get_int("strategy", key, default as i64);
    match usize::try_from(value) {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(BacktestError::invalid("strategy", key, "must be at least 1")),
    }
}

fn kind_from_config(config: &dyn ConfigPort) -> Result<StrategyKind, BacktestError> {
    let kind = config
        .get_string("strategy", "kind")
        .ok_or_else(|| BacktestError::missing("strategy", "kind"))?
        .to_lowercase();
    let num = |key: &str, default: f64| config.get_double("strategy", key, default);

    let kind = match kind.as_str() {
        "aroon" => {
            let d = AroonParams::default();
            StrategyKind::Aroon(AroonParams {
                nday: period(config, "nday", d.nday)?,
                upband: num("upband", d.upband),
                lowband: num("lowband", d.lowband),
            })
        }
        "bollinger" => {
            let d = BollingerParams::default();
            StrategyKind::Bollinger(BollingerParams {
                mday: period(config, "mday", d.mday)?,
                nday: period(config, "nday", d.nday)?,
                nstd: num("nstd", d.nstd),
            })
        }
        "alligator" => {
            let d = AlligatorParams::default();
            StrategyKind::Alligator(AlligatorParams {
                fast: period(config, "fast", d.fast)?,
                mid: period(config, "mid", d.mid)?,
                slow: period(config, "slow", d.slow)?,
            })
        }
        "ac" => {
            let d = AcParams::default();
            StrategyKind::Ac(AcParams {
                n1: period(config, "n1", d.n1)?,
                n2: period(config, "n2", d.n2)?,
                trend: period(config, "trend", d.trend)?,
            })
        }
        "adx" => {
            let d = AdxParams::default();
            StrategyKind::Adx(AdxParams {
                n: period(config, "n", d.n)?,
                threshold: num("threshold", d.threshold),
                trend: period(config, "trend", d.trend)?,
                band: num("band", d.band),
            })
        }
        "ao" => {
            let d = AoParams::default();
            StrategyKind::Ao(AoParams {
                nday: period(config, "nday", d.nday)?,
                mday: period(config, "mday", d.mday)?,
            })
        }
        "regression" => {
            let d = RegressionParams::default();
            StrategyKind::Regression(RegressionParams {
                lookback: period(config, "lookback", d.lookback)?,
                slope: num("slope", d.slope),
                r2: num("r2", d.r2),
                jump: num("jump", d.jump),
            })
        }
        other => {
            return Err(BacktestError::invalid(
                "strategy",
                "kind",
                format!("unknown kind '{other}'"),
            ));
        }
    };
    Ok(kind)
}

pub fn build_strategy(config: &dyn ConfigPort, symbol: &str) -> Result<Strategy, BacktestError> {
    let mut strategy = Strategy::new(symbol, kind_from_config(config)?);
    if let Some(name) = config.get_string("strategy", "name") {
        strategy.name = name;
    }
    strategy.min_date = optional_date(config, "strategy", "min_date")?;
    Ok(strategy)
}

/// The backtest window starts at the later of `start_date` and the
/// strategy's `min_date`.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    strategy: &Strategy,
    symbol: &str,
) -> Result<BacktestConfig, BacktestError> {
    let start = optional_date(config, "backtest", "start_date")?;
    let start_date = match (start, strategy.min_date) {
        (Some(s), Some(m)) => Some(s.max(m)),
        (s, m) => s.or(m),
    };

    let session_bars = config.get_int("data", "session_bars", DEFAULT_SESSION_BARS);
    let session_bars = match usize::try_from(session_bars) {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(_) => {
            return Err(BacktestError::invalid(
                "data",
                "session_bars",
                "session_bars must be non-negative",
            ));
        }
    };

    Ok(BacktestConfig {
        symbol: symbol.to_string(),
        start_date,
        end_date: optional_date(config, "backtest", "end_date")?,
        cost_rate: config.get_double("backtest", "cost_rate", 0.0),
        session_bars,
        parallel: config.get_bool("backtest", "parallel", false),
    })
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, BacktestError> {
    let path = config
        .get_string("data", "path")
        .ok_or_else(|| BacktestError::missing("data", "path"))?;
    let adapter = CsvAdapter::new(PathBuf::from(path));
    Ok(match config.get_string("data", "trading_days") {
        Some(days) => adapter.with_trading_days(PathBuf::from(days)),
        None => adapter,
    })
}

fn resolve(
    adapter: &FileConfigAdapter,
    symbol_override: Option<&str>,
) -> Result<(Strategy, BacktestConfig), BacktestError> {
    let symbol = resolve_symbol(symbol_override, adapter)
        .ok_or_else(|| BacktestError::missing("backtest", "symbol"))?;
    let strategy = build_strategy(adapter, &symbol)?;
    let bt_config = build_backtest_config(adapter, &strategy, &symbol)?;
    Ok((strategy, bt_config))
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub strategy: Strategy,
    pub result: BacktestResult,
    pub report: PerformanceReport,
    pub output_dir: PathBuf,
}

/// Load config, run the backtest and write its outputs.
pub fn execute_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<RunSummary, BacktestError> {
    // Stage 1: Load and validate config
    let adapter = load_validated(config_path)?;

    // Stage 2: Resolve strategy and backtest window
    let (strategy, bt_config) = resolve(&adapter, symbol_override)?;
    eprintln!("Loading strategy: {}", strategy.name);

    let output_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("output", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    // Stage 3: Trading calendar
    let data_port = build_data_port(&adapter)?;
    let days = data_port.trading_days()?;

    eprintln!(
        "Running backtest: {} from {} to {}",
        bt_config.symbol,
        bt_config.start_date.map_or("-".to_string(), |d| date_key(d).to_string()),
        bt_config.end_date.map_or("-".to_string(), |d| date_key(d).to_string()),
    );
    eprintln!("  Processing: {} dates", eligible_days(&days, &bt_config).len());

    // Stage 4: Run
    let mut processed = 0usize;
    let result = backtest_engine::run_backtest(
        &data_port,
        &days,
        &bt_config,
        || strategy.build(),
        |_, _| processed += 1,
    )?;

    // Stage 5: Metrics and console summary
    let report = PerformanceReport::compute(&result.daily, &result.trades);
    eprintln!(
        "  Processed: {} sessions, skipped {}",
        processed,
        result.skipped.len()
    );
    eprintln!("\n=== {} ===", strategy.name);
    eprintln!("{report}");

    // Stage 6: Write outputs
    CsvReportAdapter::new(output_dir.clone()).write(&strategy.name, &result, &report)?;
    eprintln!("\nResults written to: {}", output_dir.display());

    Ok(RunSummary {
        strategy,
        result,
        report,
        output_dir,
    })
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
) -> ExitCode {
    match execute_backtest(config_path, symbol_override, output_override) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Validate config and resolve the run without loading any data.
pub fn dry_run(
    config_path: &Path,
    symbol_override: Option<&str>,
) -> Result<(Strategy, BacktestConfig), BacktestError> {
    let adapter = load_validated(config_path)?;
    eprintln!("Config validated successfully");

    let (strategy, bt_config) = resolve(&adapter, symbol_override)?;
    let source = strategy.build();

    eprintln!("\nStrategy:");
    eprintln!("  name:    {}", strategy.name);
    eprintln!("  kind:    {}", strategy.kind.label());
    eprintln!("  signal:  {}", source.name());
    eprintln!("  policy:  {:?}", source.policy());
    eprintln!("  warmup:  {} bars", source.warmup_bars());

    eprintln!("\nBacktest:");
    eprintln!("  symbol:       {}", bt_config.symbol);
    if let Some(d) = bt_config.start_date {
        eprintln!("  start:        {}", date_key(d));
    }
    if let Some(d) = bt_config.end_date {
        eprintln!("  end:          {}", date_key(d));
    }
    eprintln!("  cost_rate:    {}", bt_config.cost_rate);
    match bt_config.session_bars {
        Some(n) => eprintln!("  session_bars: {}", n),
        None => eprintln!("  session_bars: unchecked"),
    }
    eprintln!("  parallel:     {}", bt_config.parallel);

    eprintln!("\nDry run complete: configuration is valid");
    Ok((strategy, bt_config))
}

pub fn run_dry_run(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    match dry_run(config_path, symbol_override) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let checked = load_validated(config_path).and_then(|adapter| resolve(&adapter, None));
    match checked {
        Ok(_) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_days(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let Some(symbol) = resolve_symbol(symbol_override, &config) else {
        return fail(&BacktestError::missing("backtest", "symbol"));
    };
    let data_port = match build_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let days = match data_port.list_sessions(&symbol) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    if days.is_empty() {
        eprintln!("No sessions found for {}", symbol);
    } else {
        for day in &days {
            println!("{}", date_key(*day));
        }
        eprintln!("{} sessions found for {}", days.len(), symbol);
    }
    ExitCode::SUCCESS
}
