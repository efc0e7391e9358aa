//! lncap CLI binary.
//!
//! Fetches CSI 300 constituent data from Tushare Pro and evaluates the log
//! market cap factor against next-day returns.

mod integration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use integration::config::{TOKEN_ENV, default_token_path, resolve_token};
use integration::data_pipeline::{
    CONSTITUENTS_FILE, MARKET_CAP_FILE, RETURNS_FILE, fetch_constituents, fetch_market_caps,
    fetch_returns, load_market_caps, load_returns, save_table, table_path,
};
use lncap::data::tushare::{DEFAULT_CAP_FIELD, TushareClient};
use lncap::data::{DateRange, FetchConfig};
use lncap::factors::LogMarketCapConfig;
use lncap::output::{DailyRecord, ExportFormat, Exporter};
use lncap::{FactorPipeline, IndexCode, IndexUniverse, Universe};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lncap")]
#[command(about = "lncap: log market cap factor research on CSI 300", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Date range and output location shared by every command.
#[derive(Args, Debug, Clone)]
struct PeriodArgs {
    /// First date (YYYYMMDD or YYYY-MM-DD)
    #[arg(long, default_value = "20090123")]
    start: String,

    /// Last date (YYYYMMDD or YYYY-MM-DD)
    #[arg(long, default_value = "20190430")]
    end: String,

    /// Directory holding the CSV tables
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl PeriodArgs {
    fn range(&self) -> Result<DateRange, Box<dyn std::error::Error>> {
        Ok(DateRange::parse(&self.start, &self.end)?)
    }
}

/// Connection settings for commands that call the API.
#[derive(Args, Debug, Clone)]
struct FetchArgs {
    #[command(flatten)]
    period: PeriodArgs,

    /// Index code
    #[arg(long, default_value = "399300.SZ")]
    index: String,

    /// Pause after each successful request, in milliseconds
    #[arg(long, default_value = "500")]
    delay_ms: u64,

    /// Tushare Pro API token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Token file used when no token is given
    #[arg(long)]
    token_file: Option<PathBuf>,
}

impl FetchArgs {
    fn client(&self) -> Result<TushareClient, Box<dyn std::error::Error>> {
        let token_file = self.token_file.clone().unwrap_or_else(default_token_path);
        let token = resolve_token(self.token.clone(), &token_file)?;
        Ok(TushareClient::new(token)?)
    }

    fn fetch_config(&self, cap_field: &str) -> FetchConfig {
        FetchConfig {
            rate_limit_delay: Duration::from_millis(self.delay_ms),
            cap_field: cap_field.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => Self::Csv,
            OutputFormat::Json => Self::PrettyJson,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch index constituents
    Constituents {
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Fetch floating market caps for every constituent
    FetchCaps {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Valuation field read as the floating market cap
        #[arg(long, default_value = DEFAULT_CAP_FIELD)]
        cap_field: String,

        /// Attach industry labels
        #[arg(long)]
        with_industry: bool,
    },

    /// Fetch close prices and compute next-day returns
    FetchReturns {
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Evaluate the log market cap factor
    Evaluate {
        #[command(flatten)]
        period: PeriodArgs,

        /// Market cap table (default: <out-dir>/hs300_mkt_cap.csv)
        #[arg(long)]
        caps: Option<PathBuf>,

        /// Returns table (default: <out-dir>/hs300_returns.csv)
        #[arg(long)]
        returns: Option<PathBuf>,

        /// Clipping width in MADs around the daily median
        #[arg(long, default_value = "5.0")]
        mad_multiple: f64,

        /// Write the daily IC / t-value series here
        #[arg(long)]
        daily_out: Option<PathBuf>,

        /// Write the summary here
        #[arg(long)]
        summary_out: Option<PathBuf>,

        /// Export format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Print the report as Markdown
        #[arg(long)]
        markdown: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Constituents { fetch } => {
            constituents(&fetch).await?;
        }
        Commands::FetchCaps {
            fetch,
            cap_field,
            with_industry,
        } => {
            fetch_caps(&fetch, &cap_field, with_industry).await?;
        }
        Commands::FetchReturns { fetch } => {
            fetch_return_table(&fetch).await?;
        }
        Commands::Evaluate {
            period,
            caps,
            returns,
            mad_multiple,
            daily_out,
            summary_out,
            format,
            markdown,
        } => {
            let caps = caps.unwrap_or_else(|| table_path(&period.out_dir, MARKET_CAP_FILE));
            let returns = returns.unwrap_or_else(|| table_path(&period.out_dir, RETURNS_FILE));
            let exports = Exports {
                daily_out,
                summary_out,
                format: format.into(),
            };
            evaluate(&period, &caps, &returns, mad_multiple, &exports, markdown)?;
        }
    }

    Ok(())
}

fn print_header(fetch: &FetchArgs, range: DateRange) {
    let index = IndexCode::from_code(&fetch.index)
        .map_or_else(|| fetch.index.clone(), |i| i.to_string());
    println!("Index: {}", index);
    println!("Period: {}", range);
    println!("Request delay: {} ms\n", fetch.delay_ms);
}

async fn load_universe(
    client: &TushareClient,
    fetch: &FetchArgs,
    range: DateRange,
) -> Result<IndexUniverse, Box<dyn std::error::Error>> {
    print!("Fetching constituents... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let records = fetch_constituents(client, &fetch.index, range).await?;
    let universe = IndexUniverse::from_records(&fetch.index, &records);
    println!(
        "✓ ({} stocks over {} dates)",
        universe.size(),
        universe.dates().len()
    );
    save_table(&fetch.period.out_dir, CONSTITUENTS_FILE, &records)?;
    Ok(universe)
}

async fn constituents(fetch: &FetchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let range = fetch.period.range()?;
    let client = fetch.client()?;
    print_header(fetch, range);

    load_universe(&client, fetch, range).await?;
    Ok(())
}

async fn fetch_caps(
    fetch: &FetchArgs,
    cap_field: &str,
    with_industry: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let range = fetch.period.range()?;
    let client = fetch.client()?;
    print_header(fetch, range);

    let universe = load_universe(&client, fetch, range).await?;
    let instruments = universe.symbols();

    let config = fetch.fetch_config(cap_field);
    let caps = fetch_market_caps(&client, &instruments, range, &config, with_industry).await?;
    save_table(&fetch.period.out_dir, MARKET_CAP_FILE, &caps)?;
    Ok(())
}

async fn fetch_return_table(fetch: &FetchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let range = fetch.period.range()?;
    let client = fetch.client()?;
    print_header(fetch, range);

    let universe = load_universe(&client, fetch, range).await?;
    let instruments = universe.symbols();

    let config = fetch.fetch_config(DEFAULT_CAP_FIELD);
    let prices = fetch_returns(&client, &instruments, range, &config).await?;
    save_table(&fetch.period.out_dir, RETURNS_FILE, &prices)?;
    Ok(())
}

struct Exports {
    daily_out: Option<PathBuf>,
    summary_out: Option<PathBuf>,
    format: ExportFormat,
}

fn evaluate(
    period: &PeriodArgs,
    caps_path: &Path,
    returns_path: &Path,
    mad_multiple: f64,
    exports: &Exports,
    markdown: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let range = period.range()?;

    print!("Loading {}... ", caps_path.display());
    std::io::Write::flush(&mut std::io::stdout())?;
    let caps = load_market_caps(caps_path)?;
    println!("✓ ({} rows)", caps.len());

    print!("Loading {}... ", returns_path.display());
    std::io::Write::flush(&mut std::io::stdout())?;
    let prices = load_returns(returns_path)?;
    println!("✓ ({} rows)", prices.len());

    let config = LogMarketCapConfig {
        mad_multiple,
        ..LogMarketCapConfig::default()
    };
    let pipeline = FactorPipeline::new().with_config(config).with_range(range);

    print!("Computing factor... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let output = pipeline.run(&caps, &prices)?;
    println!("✓");

    if output.missing > 0 {
        eprintln!(
            "Warning: {} market cap rows without a usable logarithm were dropped",
            output.missing
        );
    }
    println!(
        "Merged panel: {} observations over {} dates",
        output.observations.len(),
        output.daily.len()
    );

    if let Some(report) = output.report() {
        if markdown {
            println!("\n{}", report.to_markdown());
        } else {
            println!("{}", report.to_ascii_table());
        }
    }

    if let Some(path) = &exports.daily_out {
        DailyRecord::from_daily(&output.daily).export_to_file(path, exports.format)?;
        println!("Daily series written to {} ✓", path.display());
    }
    if let Some(path) = &exports.summary_out {
        output.summary.export_to_file(path, exports.format)?;
        println!("Summary written to {} ✓", path.display());
    }

    Ok(())
}
