use ::barslast::prelude::*;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "barslast")]
#[command(about = "BARSLAST and dual moving average crossover evaluation for futures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //replay bars through the dual moving average strategy
    Run(RunArgs),

    //compute barslast for every row of a boolean csv column
    Barslast {
        //path to csv file
        #[arg(long)]
        data: PathBuf,

        //name of the condition column
        #[arg(long)]
        column: String,

        //output path for the per-row results
        #[arg(long)]
        output_csv: Option<PathBuf>,
    },

    //write the default configuration as json
    InitConfig {
        #[arg(long, default_value = "barslast.json")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    //json configuration file, flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    //path to csv data file
    #[arg(long)]
    data: Option<PathBuf>,

    //first trading date to replay (yyyy-mm-dd)
    #[arg(long)]
    start: Option<NaiveDate>,

    //last trading date to replay (yyyy-mm-dd)
    #[arg(long)]
    end: Option<NaiveDate>,

    //symbol to evaluate (eg DCE.m2401)
    #[arg(long)]
    symbol: Option<String>,

    //contract multiplier
    #[arg(long)]
    multiplier: Option<f64>,

    //short moving average window
    #[arg(long)]
    short: Option<usize>,

    //long moving average window
    #[arg(long)]
    long: Option<usize>,

    //account equity used for sizing
    #[arg(long)]
    capital: Option<f64>,

    //fraction of equity invested per signal
    #[arg(long, conflicts_with = "lots")]
    ratio: Option<f64>,

    //fixed lot count per signal
    #[arg(long)]
    lots: Option<u32>,

    //death cross action (flatten, reverse)
    #[arg(long)]
    death_action: Option<String>,

    //primary barslast condition (golden, death, close_above_long, short_above_long, close_eq:<price>, column:<name>)
    #[arg(long)]
    condition: Option<String>,

    //extra conditions to track, repeatable
    #[arg(long = "extra")]
    extra: Vec<String>,

    //csv holding column conditions, defaults to the data file
    #[arg(long)]
    condition_data: Option<PathBuf>,

    //log every condition distance each n bars, 0 disables
    #[arg(long)]
    report_every: Option<usize>,

    //output path for the per-bar report csv
    #[arg(long)]
    output_csv: Option<PathBuf>,
}

impl RunArgs {
    //applies command line overrides on top of the loaded configuration
    fn apply(self, config: &mut StrategyConfig) -> Result<()> {
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if self.start.is_some() {
            config.start = self.start;
        }
        if self.end.is_some() {
            config.end = self.end;
        }
        if let Some(symbol) = self.symbol {
            config.contract.symbol = symbol;
        }
        if let Some(multiplier) = self.multiplier {
            config.contract.multiplier = multiplier;
        }
        if let Some(short) = self.short {
            config.ma.short_window = short;
        }
        if let Some(long) = self.long {
            config.ma.long_window = long;
        }
        if let Some(capital) = self.capital {
            config.initial_capital = capital;
        }
        if let Some(ratio) = self.ratio {
            config.sizing = SizingMode::EquityFraction { ratio };
        }
        if let Some(lots) = self.lots {
            config.sizing = SizingMode::Fixed { lots };
        }
        if let Some(action) = self.death_action {
            config.death_cross_action = DeathCrossAction::parse(&action)
                .ok_or_else(|| anyhow::anyhow!("Unknown death cross action: {}", action))?;
        }
        if let Some(condition) = self.condition {
            config.condition = condition.parse()?;
        }
        if !self.extra.is_empty() {
            config.extra_conditions = self
                .extra
                .iter()
                .map(|s| s.parse::<ConditionKind>())
                .collect::<Result<_, _>>()?;
        }
        if self.condition_data.is_some() {
            config.condition_path = self.condition_data;
        }
        if let Some(report_every) = self.report_every {
            config.report_every = report_every;
        }
        if self.output_csv.is_some() {
            config.output_csv = self.output_csv;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_strategy(args)?,
        Commands::Barslast {
            data,
            column,
            output_csv,
        } => run_barslast(data, column, output_csv)?,
        Commands::InitConfig { path } => {
            StrategyConfig::default().to_json_file(&path)?;
            println!("Default configuration written to {:?}", path);
        }
    }

    Ok(())
}

fn run_strategy(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => StrategyConfig::from_json_file(path)?,
        None => StrategyConfig::default(),
    };
    args.apply(&mut config)?;

    if !config.date_range_is_valid() {
        anyhow::bail!(
            "Start date {:?} is after end date {:?}",
            config.start,
            config.end
        );
    }

    println!("Barslast Dual MA Runner");
    println!("=======================\n");

    //load data
    println!("Loading data from {:?}...", config.data_path);
    let all_bars = load_csv(&config.data_path)
        .context(format!("Failed to load data from {:?}", config.data_path))?;

    //filter by symbol and date range
    let symbol = config.contract.symbol.clone();
    let bars = filter_by_date_range(
        &filter_by_symbol(&all_bars, &symbol),
        config.start,
        config.end,
    );

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("Loaded {} bars for {}", bars.len(), symbol);
        println!("Date range: {} to {}\n", first.timestamp, last.timestamp);
    } else {
        anyhow::bail!("No data found for symbol {} in the requested date range", symbol);
    }

    let contract = config.contract.to_futures_contract()?;
    let strategy = config.build_strategy()?;
    let evaluator = *strategy.evaluator();

    let mut runner_config = config.runner_config();
    runner_config.columns = config.load_condition_columns()?;

    println!(
        "Strategy: {} (short={}, long={})",
        strategy.name(),
        evaluator.short_window(),
        evaluator.long_window()
    );
    println!("Contract: {} (multiplier: {})", contract.symbol, contract.multiplier);
    println!("Capital: {:.2}", config.initial_capital);
    println!("Condition: {}\n", config.condition);

    let mut runner = StrategyRunner::new(Box::new(strategy), runner_config)?;
    let extra_names = runner.extra_names();

    let mut guard = SessionGuard::open(ReplaySession::new(bars, contract, config.initial_capital));
    let result = runner.run(&mut guard)?;

    println!("\nRun Summary");
    println!("===========\n");
    result.summary.pretty_print_table();

    if let Some(path) = &config.output_csv {
        write_records_csv(&result.records, &extra_names, path)?;
        println!("\nResults saved to {:?}", path);
    }

    Ok(())
}

fn run_barslast(data: PathBuf, column: String, output_csv: Option<PathBuf>) -> Result<()> {
    let values = load_column(&data, &column)?;
    let distances = barslast_series(&values)
        .context(format!("Column '{}' cannot be used as a condition", column))?;
    let latest = barslast_values(&values)?;

    match output_csv {
        Some(path) => {
            let mut writer = csv::Writer::from_path(&path)
                .context(format!("Failed to create CSV file: {:?}", path))?;
            writer.write_record(["row", "barslast"])?;
            for (row, distance) in distances.iter().enumerate() {
                writer.write_record([row.to_string(), distance.to_string()])?;
            }
            writer.flush()?;
            println!("Results saved to {:?}", path);
        }
        None => {
            for (row, distance) in distances.iter().enumerate() {
                println!("{},{}", row, distance);
            }
        }
    }

    println!("BARSLAST({}) at last row: {}", column, latest);
    Ok(())
}
