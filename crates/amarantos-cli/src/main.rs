//! amarantos — rank lifestyle interventions by conservative expected benefit.

use amarantos_cli::config;
use amarantos_cli::loader::YamlChoiceSource;
use amarantos_cli::render::{self, OutputFormat};
use amarantos_common::{EngineConfig, SortKey};
use amarantos_ranker::source::ChoiceSource;
use amarantos_ranker::value::rank_by_net_value;
use amarantos_ranker::Ranker;
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "amarantos", version, about = "Evidence-weighted ranking of lifestyle choices")]
struct Cli {
    /// Directory of `<domain>/<choice>.yaml` files
    #[arg(long, global = true, default_value = "data/choices")]
    data_dir: PathBuf,

    /// Engine config (TOML or YAML); overrides AMARANTOS_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank choices by a low percentile of total life-year impact
    Rank(RankArgs),
    /// List choices per domain with their evidence verdict
    List(ListArgs),
    /// Rank choices by net annual dollar value
    Value(ValueArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Percentile,
    CostEfficiency,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Percentile => SortKey::ByPercentile,
            SortArg::CostEfficiency => SortKey::ByCostEfficiency,
        }
    }
}

#[derive(Args)]
struct RankArgs {
    /// Only rank this domain
    #[arg(long)]
    domain: Option<String>,

    /// Percentile in (0, 1) used as the score
    #[arg(long)]
    percentile: Option<f64>,

    /// Maximum annual cost in USD
    #[arg(long)]
    max_cost: Option<f64>,

    /// Maximum annual time in hours
    #[arg(long)]
    max_hours: Option<f64>,

    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Keep at most this many choices per domain
    #[arg(long)]
    max_per_domain: Option<usize>,

    /// Show only the top N and bottom N results
    #[arg(short = 'n', long)]
    top: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    domain: Option<String>,
}

#[derive(Args)]
struct ValueArgs {
    #[arg(long)]
    domain: Option<String>,

    /// Dollar value of one hour of your time
    #[arg(long)]
    dollars_per_hour: Option<f64>,

    /// Dollar value of one just-noticeable wellbeing difference per year
    #[arg(long)]
    dollars_per_wellbeing_unit: Option<f64>,

    /// Dollar value of one additional life-year
    #[arg(long = "dollars-per-year")]
    dollars_per_life_year: Option<f64>,

    /// Show only the best N and worst N choices
    #[arg(short = 'n', long)]
    top: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("amarantos=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let source = YamlChoiceSource::new(&cli.data_dir);
    info!(data_dir = %cli.data_dir.display(), "Amarantos starting");

    match cli.command {
        Command::Rank(args) => run_rank(&source, config, args),
        Command::List(args) => run_list(&source, &config, args),
        Command::Value(args) => run_value(&source, config, args),
    }
}

fn run_rank(source: &dyn ChoiceSource, config: EngineConfig, args: RankArgs) -> anyhow::Result<()> {
    let mut options = config.ranking.clone();
    if let Some(domain) = args.domain {
        options = options.with_domain(domain);
    }
    if let Some(p) = args.percentile {
        options.percentile = p;
    }
    if let Some(max) = args.max_cost {
        options = options.with_max_cost(max);
    }
    if let Some(max) = args.max_hours {
        options = options.with_max_hours(max);
    }
    if let Some(sort) = args.sort {
        options = options.with_sort_key(sort.into());
    }
    if let Some(k) = args.max_per_domain {
        options = options.with_max_per_domain(k);
    }

    let choices = source
        .load_choices(options.domain_filter.as_deref())
        .context("Failed to load choices")?;
    let ranker = Ranker::from_config(&config)?;
    let outcome = ranker.rank(&choices, &options)?;

    render::write_rejected(&mut std::io::stderr().lock(), &outcome.rejected)?;
    let mut stdout = std::io::stdout().lock();
    render::write_ranking(&mut stdout, &outcome, args.format, args.top)?;
    stdout.flush()?;
    Ok(())
}

fn run_list(source: &dyn ChoiceSource, config: &EngineConfig, args: ListArgs) -> anyhow::Result<()> {
    let choices = source
        .load_choices(args.domain.as_deref())
        .context("Failed to load choices")?;
    let ranker = Ranker::from_config(config)?;
    let outcome = ranker.score_all(&choices, config.ranking.percentile);

    render::write_rejected(&mut std::io::stderr().lock(), &outcome.rejected)?;
    let mut stdout = std::io::stdout().lock();
    render::write_catalogue(&mut stdout, &outcome.entries, args.domain.as_deref())?;
    stdout.flush()?;
    Ok(())
}

fn run_value(source: &dyn ChoiceSource, config: EngineConfig, args: ValueArgs) -> anyhow::Result<()> {
    let mut rates = config.valuation.clone();
    if let Some(v) = args.dollars_per_hour {
        rates.dollars_per_hour = v;
    }
    if let Some(v) = args.dollars_per_wellbeing_unit {
        rates.dollars_per_wellbeing_unit = v;
    }
    if let Some(v) = args.dollars_per_life_year {
        rates.dollars_per_life_year = v;
    }

    let choices = source
        .load_choices(args.domain.as_deref())
        .context("Failed to load choices")?;
    let ranker = Ranker::from_config(&config)?;
    let mut outcome = rank_by_net_value(&ranker, &choices, &rates)?;
    if let Some(n) = args.top {
        render::keep_top_and_bottom(&mut outcome.entries, n);
    }

    render::write_rejected(&mut std::io::stderr().lock(), &outcome.rejected)?;
    let mut stdout = std::io::stdout().lock();
    render::write_valuation(&mut stdout, &outcome, args.format)?;
    stdout.flush()?;
    Ok(())
}
