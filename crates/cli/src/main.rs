//! Condo explorer CLI
//!
//! Runs the listings pipeline over a CSV file or JSON document export and
//! prints the page data as JSON.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use condo_core::config::ChartConfig;
use condo_core::{Config, FilterCriteria, ListingQuery, PriceTier};
use condo_features::filter::{building_names, listing_bedroom_options};
use condo_features::{Column, DashboardEngine, Histogram, NumericChart};
use condo_ingestion::{CsvFileSource, JsonDocumentSource, RecordSource, SnapshotCache};

#[derive(Parser)]
#[command(name = "condo-explorer")]
#[command(about = "Condo rental listings: price tiers, building summaries and distributions")]
#[command(version)]
struct Cli {
    /// Listings file (.csv, .json, .jsonl or .ndjson)
    #[arg(short, long, global = true, default_value = "data_cleaned.csv")]
    source: PathBuf,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classified, jittered map markers
    Map {
        /// Tiers to show (low, medium, high); repeat for several
        #[arg(short, long, value_parser = parse_tier)]
        tier: Vec<PriceTier>,
    },

    /// Building summaries passing the filters
    Summaries {
        #[command(flatten)]
        filters: FilterArgs,

        /// Start from the map page defaults
        #[arg(long)]
        defaults: bool,
    },

    /// Listings of one building
    Listings {
        /// Building name; omit to list the names
        #[arg(short, long)]
        building: Option<String>,
    },

    /// Listings for the price scatter, by bedrooms and price range
    Scatter {
        /// Accepted bedroom counts; repeat for several
        #[arg(long)]
        bedrooms: Vec<u32>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,
    },

    /// Distribution of one column
    Describe {
        /// Column name (price, bedrooms, bathrooms, floor_area, rating,
        /// transit_distance, building_name, agent_name)
        #[arg(long, value_parser = parse_column)]
        column: Column,

        /// Show a box plot summary instead of a histogram
        #[arg(long)]
        box_plot: bool,
    },

    /// Equal-width histogram of a numeric column
    Histogram {
        #[arg(long, value_parser = parse_column, default_value = "price")]
        column: Column,

        /// Bin count; defaults to the configured bins for the column
        #[arg(long)]
        bins: Option<usize>,
    },

    /// Dataset overview with the price histogram
    Overview,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    bedrooms: Option<u32>,

    #[arg(long)]
    bathrooms: Option<u32>,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    #[arg(long)]
    min_area: Option<f64>,

    #[arg(long)]
    max_area: Option<f64>,

    #[arg(long)]
    min_rating: Option<f64>,
}

impl FilterArgs {
    /// Overlay the given flags on `base`.
    fn apply_to(&self, mut base: FilterCriteria) -> FilterCriteria {
        base.bedrooms = self.bedrooms.or(base.bedrooms);
        base.bathrooms = self.bathrooms.or(base.bathrooms);
        base.min_price = self.min_price.or(base.min_price);
        base.max_price = self.max_price.or(base.max_price);
        base.min_area = self.min_area.or(base.min_area);
        base.max_area = self.max_area.or(base.max_area);
        base.min_rating = self.min_rating.or(base.min_rating);
        base
    }
}

fn parse_tier(s: &str) -> std::result::Result<PriceTier, String> {
    PriceTier::from_label(s).ok_or_else(|| format!("unknown price tier: {s}"))
}

fn parse_column(s: &str) -> std::result::Result<Column, String> {
    Column::from_name(s).ok_or_else(|| format!("unknown column: {s}"))
}

/// Pick a source by file extension.
fn open_source(path: &Path) -> Result<Box<dyn RecordSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(Box::new(CsvFileSource::new(path))),
        Some("json" | "jsonl" | "ndjson") => Ok(Box::new(JsonDocumentSource::new(path))),
        _ => bail!("unsupported source file: {}", path.display()),
    }
}

/// Price gets the overview bin count; other columns the analysis page's.
fn default_bins(column: Column, charts: &ChartConfig) -> usize {
    match column {
        Column::Price => charts.price_histogram_bins,
        _ => charts.column_histogram_bins,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::from_json_file(p)
            .with_context(|| format!("failed to read config {}", p.display()))?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condo_ingestion=info,condo_features=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let source = open_source(&cli.source)?;

    let mut engine = DashboardEngine::new(&config);
    let mut cache = SnapshotCache::from_config(&config.cache);

    match cli.command {
        Commands::Map { tier } => {
            let criteria = FilterCriteria {
                tiers: if tier.is_empty() { None } else { Some(tier) },
                ..Default::default()
            };
            let view = engine.run_source(&mut cache, source.as_ref(), &criteria)?;
            tracing::info!(markers = view.map_points.len(), "map ready");
            print_json(&view.map_points, cli.pretty)
        }
        Commands::Summaries { filters, defaults } => {
            let view = engine.run_source(&mut cache, source.as_ref(), &FilterCriteria::unrestricted())?;
            let base = if defaults {
                engine.page_defaults(&view.summaries)
            } else {
                FilterCriteria::unrestricted()
            };
            let criteria = filters.apply_to(base);
            let filtered = view.refilter(&criteria);
            if filtered.is_empty() {
                tracing::warn!("no buildings match the given filters");
            }
            print_json(&filtered, cli.pretty)
        }
        Commands::Listings { building } => {
            let view = engine.run_source(&mut cache, source.as_ref(), &FilterCriteria::unrestricted())?;
            match building {
                Some(name) => print_json(&view.listings_for_building(&name), cli.pretty),
                None => print_json(&building_names(&view.listings), cli.pretty),
            }
        }
        Commands::Scatter {
            bedrooms,
            min_price,
            max_price,
        } => {
            let snapshot = cache.get_or_load(source.as_ref())?;
            let listings = engine.normalize(&snapshot.records);
            let query = ListingQuery {
                bedrooms: if bedrooms.is_empty() { None } else { Some(bedrooms) },
                min_price,
                max_price,
            };
            tracing::debug!(options = ?listing_bedroom_options(&listings), "bedroom options");
            print_json(&engine.scatter(&listings, &query), cli.pretty)
        }
        Commands::Describe { column, box_plot } => {
            let snapshot = cache.get_or_load(source.as_ref())?;
            let listings = engine.normalize(&snapshot.records);
            let chart = if box_plot {
                NumericChart::BoxPlot
            } else {
                NumericChart::Histogram
            };
            print_json(&engine.analyze(&listings, column, chart), cli.pretty)
        }
        Commands::Histogram { column, bins } => {
            if !column.is_numeric() {
                bail!("{} is not a numeric column", column.name());
            }
            let snapshot = cache.get_or_load(source.as_ref())?;
            let listings = engine.normalize(&snapshot.records);
            let bins = bins.unwrap_or_else(|| default_bins(column, &config.charts));
            print_json(&Histogram::from_values(column.numeric_values(&listings), bins), cli.pretty)
        }
        Commands::Overview => {
            let snapshot = cache.get_or_load(source.as_ref())?;
            let listings = engine.normalize(&snapshot.records);
            print_json(&engine.overview(&listings), cli.pretty)
        }
    }
}
