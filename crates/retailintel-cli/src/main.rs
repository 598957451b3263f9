mod analyze;
mod report;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use retailintel_core::{AppConfig, BrandsFile, CompetitorData};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "retailintel-cli")]
#[command(about = "Competitor assortment dashboard on the command line")]
struct Cli {
    /// Seed for the mock assortment generator; omit for fresh random data.
    #[arg(long, global = true, env = "RETAILINTEL_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List tracked brands with their style totals.
    Brands {
        /// Case-insensitive name filter.
        #[arg(long)]
        search: Option<String>,
    },
    /// Single-brand price distribution, category mix and matrix.
    Overview {
        /// Brand name or slug; defaults to the first tracked brand.
        #[arg(long)]
        brand: Option<String>,
    },
    /// Cross-brand volume, pricing curve and category heatmap.
    Compare,
    /// Bucket breakdown of one category across every brand.
    Drilldown {
        #[arg(long)]
        category: String,
    },
    /// Run one live grounded analysis for a brand.
    Analyze {
        #[arg(long)]
        brand: String,
        /// Print the request that would be sent without calling the service.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// List the tracked categories and price buckets.
    Categories,
}

/// Loads the brand seeds and synthesizes one mock record per brand.
fn load_records(
    config: &AppConfig,
    seed: Option<u64>,
) -> anyhow::Result<(BrandsFile, Vec<CompetitorData>)> {
    let brands = retailintel_core::load_brands(&config.brands_path)?;
    let records = match seed {
        Some(seed) => {
            retailintel_core::seed_records(&mut StdRng::seed_from_u64(seed), &brands.brands)
        }
        None => retailintel_core::seed_records(&mut rand::rng(), &brands.brands),
    };
    tracing::debug!(brands = records.len(), seed = ?seed, "synthesized mock records");
    Ok((brands, records))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = retailintel_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Brands { search }) => {
            let (_, records) = load_records(&config, cli.seed)?;
            report::run_brands(&records, search.as_deref());
        }
        Some(Commands::Overview { brand }) => {
            let (brands, records) = load_records(&config, cli.seed)?;
            report::run_overview(&brands, &records, brand.as_deref())?;
        }
        Some(Commands::Compare) => {
            let (_, records) = load_records(&config, cli.seed)?;
            report::run_compare(&records);
        }
        Some(Commands::Drilldown { category }) => {
            let (_, records) = load_records(&config, cli.seed)?;
            report::run_drilldown(&records, &category)?;
        }
        Some(Commands::Analyze { brand, dry_run }) => {
            let brands = retailintel_core::load_brands(&config.brands_path)?;
            analyze::run_analyze(&config, &brands, &brand, dry_run).await?;
        }
        Some(Commands::Categories) => report::run_categories(),
        None => println!("retailintel-cli: run with --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
