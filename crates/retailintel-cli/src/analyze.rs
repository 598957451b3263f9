//! Live analysis command handler.

use retailintel_analyzer::{prompt::build_prompt, GeminiClient};
use retailintel_core::aggregate::{overview_summary, price_distribution};
use retailintel_core::{AppConfig, BrandsFile};

use crate::report::{bar, resolve_brand};

/// Runs one grounded analysis for `brand` and prints the result.
///
/// When `dry_run` is `true` the prompt is printed and no request is sent.
///
/// # Errors
///
/// Returns an error if the brand is unknown, `GEMINI_API_KEY` is missing,
/// or the analysis fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    brands: &BrandsFile,
    brand: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let seed = resolve_brand(brands, brand)
        .ok_or_else(|| anyhow::anyhow!("brand '{brand}' not found in brands file"))?;

    if dry_run {
        println!(
            "dry-run: would analyze {} ({}) with model {} at {}",
            seed.name, seed.url, config.analyzer.model, config.analyzer.base_url
        );
        println!();
        println!("{}", build_prompt(&seed.name, &seed.url));
        return Ok(());
    }

    let api_key = config.analyzer.require_api_key()?;
    let client = GeminiClient::with_base_url(
        api_key,
        &config.analyzer.model,
        config.analyzer.timeout_secs,
        &config.analyzer.base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build analyzer client: {e}"))?;

    let analysis = client
        .analyze(&seed.name, &seed.url)
        .await
        .map_err(|e| anyhow::anyhow!("analysis of '{}' failed: {e}", seed.name))?;
    let record = &analysis.record;

    let summary = overview_summary(record);
    let counted = record.counted_styles();
    println!("{} ({})", record.name, record.url);
    if counted == record.total_styles {
        println!("{:<20}{}", "Total styles:", record.total_styles);
    } else {
        println!(
            "{:<20}{} (counts sum to {counted})",
            "Total styles:", record.total_styles
        );
    }
    println!("{:<20}{}", "Categories found:", record.data.len());
    println!("{:<20}{:.1}%", "High tier ($600+):", summary.high_tier_share_pct);
    println!();

    let distribution = price_distribution(record);
    let max = distribution.iter().map(|b| b.count).max().unwrap_or(0);
    for row in &distribution {
        println!(
            "{:<14}{:>6}  {}",
            row.bucket.label(),
            row.count,
            bar(row.count, max)
        );
    }

    println!();
    if analysis.sources.is_empty() {
        println!("no sources cited");
    } else {
        println!("SOURCES");
        for source in &analysis.sources {
            println!("- {}: {}", source.title, source.uri);
        }
    }

    Ok(())
}
