//! Text renderings of the dashboard projections.

use retailintel_core::aggregate::{
    assortment_volume, brand_matrix, category_drilldown, category_heatmap, category_mix,
    market_leader, overview_summary, price_distribution, pricing_curve,
};
use retailintel_core::{
    filter_by_name, BrandSeed, BrandsFile, Category, CompetitorData, PriceBucket,
};

const BAR_WIDTH: u32 = 40;

/// Short column headers for the eight price buckets, in display order.
const BUCKET_SHORT: [&str; 8] = [
    "<100", "100s", "200s", "300s", "400-599", "600-799", "799-999", "1000+",
];

/// Finds a seed by case-insensitive name or by slug.
pub(crate) fn resolve_brand<'a>(brands: &'a BrandsFile, query: &str) -> Option<&'a BrandSeed> {
    let needle = query.trim().to_lowercase();
    brands
        .brands
        .iter()
        .find(|b| b.name.to_lowercase() == needle || b.slug() == needle)
}

/// Proportional `#` bar; any non-zero value gets at least one mark.
pub(crate) fn bar(value: u32, max: u32) -> String {
    if value == 0 || max == 0 {
        return String::new();
    }
    let width = (u64::from(value) * u64::from(BAR_WIDTH))
        .div_ceil(u64::from(max))
        .min(u64::from(BAR_WIDTH));
    "#".repeat(usize::try_from(width).unwrap_or_default())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn name_width(records: &[CompetitorData]) -> usize {
    records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(5)
        + 2
}

/// `brands`: sidebar list, optionally filtered.
pub(crate) fn run_brands(records: &[CompetitorData], search: Option<&str>) {
    let visible = filter_by_name(records, search.unwrap_or_default());

    if visible.is_empty() {
        println!("no brands match '{}'", search.unwrap_or_default());
        return;
    }

    println!("{:<20}{:>8}  {:<18}URL", "BRAND", "STYLES", "UPDATED");
    for record in visible {
        println!(
            "{:<20}{:>8}  {:<18}{}",
            truncate(&record.name, 17),
            record.total_styles,
            record.last_updated.format("%Y-%m-%d %H:%M"),
            record.url
        );
    }
}

/// `overview`: the single-brand overview and matrix views.
///
/// # Errors
///
/// Returns an error if `brand` names no tracked brand.
pub(crate) fn run_overview(
    brands: &BrandsFile,
    records: &[CompetitorData],
    brand: Option<&str>,
) -> anyhow::Result<()> {
    let record = match brand {
        Some(query) => {
            let seed = resolve_brand(brands, query)
                .ok_or_else(|| anyhow::anyhow!("brand '{query}' not found in brands file"))?;
            records.iter().find(|r| r.name == seed.name)
        }
        None => records.first(),
    }
    .ok_or_else(|| anyhow::anyhow!("no brands configured"))?;

    let summary = overview_summary(record);
    println!("{} ({})", record.name, record.url);
    let dominant = summary
        .dominant_category
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    let median = summary
        .median_bucket
        .map_or_else(|| "-".to_string(), |b| b.to_string());
    println!("{:<20}{}", "Total styles:", summary.total_styles);
    println!("{:<20}{dominant}", "Dominant category:");
    println!("{:<20}{median}", "Median price:");
    println!("{:<20}{:.1}%", "High tier ($600+):", summary.high_tier_share_pct);
    println!();

    let distribution = price_distribution(record);
    let max = distribution.iter().map(|b| b.count).max().unwrap_or(0);
    println!("PRICE DISTRIBUTION");
    for row in &distribution {
        println!(
            "{:<14}{:>6}  {}",
            row.bucket.label(),
            row.count,
            bar(row.count, max)
        );
    }
    println!();

    println!("CATEGORY MIX");
    for row in category_mix(record) {
        println!("{:<34}{:>6}", row.category.label(), row.total);
    }
    println!();

    println!("ASSORTMENT MATRIX");
    print!("{:<34}", "CATEGORY");
    for short in BUCKET_SHORT {
        print!("{short:>8}");
    }
    println!("{:>8}", "TOTAL");
    for row in brand_matrix(record) {
        print!("{:<34}", row.category.label());
        for bucket in PriceBucket::ALL {
            print!("{:>8}", row.counts.get(&bucket).copied().unwrap_or(0));
        }
        println!("{:>8}", row.total);
    }

    if let Some(sources) = record.sources.as_deref().filter(|s| !s.is_empty()) {
        println!();
        println!("SOURCES");
        for source in sources {
            println!("- {}: {}", source.title, source.uri);
        }
    }

    Ok(())
}

/// `compare`: volume ranking, pricing curve and heatmap.
pub(crate) fn run_compare(records: &[CompetitorData]) {
    if records.is_empty() {
        println!("no brands configured");
        return;
    }

    let width = name_width(records);
    let volume = assortment_volume(records);
    let max = volume.first().map_or(0, |v| v.total_styles);

    if let Some(leader) = market_leader(records) {
        println!(
            "Market leader: {} ({} styles)",
            leader.name, leader.total_styles
        );
        println!();
    }

    println!("ASSORTMENT VOLUME");
    for row in &volume {
        println!(
            "{:<width$}{:>6}  {}",
            row.name,
            row.total_styles,
            bar(row.total_styles, max)
        );
    }
    println!();

    println!("PRICING CURVE");
    print!("{:<14}", "BUCKET");
    for record in records {
        print!("{:>width$}", record.name);
    }
    println!();
    for row in pricing_curve(records) {
        print!("{:<14}", row.bucket.label());
        for record in records {
            print!(
                "{:>width$}",
                row.brands.get(&record.name).copied().unwrap_or(0)
            );
        }
        println!();
    }
    println!();

    println!("CATEGORY HEATMAP");
    print!("{:<34}", "CATEGORY");
    for record in records {
        print!("{:>width$}", record.name);
    }
    println!();
    for row in category_heatmap(records) {
        print!("{:<34}", row.category.label());
        for record in records {
            print!(
                "{:>width$}",
                row.brands.get(&record.name).copied().unwrap_or(0)
            );
        }
        println!();
    }
}

/// `drilldown`: one category across every brand.
///
/// # Errors
///
/// Returns an error if `category` is not a tracked category label.
pub(crate) fn run_drilldown(records: &[CompetitorData], category: &str) -> anyhow::Result<()> {
    let category: Category = category
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}; run `categories` to list valid labels"))?;

    let width = name_width(records);
    println!("{category}");
    print!("{:<width$}", "BRAND");
    for short in BUCKET_SHORT {
        print!("{short:>8}");
    }
    println!();
    for row in category_drilldown(records, category) {
        print!("{:<width$}", row.brand);
        for bucket in PriceBucket::ALL {
            print!("{:>8}", row.counts.get(&bucket).copied().unwrap_or(0));
        }
        println!();
    }

    Ok(())
}

/// `categories`: the fixed vocabulary.
pub(crate) fn run_categories() {
    println!("CATEGORIES");
    for category in Category::ALL {
        println!("  {category}");
    }
    println!();
    println!("PRICE BUCKETS");
    for bucket in PriceBucket::ALL {
        println!("  {bucket}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> BrandsFile {
        BrandsFile {
            brands: vec![
                BrandSeed {
                    name: "Buck Mason".to_string(),
                    url: "https://www.buckmason.com/".to_string(),
                    logo: None,
                    notes: None,
                },
                BrandSeed {
                    name: "Suit Supply".to_string(),
                    url: "https://suitsupply.com/en-us/".to_string(),
                    logo: None,
                    notes: None,
                },
            ],
        }
    }

    #[test]
    fn resolve_brand_matches_name_case_insensitively() {
        let brands = brands();
        let seed = resolve_brand(&brands, "BUCK mason").expect("match");
        assert_eq!(seed.name, "Buck Mason");
    }

    #[test]
    fn resolve_brand_matches_slug() {
        let brands = brands();
        let seed = resolve_brand(&brands, "suit-supply").expect("match");
        assert_eq!(seed.name, "Suit Supply");
        assert!(resolve_brand(&brands, "sid-mashburn").is_none());
    }

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(5, 0), "");
        assert_eq!(bar(10, 10).len(), 40);
        assert_eq!(bar(5, 10).len(), 20);
        assert_eq!(bar(90, 10).len(), 40);
        assert_eq!(bar(1, 1000).len(), 1);
    }

    #[test]
    fn bucket_headers_cover_every_bucket() {
        assert_eq!(BUCKET_SHORT.len(), PriceBucket::ALL.len());
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("Brooks Brothers", 6), "Brooks...");
        assert_eq!(truncate("Polo", 6), "Polo");
    }
}
