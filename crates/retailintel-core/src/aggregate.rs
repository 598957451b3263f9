//! Chart-ready projections over brand records.
//!
//! Everything here is a pure function of its arguments. Missing categories or
//! buckets resolve to zero rather than being omitted, so every row a renderer
//! receives has a value for every known brand and bucket.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::assortment::{saturating_total, Category, CompetitorData, PriceBucket};

/// Per-brand matrix cells reach full intensity at this many styles.
pub const BRAND_MATRIX_SCALE: u32 = 25;

/// Cross-brand heatmap cells reach full intensity at this many styles.
pub const HEATMAP_SCALE: u32 = 200;

/// First bucket index counted toward the high-tier mix (`$600 to $799`).
const HIGH_TIER_START: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: PriceBucket,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVolume {
    pub name: String,
    pub total_styles: u32,
    pub logo: String,
}

/// One x-axis point of the multi-brand pricing curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingCurveRow {
    pub bucket: PriceBucket,
    /// Brand name to summed count. Every brand in the input is present.
    #[serde(flatten)]
    pub brands: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapRow {
    pub category: Category,
    #[serde(flatten)]
    pub brands: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrilldownRow {
    pub brand: String,
    /// All eight buckets, zero-filled.
    #[serde(flatten)]
    pub counts: BTreeMap<PriceBucket, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub category: Category,
    pub counts: BTreeMap<PriceBucket, u32>,
    pub total: u32,
}

/// Headline numbers for the single-brand overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewSummary {
    pub total_styles: u32,
    pub dominant_category: Option<Category>,
    pub median_bucket: Option<PriceBucket>,
    /// Share of styles priced `$600 to $799` or higher, in percent.
    pub high_tier_share_pct: f64,
}

fn bucket_sum(record: &CompetitorData, bucket: PriceBucket) -> u32 {
    saturating_total(record.data.iter().map(|d| d.count(bucket)))
}

fn category_sum(record: &CompetitorData, category: Category) -> u32 {
    record.category(category).map_or(0, |d| d.total())
}

fn zero_filled(record: &CompetitorData, category: Category) -> BTreeMap<PriceBucket, u32> {
    let entry = record.category(category);
    PriceBucket::ALL
        .into_iter()
        .map(|bucket| (bucket, entry.map_or(0, |d| d.count(bucket))))
        .collect()
}

/// Style count per bucket across all of a brand's categories.
///
/// Always returns one row per [`PriceBucket`], in display order.
#[must_use]
pub fn price_distribution(record: &CompetitorData) -> Vec<BucketCount> {
    PriceBucket::ALL
        .into_iter()
        .map(|bucket| BucketCount {
            bucket,
            count: bucket_sum(record, bucket),
        })
        .collect()
}

/// Category totals for one brand, largest first. Equal totals keep the
/// order the categories appear in the record.
#[must_use]
pub fn category_mix(record: &CompetitorData) -> Vec<CategoryTotal> {
    let mut mix: Vec<CategoryTotal> = record
        .data
        .iter()
        .map(|d| CategoryTotal {
            category: d.category,
            total: d.total(),
        })
        .collect();
    mix.sort_by_key(|c| Reverse(c.total));
    mix
}

/// Brands ranked by reported style total, largest first.
#[must_use]
pub fn assortment_volume(records: &[CompetitorData]) -> Vec<BrandVolume> {
    let mut volume: Vec<BrandVolume> = records
        .iter()
        .map(|r| BrandVolume {
            name: r.name.clone(),
            total_styles: r.total_styles,
            logo: r.logo.clone(),
        })
        .collect();
    volume.sort_by_key(|v| Reverse(v.total_styles));
    volume
}

/// The brand with the largest assortment, if any brands are tracked.
#[must_use]
pub fn market_leader(records: &[CompetitorData]) -> Option<BrandVolume> {
    assortment_volume(records).into_iter().next()
}

#[must_use]
pub fn pricing_curve(records: &[CompetitorData]) -> Vec<PricingCurveRow> {
    PriceBucket::ALL
        .into_iter()
        .map(|bucket| PricingCurveRow {
            bucket,
            brands: records
                .iter()
                .map(|r| (r.name.clone(), bucket_sum(r, bucket)))
                .collect(),
        })
        .collect()
}

#[must_use]
pub fn category_heatmap(records: &[CompetitorData]) -> Vec<HeatmapRow> {
    Category::ALL
        .into_iter()
        .map(|category| HeatmapRow {
            category,
            brands: records
                .iter()
                .map(|r| (r.name.clone(), category_sum(r, category)))
                .collect(),
        })
        .collect()
}

/// Bucket breakdown of one category for every brand.
#[must_use]
pub fn category_drilldown(records: &[CompetitorData], category: Category) -> Vec<DrilldownRow> {
    records
        .iter()
        .map(|r| DrilldownRow {
            brand: r.name.clone(),
            counts: zero_filled(r, category),
        })
        .collect()
}

/// Category × bucket grid for one brand, covering every category.
#[must_use]
pub fn brand_matrix(record: &CompetitorData) -> Vec<MatrixRow> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let counts = zero_filled(record, category);
            let total = saturating_total(counts.values().copied());
            MatrixRow {
                category,
                counts,
                total,
            }
        })
        .collect()
}

/// Bucket holding the median style, or `None` for an empty assortment.
#[must_use]
pub fn median_bucket(distribution: &[BucketCount]) -> Option<PriceBucket> {
    let total: u64 = distribution.iter().map(|b| u64::from(b.count)).sum();
    if total == 0 {
        return None;
    }
    let mut running = 0u64;
    distribution.iter().find_map(|b| {
        running += u64::from(b.count);
        (running * 2 >= total).then_some(b.bucket)
    })
}

#[must_use]
pub fn overview_summary(record: &CompetitorData) -> OverviewSummary {
    let distribution = price_distribution(record);
    let counted = saturating_total(distribution.iter().map(|b| b.count));
    let high_tier = saturating_total(
        distribution
            .iter()
            .filter(|b| b.bucket.index() >= HIGH_TIER_START)
            .map(|b| b.count),
    );
    let high_tier_share_pct = if counted == 0 {
        0.0
    } else {
        (f64::from(high_tier) * 1000.0 / f64::from(counted)).round() / 10.0
    };

    OverviewSummary {
        total_styles: record.total_styles,
        dominant_category: category_mix(record).first().map(|c| c.category),
        median_bucket: median_bucket(&distribution),
        high_tier_share_pct,
    }
}

/// Shading intensity in `[0, 1]` for a heatmap cell.
#[must_use]
pub fn heat_intensity(value: u32, scale: u32) -> f64 {
    if scale == 0 {
        return if value > 0 { 1.0 } else { 0.0 };
    }
    (f64::from(value) / f64::from(scale)).min(1.0)
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
