//! Offline mock assortment synthesizer.
//!
//! Produces plausible per-brand counts without touching the network. Each
//! category has a "hot" set of price-bucket indices for standard and premium
//! brands; hot buckets get volume, their neighbours get bleed-over, and the
//! rest stay near zero so a $900 tee never shows up with real weight.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::assortment::{
    default_logo, saturating_total, Category, CompetitorData, PriceBucket, StyleCountData,
};

/// Brands whose assortment skews toward the premium profile.
pub const PREMIUM_BRANDS: [&str; 4] = ["Ralph Lauren", "Todd Snyder", "Sid Mashburn", "Suit Supply"];

/// Hot bucket indices for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceProfile {
    pub typical: &'static [usize],
    pub premium: &'static [usize],
}

/// Used for any category without an entry in [`PRICE_PROFILES`].
pub const DEFAULT_PROFILE: PriceProfile = PriceProfile {
    typical: &[0, 1, 2],
    premium: &[2, 3, 4],
};

const fn profile(typical: &'static [usize], premium: &'static [usize]) -> PriceProfile {
    PriceProfile { typical, premium }
}

/// Hot-bucket profiles keyed by category.
pub const PRICE_PROFILES: &[(Category, PriceProfile)] = &[
    (Category::TeesHenleysTanks, profile(&[0], &[0, 1])),
    (Category::CasualShirts, profile(&[0, 1], &[1, 2])),
    (Category::DressShirts, profile(&[0, 1], &[1, 2])),
    (Category::Polos, profile(&[0, 1], &[1, 2])),
    (Category::SweaterPolos, profile(&[1, 2], &[2, 3])),
    (Category::Sweaters, profile(&[1, 2, 3], &[3, 4, 5])),
    (Category::CardigansZipUps, profile(&[1, 2, 3], &[3, 4, 5])),
    (Category::Sweatshirts, profile(&[0, 1], &[1, 2])),
    (Category::ShirtJacketsOvershirts, profile(&[1, 2, 3], &[3, 4, 5])),
    (Category::CoatsOuterwear, profile(&[4, 5, 6], &[6, 7])),
    (Category::SuitJacketsSportCoats, profile(&[3, 4, 5], &[5, 6, 7])),
    (Category::JeansDenim, profile(&[1, 2], &[2, 3])),
    (Category::CasualPants, profile(&[1, 2], &[1, 2])),
    (Category::DressPants, profile(&[1, 2, 3], &[2, 3, 4])),
    (Category::Sweatpants, profile(&[0, 1], &[1, 2])),
    (Category::Shorts, profile(&[0, 1], &[0, 1])),
];

/// Looks up `category` in `table`, falling back to [`DEFAULT_PROFILE`].
#[must_use]
pub fn lookup_profile(table: &[(Category, PriceProfile)], category: Category) -> PriceProfile {
    table
        .iter()
        .find(|(c, _)| *c == category)
        .map_or(DEFAULT_PROFILE, |(_, p)| *p)
}

#[must_use]
pub fn profile_or_default(category: Category) -> PriceProfile {
    lookup_profile(PRICE_PROFILES, category)
}

#[must_use]
pub fn is_premium_brand(name: &str) -> bool {
    PREMIUM_BRANDS.contains(&name)
}

/// How a bucket relates to the brand's hot set for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketTier {
    /// Inside the hot set: draws from `[10, 50)`.
    Target,
    /// One index away from a hot bucket: draws from `[0, 10)`.
    Adjacent,
    /// Everything else: 95% zero, otherwise `[0, 2)`.
    Outlier,
}

#[must_use]
pub fn bucket_tier(index: usize, targets: &[usize]) -> BucketTier {
    if targets.contains(&index) {
        BucketTier::Target
    } else if targets.iter().any(|&t| t.abs_diff(index) == 1) {
        BucketTier::Adjacent
    } else {
        BucketTier::Outlier
    }
}

fn draw_count<R: Rng + ?Sized>(rng: &mut R, tier: BucketTier) -> u32 {
    match tier {
        BucketTier::Target => rng.random_range(10..50),
        BucketTier::Adjacent => rng.random_range(0..10),
        BucketTier::Outlier => {
            if rng.random_bool(0.05) {
                rng.random_range(0..2)
            } else {
                0
            }
        }
    }
}

/// Synthesizes counts for a single category.
pub fn synthesize_category<R: Rng + ?Sized>(
    rng: &mut R,
    category: Category,
    premium: bool,
) -> StyleCountData {
    let profile = profile_or_default(category);
    let targets = if premium {
        profile.premium
    } else {
        profile.typical
    };

    let counts: BTreeMap<PriceBucket, u32> = PriceBucket::ALL
        .into_iter()
        .map(|bucket| {
            let tier = bucket_tier(bucket.index(), targets);
            (bucket, draw_count(rng, tier))
        })
        .collect();

    StyleCountData { category, counts }
}

/// Builds a complete mock record for a brand using the supplied RNG.
///
/// `logo` overrides the placeholder logo when the seed config provides one.
pub fn synthesize_with<R: Rng + ?Sized>(
    rng: &mut R,
    name: &str,
    url: &str,
    logo: Option<&str>,
) -> CompetitorData {
    let premium = is_premium_brand(name);
    let data: Vec<StyleCountData> = Category::ALL
        .into_iter()
        .map(|category| synthesize_category(rng, category, premium))
        .collect();
    let total_styles = saturating_total(data.iter().map(StyleCountData::total));

    tracing::debug!(brand = %name, premium, total_styles, "synthesized mock assortment");

    CompetitorData {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        url: url.to_string(),
        logo: logo.map_or_else(|| default_logo(name), ToOwned::to_owned),
        last_updated: Utc::now(),
        total_styles,
        data,
        sources: None,
    }
}

/// Builds a complete mock record for a brand using the thread-local RNG.
#[must_use]
pub fn synthesize(name: &str, url: &str) -> CompetitorData {
    synthesize_with(&mut rand::rng(), name, url, None)
}
