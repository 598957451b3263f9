//! Assortment vocabulary and the per-brand record shape.
//!
//! [`PriceBucket`] and [`Category`] are closed enumerations whose declaration
//! order is the display order used by every chart. Both serialize as their
//! human-readable label so the JSON shape matches what the rendering layer
//! keys on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceBucket {
    #[serde(rename = "Under $100")]
    Under100,
    #[serde(rename = "$100 to $199")]
    From100To199,
    #[serde(rename = "$200 to $299")]
    From200To299,
    #[serde(rename = "$300 to $399")]
    From300To399,
    #[serde(rename = "$400 to $599")]
    From400To599,
    #[serde(rename = "$600 to $799")]
    From600To799,
    #[serde(rename = "$799 to $999")]
    From799To999,
    #[serde(rename = "$1000+")]
    Over1000,
}

impl PriceBucket {
    /// All buckets in display order.
    pub const ALL: [PriceBucket; 8] = [
        PriceBucket::Under100,
        PriceBucket::From100To199,
        PriceBucket::From200To299,
        PriceBucket::From300To399,
        PriceBucket::From400To599,
        PriceBucket::From600To799,
        PriceBucket::From799To999,
        PriceBucket::Over1000,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PriceBucket::Under100 => "Under $100",
            PriceBucket::From100To199 => "$100 to $199",
            PriceBucket::From200To299 => "$200 to $299",
            PriceBucket::From300To399 => "$300 to $399",
            PriceBucket::From400To599 => "$400 to $599",
            PriceBucket::From600To799 => "$600 to $799",
            // The upstream label overlaps the previous bucket by a dollar; kept
            // verbatim because the AI service is prompted with these strings.
            PriceBucket::From799To999 => "$799 to $999",
            PriceBucket::Over1000 => "$1000+",
        }
    }

    /// Zero-based position in [`PriceBucket::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for PriceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceBucket {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.label() == s)
            .ok_or_else(|| CoreError::UnknownPriceBucket(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Tees, Henleys & Tanks")]
    TeesHenleysTanks,
    #[serde(rename = "Casual Shirts")]
    CasualShirts,
    #[serde(rename = "Dress Shirts")]
    DressShirts,
    #[serde(rename = "Polos")]
    Polos,
    #[serde(rename = "Sweater Polos")]
    SweaterPolos,
    #[serde(rename = "Sweaters")]
    Sweaters,
    #[serde(rename = "Cardigans & Zip-Ups")]
    CardigansZipUps,
    #[serde(rename = "Sweatshirts")]
    Sweatshirts,
    #[serde(rename = "Shirt Jackets & Overshirts")]
    ShirtJacketsOvershirts,
    #[serde(rename = "Coats & Outerwear")]
    CoatsOuterwear,
    #[serde(rename = "Suit Jackets & Sport Coats")]
    SuitJacketsSportCoats,
    #[serde(rename = "Jeans & Denim")]
    JeansDenim,
    #[serde(rename = "Casual Pants (chinos and khakis)")]
    CasualPants,
    #[serde(rename = "Dress Pants")]
    DressPants,
    #[serde(rename = "Sweatpants")]
    Sweatpants,
    #[serde(rename = "Shorts")]
    Shorts,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 16] = [
        Category::TeesHenleysTanks,
        Category::CasualShirts,
        Category::DressShirts,
        Category::Polos,
        Category::SweaterPolos,
        Category::Sweaters,
        Category::CardigansZipUps,
        Category::Sweatshirts,
        Category::ShirtJacketsOvershirts,
        Category::CoatsOuterwear,
        Category::SuitJacketsSportCoats,
        Category::JeansDenim,
        Category::CasualPants,
        Category::DressPants,
        Category::Sweatpants,
        Category::Shorts,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::TeesHenleysTanks => "Tees, Henleys & Tanks",
            Category::CasualShirts => "Casual Shirts",
            Category::DressShirts => "Dress Shirts",
            Category::Polos => "Polos",
            Category::SweaterPolos => "Sweater Polos",
            Category::Sweaters => "Sweaters",
            Category::CardigansZipUps => "Cardigans & Zip-Ups",
            Category::Sweatshirts => "Sweatshirts",
            Category::ShirtJacketsOvershirts => "Shirt Jackets & Overshirts",
            Category::CoatsOuterwear => "Coats & Outerwear",
            Category::SuitJacketsSportCoats => "Suit Jackets & Sport Coats",
            Category::JeansDenim => "Jeans & Denim",
            Category::CasualPants => "Casual Pants (chinos and khakis)",
            Category::DressPants => "Dress Pants",
            Category::Sweatpants => "Sweatpants",
            Category::Shorts => "Shorts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Parses an exact label. Surrounding whitespace is ignored; case is not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == trimmed)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// Full-price style counts for one category, keyed by price bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCountData {
    pub category: Category,
    pub counts: BTreeMap<PriceBucket, u32>,
}

impl StyleCountData {
    /// Count for `bucket`, zero when the bucket was never observed.
    #[must_use]
    pub fn count(&self, bucket: PriceBucket) -> u32 {
        self.counts.get(&bucket).copied().unwrap_or(0)
    }

    /// Sum over every bucket in this category.
    #[must_use]
    pub fn total(&self) -> u32 {
        saturating_total(self.counts.values().copied())
    }
}

/// A citation returned alongside AI-derived data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// A tracked competitor and its assortment snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorData {
    /// Opaque identifier, stable across refreshes of the same brand.
    pub id: String,
    pub name: String,
    pub url: String,
    pub logo: String,
    pub last_updated: DateTime<Utc>,
    /// Reported style total. Synthesized records always equal
    /// [`CompetitorData::counted_styles`]; AI-derived ones may not.
    pub total_styles: u32,
    pub data: Vec<StyleCountData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
}

impl CompetitorData {
    /// Entry for `category`, if the brand carries it.
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&StyleCountData> {
        self.data.iter().find(|d| d.category == category)
    }

    /// Sum of every bucket count across every category.
    #[must_use]
    pub fn counted_styles(&self) -> u32 {
        saturating_total(self.data.iter().map(StyleCountData::total))
    }
}

/// Sums style counts, pinning at `u32::MAX` instead of overflowing.
///
/// AI-derived counts are only clamped per cell, so any sum over them can
/// exceed `u32`.
#[must_use]
pub fn saturating_total<I: IntoIterator<Item = u32>>(counts: I) -> u32 {
    counts.into_iter().fold(0, u32::saturating_add)
}

/// Placeholder logo used when no logo is configured for a brand.
#[must_use]
pub fn default_logo(name: &str) -> String {
    format!("https://picsum.photos/seed/{name}/200/200")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_order_matches_display_order() {
        let labels: Vec<&str> = PriceBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels.first(), Some(&"Under $100"));
        assert_eq!(labels.last(), Some(&"$1000+"));
        assert!(PriceBucket::Under100 < PriceBucket::Over1000);
        for (i, bucket) in PriceBucket::ALL.iter().enumerate() {
            assert_eq!(bucket.index(), i);
            assert_eq!(PriceBucket::from_index(i), Some(*bucket));
        }
        assert_eq!(PriceBucket::from_index(8), None);
    }

    #[test]
    fn bucket_serializes_as_label() {
        let json = serde_json::to_string(&PriceBucket::From799To999).expect("serialize");
        assert_eq!(json, "\"$799 to $999\"");
    }

    #[test]
    fn category_parses_label_and_rejects_unknown() {
        assert_eq!(
            "Casual Pants (chinos and khakis)".parse::<Category>().unwrap(),
            Category::CasualPants
        );
        assert_eq!(" Polos ".parse::<Category>().unwrap(), Category::Polos);
        let err = "Neckties".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("Neckties"));
    }

    #[test]
    fn style_counts_serialize_keyed_by_bucket_label() {
        let data = StyleCountData {
            category: Category::Polos,
            counts: BTreeMap::from([(PriceBucket::Under100, 5), (PriceBucket::Over1000, 1)]),
        };
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["category"], "Polos");
        assert_eq!(json["counts"]["Under $100"], 5);
        assert_eq!(json["counts"]["$1000+"], 1);
    }

    #[test]
    fn missing_bucket_counts_as_zero() {
        let data = StyleCountData {
            category: Category::Shorts,
            counts: BTreeMap::from([(PriceBucket::Under100, 3)]),
        };
        assert_eq!(data.count(PriceBucket::Under100), 3);
        assert_eq!(data.count(PriceBucket::From400To599), 0);
        assert_eq!(data.total(), 3);
    }

    #[test]
    fn totals_saturate_at_u32_max() {
        assert_eq!(saturating_total([u32::MAX - 1, 1]), u32::MAX);
        assert_eq!(saturating_total([4_000_000_000, 4_000_000_000]), u32::MAX);
        assert_eq!(saturating_total([]), 0);

        let data = StyleCountData {
            category: Category::Polos,
            counts: BTreeMap::from([
                (PriceBucket::Under100, 4_000_000_000),
                (PriceBucket::From100To199, 4_000_000_000),
            ]),
        };
        assert_eq!(data.total(), u32::MAX);
    }

    #[test]
    fn competitor_uses_camel_case_fields() {
        let record = CompetitorData {
            id: "abc".to_string(),
            name: "Buck Mason".to_string(),
            url: "https://www.buckmason.com".to_string(),
            logo: default_logo("Buck Mason"),
            last_updated: Utc::now(),
            total_styles: 0,
            data: vec![],
            sources: None,
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("totalStyles").is_some());
        assert!(json.get("lastUpdated").is_some());
        assert!(json.get("sources").is_none());
    }
}
