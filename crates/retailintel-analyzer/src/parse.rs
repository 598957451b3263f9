//! Mapping from a `generateContent` response to a [`CompetitorData`] record.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use retailintel_core::assortment::{default_logo, saturating_total};
use retailintel_core::{Category, CompetitorData, GroundingSource, PriceBucket, StyleCountData};
use uuid::Uuid;

use crate::error::AnalyzerError;
use crate::types::{GenerateContentResponse, RawAssortment, RawCategoryCounts};

/// Extracts web citations from the first candidate.
///
/// Chunks without a non-empty `uri` are discarded; a missing title becomes
/// `"Source"`.
pub(crate) fn extract_sources(response: &GenerateContentResponse) -> Vec<GroundingSource> {
    response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|meta| {
            meta.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| {
                    let uri = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
                    Some(GroundingSource {
                        title: web
                            .title
                            .as_deref()
                            .filter(|t| !t.trim().is_empty())
                            .unwrap_or("Source")
                            .to_string(),
                        uri: uri.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Concatenated text parts of the first candidate, or `None` when blank.
pub(crate) fn response_text(response: &GenerateContentResponse) -> Option<String> {
    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parses the structured body; an absent body is treated as `{}`.
pub(crate) fn parse_assortment(text: Option<&str>) -> Result<RawAssortment, AnalyzerError> {
    let Some(text) = text else {
        tracing::warn!("analyzer response had no text body; treating as empty assortment");
        return Ok(RawAssortment::default());
    };
    serde_json::from_str(strip_code_fence(text)).map_err(|e| AnalyzerError::Deserialize {
        context: "structured assortment body".to_string(),
        source: e,
    })
}

/// Models occasionally wrap JSON output in a markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// Clamps a loosely typed JSON count to a non-negative integer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn to_count(value: &serde_json::Value) -> u32 {
    match value.as_f64() {
        Some(v) if v.is_finite() && v > 0.0 => v.round().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn to_total(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

fn to_style_counts(raw: RawCategoryCounts) -> Option<StyleCountData> {
    let category = match raw.category.parse::<Category>() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "dropping category not in the tracked set");
            return None;
        }
    };

    let counts: BTreeMap<PriceBucket, u32> = raw
        .counts
        .iter()
        .filter_map(|(label, value)| match label.parse::<PriceBucket>() {
            Ok(bucket) => Some((bucket, to_count(value))),
            Err(_) => {
                tracing::debug!(category = %category, bucket = %label, "ignoring unknown price bucket");
                None
            }
        })
        .collect();

    Some(StyleCountData { category, counts })
}

/// Builds the domain record from the parsed body and citations.
///
/// Categories come back in [`Category::ALL`] order with at most one entry
/// each; a repeated category keeps its first occurrence.
pub(crate) fn to_record(
    name: &str,
    url: &str,
    raw: RawAssortment,
    sources: Vec<GroundingSource>,
) -> CompetitorData {
    let mut seen = HashSet::new();
    let mut data: Vec<StyleCountData> = raw
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(to_style_counts)
        .filter(|d| {
            let first = seen.insert(d.category);
            if !first {
                tracing::warn!(category = %d.category, "dropping duplicate category from analyzer");
            }
            first
        })
        .collect();
    data.sort_by_key(|d| d.category);

    let total_styles = to_total(raw.total_styles);
    let counted = saturating_total(data.iter().map(StyleCountData::total));
    if counted != total_styles {
        tracing::warn!(
            brand = %name,
            reported = total_styles,
            counted,
            "analyzer totalStyles does not match the sum of its counts"
        );
    }

    CompetitorData {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        url: url.to_string(),
        logo: default_logo(name),
        last_updated: Utc::now(),
        total_styles,
        data,
        sources: Some(sources),
    }
}
