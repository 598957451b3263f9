//! Prompt and response schema for the assortment analysis request.

use retailintel_core::{Category, PriceBucket};
use serde_json::{json, Map, Value};

fn joined_labels<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the natural-language instruction for one brand.
#[must_use]
pub fn build_prompt(name: &str, url: &str) -> String {
    let categories = joined_labels(Category::ALL);
    let buckets = joined_labels(PriceBucket::ALL);

    format!(
        "Analyze the current men's assortment of the retailer \"{name}\" at {url}.\n\
         Count the unique FULL PRICE styles (distinct products, not colour or size variants) \
         it offers in each category below.\n\
         \n\
         Data integrity rules:\n\
         1. Exclude every sale or markdown item.\n\
         2. Apply a category-price sanity check. Dress shirts from these brands normally sit \
         between $100 and $250; do not place a category in a price tier that is implausible \
         for it unless the brand's catalog actually carries a luxury or bespoke line there.\n\
         3. Separate core volume drivers from halo luxury pieces; halo pieces belong in the \
         upper buckets only when they are really on offer.\n\
         \n\
         Categories: {categories}\n\
         \n\
         Bucket each category's full-price style count into these price ranges: {buckets}\n\
         \n\
         Base the estimate on the current site structure and catalog data. Report totalStyles \
         as the sum of every count."
    )
}

/// JSON schema constraining the model's reply.
#[must_use]
pub fn response_schema() -> Value {
    let bucket_properties: Map<String, Value> = PriceBucket::ALL
        .into_iter()
        .map(|b| (b.label().to_string(), json!({ "type": "NUMBER" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "totalStyles": { "type": "NUMBER" },
            "data": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "counts": {
                            "type": "OBJECT",
                            "properties": bucket_properties
                        }
                    },
                    "required": ["category", "counts"]
                }
            }
        },
        "required": ["totalStyles", "data"]
    })
}
