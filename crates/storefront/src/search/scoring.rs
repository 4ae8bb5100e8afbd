//! Relevance scoring for search candidates.

use serde::Serialize;

use super::policy::{FieldWeights, ScoringPolicy};
use crate::catalog::CatalogItem;

/// Field whose match produced the base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchField {
    Name,
    Category,
    ShortDescription,
    Description,
    Tags,
    FuzzyName,
}

/// Internal ranking signal for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relevance {
    pub score: i32,
    /// `None` when no field matched and the score is bonuses only.
    pub match_field: Option<MatchField>,
}

/// Score an item against a normalized query and its variations.
///
/// The base score is the maximum over every field match: the full query
/// against each field with its own weights, then every variation against
/// the name with the fuzzy weights. The first field to reach the maximum
/// wins ties. Position, quality and stock adjustments are added on top.
#[must_use]
pub fn calculate_relevance_score(
    item: &CatalogItem,
    query: &str,
    variations: &[String],
    policy: &ScoringPolicy,
) -> Relevance {
    let name = item.name.to_lowercase();
    let fields = &policy.fields;

    let candidates = [
        (MatchField::Name, text_score(&name, query, fields.name)),
        (
            MatchField::Category,
            text_score(&item.category.to_lowercase(), query, fields.category),
        ),
        (
            MatchField::ShortDescription,
            text_score(
                &item.short_description.to_lowercase(),
                query,
                fields.short_description,
            ),
        ),
        (
            MatchField::Description,
            text_score(&item.description.to_lowercase(), query, fields.description),
        ),
        (MatchField::Tags, tag_score(&item.tags, query, fields.tags)),
    ]
    .into_iter()
    .chain(variations.iter().map(|variation| {
        (
            MatchField::FuzzyName,
            text_score(&name, variation, fields.fuzzy_name),
        )
    }));

    let mut base = 0;
    let mut match_field = None;
    for (field, score) in candidates {
        if score > base {
            base = score;
            match_field = Some(field);
        }
    }

    let score = base
        + position_bonus(&name, query, policy)
        + quality_bonus(item, policy)
        + stock_adjustment(item, policy);

    Relevance { score, match_field }
}

fn text_score(haystack: &str, needle: &str, weights: FieldWeights) -> i32 {
    if haystack == needle {
        weights.exact
    } else if haystack.contains(needle) {
        weights.partial
    } else {
        0
    }
}

fn tag_score(tags: &[String], query: &str, weights: FieldWeights) -> i32 {
    tags.iter()
        .map(|tag| text_score(&tag.to_lowercase(), query, weights))
        .max()
        .unwrap_or(0)
}

fn position_bonus(name: &str, query: &str, policy: &ScoringPolicy) -> i32 {
    if name.starts_with(query) {
        policy.position.name_prefix
    } else if name.contains(&format!(" {query}")) {
        policy.position.word_boundary
    } else {
        0
    }
}

fn quality_bonus(item: &CatalogItem, policy: &ScoringPolicy) -> i32 {
    let quality = &policy.quality;
    let mut bonus = 0;
    if item.bestseller {
        bonus += quality.bestseller;
    }
    if item.featured {
        bonus += quality.featured;
    }
    if item.is_new {
        bonus += quality.new_arrival;
    }
    bonus + policy.rating_bonus(item.rating)
}

fn stock_adjustment(item: &CatalogItem, policy: &ScoringPolicy) -> i32 {
    let mut adjustment = 0;
    if !item.in_stock {
        adjustment += policy.quality.out_of_stock;
    }
    if item.on_sale {
        adjustment += policy.quality.on_sale;
    }
    adjustment
}

#[cfg(test)]
mod tests {
    use linen_loft_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::search::variations::query_variations;

    fn item(name: &str) -> CatalogItem {
        CatalogItem {
            id: ProductId::new(1),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            category: "Bedroom".to_string(),
            short_description: String::new(),
            description: String::new(),
            tags: vec![],
            price: Decimal::new(4900, 2),
            original_price: None,
            bestseller: false,
            featured: false,
            is_new: false,
            on_sale: false,
            in_stock: true,
            rating: None,
        }
    }

    fn score(item: &CatalogItem, query: &str) -> Relevance {
        let policy = ScoringPolicy::default();
        let variations = query_variations(query, &policy);
        calculate_relevance_score(item, query, &variations, &policy)
    }

    #[test]
    fn test_exact_name_match() {
        // 100 exact + 30 prefix
        assert_eq!(
            score(&item("Sheet"), "sheet"),
            Relevance {
                score: 130,
                match_field: Some(MatchField::Name),
            }
        );
    }

    #[test]
    fn test_substring_name_match_with_word_boundary() {
        // 50 partial + 15 word boundary
        assert_eq!(
            score(&item("Cotton Sheet Set"), "sheet"),
            Relevance {
                score: 65,
                match_field: Some(MatchField::Name),
            }
        );
    }

    #[test]
    fn test_exact_short_description_beats_partial_name() {
        let mut item = item("Linen Throw Blanket");
        item.short_description = "Throw".to_string();
        let relevance = score(&item, "throw");
        assert_eq!(relevance.match_field, Some(MatchField::ShortDescription));
        // 80 exact short description + 15 word boundary
        assert_eq!(relevance.score, 95);
    }

    #[test]
    fn test_ties_resolve_to_earlier_field() {
        let mut item = item("Waffle Towel");
        item.category = "Bath Towels".to_string();
        // name partial 50 vs category partial 35: name wins outright
        assert_eq!(score(&item, "towel").match_field, Some(MatchField::Name));

        let mut policy = ScoringPolicy::default();
        policy.fields.category = FieldWeights::new(70, 50);
        let variations = query_variations("towel", &policy);
        let relevance = calculate_relevance_score(&item, "towel", &variations, &policy);
        assert_eq!(relevance.match_field, Some(MatchField::Name));
    }

    #[test]
    fn test_synonym_hits_name_through_fuzzy_weights() {
        let relevance = score(&item("Velvet Cushion"), "pillow");
        assert_eq!(relevance.match_field, Some(MatchField::FuzzyName));
        assert_eq!(relevance.score, 20);
    }

    #[test]
    fn test_tag_match_requires_whole_tag_for_exact() {
        let mut item = item("Linen Duvet Cover");
        item.tags = vec!["Stonewashed".to_string()];
        let relevance = score(&item, "stonewashed");
        assert_eq!(relevance.match_field, Some(MatchField::Tags));
        assert_eq!(relevance.score, 50);
    }

    #[test]
    fn test_quality_bonuses() {
        let mut item = item("Sheet");
        item.bestseller = true;
        item.featured = true;
        item.is_new = true;
        item.on_sale = true;
        item.rating = Some(4.6);
        // 130 + 20 + 15 + 10 + 5 + 15
        assert_eq!(score(&item, "sheet").score, 195);
    }

    #[test]
    fn test_out_of_stock_penalty() {
        let mut item = item("Sheet");
        item.in_stock = false;
        assert_eq!(score(&item, "sheet").score, 80);
    }

    #[test]
    fn test_no_match_scores_bonuses_only() {
        let mut item = item("Bath Mat");
        item.bestseller = true;
        assert_eq!(
            score(&item, "duvet"),
            Relevance {
                score: 20,
                match_field: None,
            }
        );
    }
}
