//! Scoring policy: every weight and synonym the search engine uses.
//!
//! The default policy carries the reference weights. A JSON file can override
//! any subset of them; missing keys keep their defaults.
//!
//! ```json
//! {
//!   "fields": { "name": { "exact": 120, "partial": 60 } },
//!   "synonyms": { "throw": ["throws", "blanket"] }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a scoring policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read scoring policy {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid scoring policy: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Bonus for an exact and for a substring match on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub exact: i32,
    pub partial: i32,
}

impl FieldWeights {
    #[must_use]
    pub const fn new(exact: i32, partial: i32) -> Self {
        Self { exact, partial }
    }
}

/// Per-field match weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeightTable {
    pub name: FieldWeights,
    pub category: FieldWeights,
    pub short_description: FieldWeights,
    pub description: FieldWeights,
    pub tags: FieldWeights,
    /// Applied when a fuzzy variation (word or synonym) matches the name.
    pub fuzzy_name: FieldWeights,
}

impl Default for FieldWeightTable {
    fn default() -> Self {
        Self {
            name: FieldWeights::new(100, 50),
            category: FieldWeights::new(70, 35),
            short_description: FieldWeights::new(80, 40),
            description: FieldWeights::new(60, 30),
            tags: FieldWeights::new(50, 25),
            fuzzy_name: FieldWeights::new(40, 20),
        }
    }
}

/// Bonuses for where the query sits inside the product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionWeights {
    /// Name starts with the query.
    pub name_prefix: i32,
    /// Query starts a later word of the name.
    pub word_boundary: i32,
}

impl Default for PositionWeights {
    fn default() -> Self {
        Self {
            name_prefix: 30,
            word_boundary: 15,
        }
    }
}

/// A rating threshold and the bonus it earns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingTier {
    pub min: f64,
    pub bonus: i32,
}

/// Bonuses and penalties from merchandising signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub bestseller: i32,
    pub featured: i32,
    pub new_arrival: i32,
    pub on_sale: i32,
    /// Added (usually negative) when the item is out of stock.
    pub out_of_stock: i32,
    /// Only the highest tier reached counts.
    pub rating_tiers: Vec<RatingTier>,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            bestseller: 20,
            featured: 15,
            new_arrival: 10,
            on_sale: 5,
            out_of_stock: -50,
            rating_tiers: vec![
                RatingTier {
                    min: 4.5,
                    bonus: 15,
                },
                RatingTier {
                    min: 4.0,
                    bonus: 10,
                },
                RatingTier {
                    min: 3.5,
                    bonus: 5,
                },
            ],
        }
    }
}

/// Product-name suggestion scoring and list caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionPolicy {
    pub exact: i32,
    pub prefix: i32,
    pub contains: i32,
    pub bestseller: i32,
    pub top_rating: RatingTier,
    /// Items fetched before scoring.
    pub candidate_pool: usize,
    pub max_products: usize,
    pub max_categories: usize,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self {
            exact: 100,
            prefix: 50,
            contains: 25,
            bestseller: 10,
            top_rating: RatingTier {
                min: 4.5,
                bonus: 5,
            },
            candidate_pool: 8,
            max_products: 5,
            max_categories: 3,
        }
    }
}

/// Complete scoring policy handed to the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub fields: FieldWeightTable,
    pub position: PositionWeights,
    pub quality: QualityWeights,
    pub suggestions: SuggestionPolicy,
    /// Candidates fetched per requested result.
    pub candidate_multiplier: usize,
    /// Query words at least this long become variations of their own.
    pub min_word_len: usize,
    /// Lowercase word -> lowercase synonyms.
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            fields: FieldWeightTable::default(),
            position: PositionWeights::default(),
            quality: QualityWeights::default(),
            suggestions: SuggestionPolicy::default(),
            candidate_multiplier: 3,
            min_word_len: 3,
            synonyms: default_synonyms(),
        }
    }
}

impl ScoringPolicy {
    /// Parse a policy from JSON, filling unspecified values from the defaults.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Parse` if the JSON does not match the policy shape.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json)?;
        Ok(policy.normalized())
    }

    /// Load a policy from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Read` if the file cannot be read and
    /// `PolicyError::Parse` if it is not a valid policy.
    pub fn from_json_file(path: &Path) -> Result<Self, PolicyError> {
        let json = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Synonyms for a lowercase word.
    #[must_use]
    pub fn synonyms_for(&self, word: &str) -> &[String] {
        self.synonyms.get(word).map_or(&[], Vec::as_slice)
    }

    /// Bonus for the highest rating tier `rating` reaches.
    #[must_use]
    pub fn rating_bonus(&self, rating: Option<f64>) -> i32 {
        let Some(rating) = rating else {
            return 0;
        };
        self.quality
            .rating_tiers
            .iter()
            .filter(|tier| rating >= tier.min)
            .max_by(|a, b| a.min.total_cmp(&b.min))
            .map_or(0, |tier| tier.bonus)
    }

    fn normalized(mut self) -> Self {
        self.synonyms = self
            .synonyms
            .into_iter()
            .map(|(word, synonyms)| {
                (
                    word.trim().to_lowercase(),
                    synonyms.iter().map(|s| s.trim().to_lowercase()).collect(),
                )
            })
            .collect();
        self
    }
}

fn default_synonyms() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("sheet", &["sheets", "sheeting"]),
        ("pillow", &["pillows", "cushion", "cushions"]),
        ("duvet", &["duvets", "comforter", "comforters"]),
        ("blanket", &["blankets", "throw", "throws"]),
        ("throw", &["throws", "blanket"]),
        ("towel", &["towels", "bath sheet"]),
        ("quilt", &["quilts", "coverlet", "bedspread"]),
        ("mattress", &["mattresses", "topper"]),
        ("curtain", &["curtains", "drapes", "drapery"]),
        ("bedding", &["bed linen", "linens"]),
        ("cover", &["covers", "case"]),
        ("rug", &["rugs", "mat"]),
    ];

    table
        .iter()
        .map(|(word, synonyms)| {
            (
                (*word).to_string(),
                synonyms.iter().map(|s| (*s).to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.fields.name, FieldWeights::new(100, 50));
        assert_eq!(policy.fields.short_description, FieldWeights::new(80, 40));
        assert_eq!(policy.quality.out_of_stock, -50);
        assert_eq!(policy.candidate_multiplier, 3);
    }

    #[test]
    fn test_rating_bonus_uses_highest_tier() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.rating_bonus(Some(4.8)), 15);
        assert_eq!(policy.rating_bonus(Some(4.5)), 15);
        assert_eq!(policy.rating_bonus(Some(4.2)), 10);
        assert_eq!(policy.rating_bonus(Some(3.5)), 5);
        assert_eq!(policy.rating_bonus(Some(3.4)), 0);
        assert_eq!(policy.rating_bonus(None), 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let policy = ScoringPolicy::from_json_str(
            r#"{ "fields": { "name": { "exact": 120, "partial": 60 } }, "candidate_multiplier": 4 }"#,
        )
        .unwrap();

        assert_eq!(policy.fields.name, FieldWeights::new(120, 60));
        assert_eq!(policy.fields.tags, FieldWeights::new(50, 25));
        assert_eq!(policy.candidate_multiplier, 4);
        assert_eq!(policy.quality.bestseller, 20);
    }

    #[test]
    fn test_json_synonyms_are_lowercased() {
        let policy =
            ScoringPolicy::from_json_str(r#"{ "synonyms": { "Napkin": ["Serviette"] } }"#).unwrap();
        assert_eq!(policy.synonyms_for("napkin"), ["serviette".to_string()]);
        assert!(policy.synonyms_for("pillow").is_empty());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = ScoringPolicy::from_json_str(r#"{ "min_word_len": "three" }"#).unwrap_err();
        assert!(matches!(err, PolicyError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ScoringPolicy::from_json_file(Path::new("/nonexistent/policy.json")).unwrap_err();
        assert!(matches!(err, PolicyError::Read { .. }));
    }
}
