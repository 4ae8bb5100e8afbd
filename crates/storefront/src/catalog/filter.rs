//! Typed filter specifications for catalog queries.
//!
//! All text clauses are case-insensitive.

use super::{CatalogItem, Category};

/// Predicate over catalog items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFilter {
    /// Name equals the term.
    NameEquals(String),
    /// Name contains the term.
    NameContains(String),
    /// Short description contains the term.
    ShortDescriptionContains(String),
    /// Long description contains the term.
    DescriptionContains(String),
    /// One of the tags equals the term.
    HasTag(String),
    /// Category name contains the term.
    CategoryNameContains(String),
    /// Item is in stock.
    InStock,
    /// At least one clause matches. An empty list matches nothing.
    Any(Vec<CatalogFilter>),
    /// Every clause matches. An empty list matches everything.
    All(Vec<CatalogFilter>),
}

impl CatalogFilter {
    /// Every text clause the search engine retrieves candidates with, for one term.
    #[must_use]
    pub fn any_field(term: &str) -> Self {
        Self::Any(vec![
            Self::NameEquals(term.to_string()),
            Self::NameContains(term.to_string()),
            Self::ShortDescriptionContains(term.to_string()),
            Self::DescriptionContains(term.to_string()),
            Self::HasTag(term.to_string()),
            Self::CategoryNameContains(term.to_string()),
        ])
    }

    /// Evaluate the filter against an item.
    #[must_use]
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::NameEquals(term) => item.name.to_lowercase() == term.to_lowercase(),
            Self::NameContains(term) => contains_ci(&item.name, term),
            Self::ShortDescriptionContains(term) => contains_ci(&item.short_description, term),
            Self::DescriptionContains(term) => contains_ci(&item.description, term),
            Self::HasTag(term) => {
                let term = term.to_lowercase();
                item.tags.iter().any(|tag| tag.to_lowercase() == term)
            }
            Self::CategoryNameContains(term) => contains_ci(&item.category, term),
            Self::InStock => item.in_stock,
            Self::Any(clauses) => clauses.iter().any(|clause| clause.matches(item)),
            Self::All(clauses) => clauses.iter().all(|clause| clause.matches(item)),
        }
    }
}

/// A catalog item query: a filter plus a result cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub limit: usize,
}

/// Predicate over categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Category is active.
    Active,
    /// Name contains the term.
    NameContains(String),
    /// At least one clause matches. An empty list matches nothing.
    Any(Vec<CategoryFilter>),
    /// Every clause matches. An empty list matches everything.
    All(Vec<CategoryFilter>),
}

impl CategoryFilter {
    /// Evaluate the filter against a category.
    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::Active => category.active,
            Self::NameContains(term) => contains_ci(&category.name, term),
            Self::Any(clauses) => clauses.iter().any(|clause| clause.matches(category)),
            Self::All(clauses) => clauses.iter().all(|clause| clause.matches(category)),
        }
    }
}

/// A category query: a filter plus a result cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub filter: CategoryFilter,
    pub limit: usize,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use linen_loft_core::{CategoryId, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn item() -> CatalogItem {
        CatalogItem {
            id: ProductId::new(1),
            name: "Percale Sheet Set".to_string(),
            slug: "percale-sheet-set".to_string(),
            category: "Bed Linen".to_string(),
            short_description: "Crisp cotton percale".to_string(),
            description: "Cool, breathable sheets woven from long-staple cotton.".to_string(),
            tags: vec!["Cotton".to_string(), "summer".to_string()],
            price: Decimal::new(12900, 2),
            original_price: None,
            bestseller: false,
            featured: false,
            is_new: false,
            on_sale: false,
            in_stock: true,
            rating: None,
        }
    }

    #[test]
    fn test_text_clauses_are_case_insensitive() {
        let item = item();
        assert!(CatalogFilter::NameEquals("percale sheet set".into()).matches(&item));
        assert!(CatalogFilter::NameContains("SHEET".into()).matches(&item));
        assert!(CatalogFilter::ShortDescriptionContains("Percale".into()).matches(&item));
        assert!(CatalogFilter::DescriptionContains("long-staple".into()).matches(&item));
        assert!(CatalogFilter::HasTag("cotton".into()).matches(&item));
        assert!(CatalogFilter::CategoryNameContains("linen".into()).matches(&item));
    }

    #[test]
    fn test_tag_clause_requires_whole_tag() {
        assert!(!CatalogFilter::HasTag("cott".into()).matches(&item()));
    }

    #[test]
    fn test_empty_combinators() {
        let item = item();
        assert!(!CatalogFilter::Any(vec![]).matches(&item));
        assert!(CatalogFilter::All(vec![]).matches(&item));
    }

    #[test]
    fn test_in_stock_conjunction() {
        let mut item = item();
        let filter = CatalogFilter::All(vec![
            CatalogFilter::InStock,
            CatalogFilter::any_field("sheet"),
        ]);
        assert!(filter.matches(&item));
        item.in_stock = false;
        assert!(!filter.matches(&item));
    }

    #[test]
    fn test_category_filter() {
        let category = Category {
            id: CategoryId::new(1),
            name: "Pillows & Cushions".to_string(),
            slug: "pillows".to_string(),
            active: false,
        };
        assert!(CategoryFilter::NameContains("cushion".into()).matches(&category));
        assert!(
            !CategoryFilter::All(vec![
                CategoryFilter::Active,
                CategoryFilter::NameContains("cushion".into()),
            ])
            .matches(&category)
        );
    }
}
