//! Search over the read-only catalog: currencies, collections, products.
//!
//! Matching is a case-insensitive substring test; an empty query matches
//! everything. Results keep document order.

use crate::app::domain::{Collection, Document, EntityId, Product, TargetRef, Variant};

fn matches(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn search_currencies<'d>(doc: &'d Document, query: &str) -> Vec<&'d str> {
    let query = query.trim();
    doc.currencies
        .keys()
        .map(String::as_str)
        .filter(|code| matches(code, query))
        .collect()
}

pub fn search_collections<'d>(doc: &'d Document, query: &str) -> Vec<&'d Collection> {
    let query = query.trim();
    doc.collections
        .iter()
        .filter(|c| matches(&c.title, query))
        .collect()
}

/// A product hit and the variants to show under it.
#[derive(Debug, PartialEq)]
pub struct ProductMatch<'d> {
    pub product: &'d Product,
    pub variants: Vec<&'d Variant>,
}

/// Products whose title or any variant title matches. A matching product
/// lists all its variants; otherwise only the matching ones.
pub fn search_products<'d>(doc: &'d Document, query: &str) -> Vec<ProductMatch<'d>> {
    let query = query.trim();
    doc.products
        .iter()
        .filter_map(|product| {
            if matches(&product.title, query) {
                return Some(ProductMatch {
                    product,
                    variants: product.variants.iter().collect(),
                });
            }
            let variants: Vec<&Variant> = product
                .variants
                .iter()
                .filter(|v| matches(&v.title, query))
                .collect();
            (!variants.is_empty()).then_some(ProductMatch { product, variants })
        })
        .collect()
}

/// Every selectable product target: each product followed by its variants.
pub fn all_product_targets(doc: &Document) -> Vec<TargetRef> {
    doc.products
        .iter()
        .flat_map(|p| std::iter::once(p.id.clone()).chain(p.variants.iter().map(|v| v.id.clone())))
        .collect()
}

pub fn collection_title<'d>(doc: &'d Document, id: &EntityId) -> Option<&'d str> {
    doc.collections
        .iter()
        .find(|c| &c.id == id)
        .map(|c| c.title.as_str())
}

/// Display label of a product target: the product title, or
/// `product / variant` for a variant. `None` for dangling references.
pub fn target_label(doc: &Document, target: &TargetRef) -> Option<String> {
    for product in &doc.products {
        if &product.id == target {
            return Some(product.title.clone());
        }
        if let Some(variant) = product.variants.iter().find(|v| &v.id == target) {
            return Some(format!("{} / {}", product.title, variant.title));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn doc() -> Document {
        let mut doc = Document::default();
        for code in ["BTC", "ETH", "USDT"] {
            doc.currencies.insert(code.to_string(), Value::Null);
        }
        doc.collections = vec![
            Collection::new("c1", "Home page"),
            Collection::new("c2", "Sneakers"),
        ];
        doc.products = vec![
            Product::new("p1", "Runner").with_variants(vec![
                Variant::new("v1", "Size 42"),
                Variant::new("v2", "Size 43"),
            ]),
            Product::new("p2", "Leather belt"),
        ];
        doc
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let doc = doc();
        assert_eq!(search_currencies(&doc, "").len(), 3);
        assert_eq!(search_collections(&doc, "  ").len(), 2);
        assert_eq!(search_products(&doc, "").len(), 2);
    }

    #[test]
    fn test_case_insensitive_currency_search() {
        let doc = doc();
        assert_eq!(search_currencies(&doc, "eth"), vec!["ETH"]);
        assert_eq!(search_currencies(&doc, "T"), vec!["BTC", "ETH", "USDT"]);
    }

    #[test]
    fn test_collection_search() {
        let doc = doc();
        let hits = search_collections(&doc, "SNEAK");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, EntityId::new("c2"));
    }

    #[test]
    fn test_product_search_by_variant() {
        let doc = doc();
        let hits = search_products(&doc, "43");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product.id, EntityId::new("p1"));
        assert_eq!(hits[0].variants.len(), 1);
        assert_eq!(hits[0].variants[0].id, EntityId::new("v2"));
    }

    #[test]
    fn test_product_title_match_keeps_all_variants() {
        let doc = doc();
        let hits = search_products(&doc, "runner");
        assert_eq!(hits[0].variants.len(), 2);
    }

    #[test]
    fn test_target_labels() {
        let doc = doc();
        assert_eq!(target_label(&doc, &EntityId::new("p2")).as_deref(), Some("Leather belt"));
        assert_eq!(target_label(&doc, &EntityId::new("v1")).as_deref(), Some("Runner / Size 42"));
        assert_eq!(target_label(&doc, &EntityId::new("zzz")), None);
        assert_eq!(collection_title(&doc, &EntityId::new("c1")), Some("Home page"));
    }

    #[test]
    fn test_all_product_targets() {
        let doc = doc();
        let ids: Vec<String> = all_product_targets(&doc)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["p1", "v1", "v2", "p2"]);
    }
}
