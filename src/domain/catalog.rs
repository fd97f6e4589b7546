use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tag that places a product in the platform's own curated storefront.
pub const OFFICIAL_TAG: &str = "bazario-official";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

/// Trims, lowercases and de-duplicates tags, dropping empty ones.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub fn is_official(tags: &[String]) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(OFFICIAL_TAG))
}

pub fn with_official(tags: &[String], official: bool) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .filter(|t| !t.eq_ignore_ascii_case(OFFICIAL_TAG))
        .cloned()
        .collect();
    if official {
        out.push(String::from(OFFICIAL_TAG));
    }
    out
}

pub fn has_stock_for(stock: i32, unlimited: bool, requested: i32) -> bool {
    unlimited || stock >= requested
}

/// Lowercase ASCII slug with single dashes between words.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Batch operations on the official product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
    MarkOfficial,
    UnmarkOfficial,
}

impl BulkAction {
    /// Everything except `MarkOfficial` only touches products already in the
    /// official line.
    pub fn applies_to(&self, tags: &[String]) -> bool {
        match self {
            BulkAction::MarkOfficial => !is_official(tags),
            _ => is_official(tags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn normalize_trims_lowercases_and_dedupes() {
        let out = normalize_tags(["  Pottery ", "pottery", "", "Bazario-Official"]);
        assert_eq!(out, tags(&["pottery", "bazario-official"]));
    }

    #[test]
    fn official_flag_round_trip_keeps_other_tags() {
        let base = tags(&["handmade", "BAZARIO-OFFICIAL"]);
        assert!(is_official(&base));

        let cleared = with_official(&base, false);
        assert_eq!(cleared, tags(&["handmade"]));
        assert!(!is_official(&cleared));

        let marked = with_official(&cleared, true);
        assert_eq!(marked, tags(&["handmade", OFFICIAL_TAG]));
    }

    #[test]
    fn unlimited_stock_always_satisfies() {
        assert!(has_stock_for(0, true, 50));
        assert!(has_stock_for(3, false, 3));
        assert!(!has_stock_for(2, false, 3));
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("  Jewelry -- Rings!"), "jewelry-rings");
        assert_eq!(slugify("Céramique"), "c-ramique");
    }

    #[test]
    fn bulk_actions_respect_official_line() {
        let official = tags(&[OFFICIAL_TAG]);
        let vendor = tags(&["handmade"]);
        assert!(BulkAction::Deactivate.applies_to(&official));
        assert!(!BulkAction::Deactivate.applies_to(&vendor));
        assert!(BulkAction::MarkOfficial.applies_to(&vendor));
        assert!(!BulkAction::MarkOfficial.applies_to(&official));
        assert!(BulkAction::UnmarkOfficial.applies_to(&official));
    }
}
