pub mod admin_service;
pub mod auth_service;
pub mod category_service;
pub mod message_service;
pub mod official_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;
pub mod vendor_service;

use std::collections::BTreeMap;

/// Collects `GROUP BY key` rows into a map, so absent keys read as missing
/// rather than zero.
pub(crate) fn count_map(rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    rows.into_iter().collect()
}

/// `%search%` for `ILIKE`, with `\\`, `%` and `_` in the search escaped so they
/// match literally. Postgres uses backslash as the default `LIKE` escape.
pub(crate) fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("  bowl "), "%bowl%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn count_map_keeps_keys_sorted() {
        let map = count_map(vec![("shipped".into(), 2), ("cancelled".into(), 1)]);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["cancelled", "shipped"]);
        assert_eq!(map["shipped"], 2);
    }
}
