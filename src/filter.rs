//! Order-preserving list filters.
//!
//! Every filter here takes a predicate that answers "keep this element?".
//! Elements for which it returns `true` survive, in their original order.

/// Keep the elements for which `keep` returns `true`.
pub fn filter_list<T, I, F>(items: I, mut keep: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> bool,
{
    items.into_iter().filter(|item| keep(item)).collect()
}

/// Keep the elements for which `keep(key, element)` returns `true`.
///
/// The key is usually a product name, letting the predicate cross-reference
/// each element against that product's policy.
pub fn filter_product_list<T, I, F>(items: I, key: &str, mut keep: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&str, &T) -> bool,
{
    items.into_iter().filter(|item| keep(key, item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_even(n: &i32) -> bool {
        n % 2 == 0
    }

    #[test]
    fn test_filter_list_keeps_matches() {
        assert_eq!(filter_list(vec![1, 2, 3, 4], is_even), vec![2, 4]);
    }

    #[test]
    fn test_filter_list_preserves_order() {
        let items = vec!["c", "a", "b", "a"];
        assert_eq!(filter_list(items, |s| *s != "b"), vec!["c", "a", "a"]);
    }

    #[test]
    fn test_filter_list_empty() {
        let empty: Vec<i32> = Vec::new();
        assert!(filter_list(empty, is_even).is_empty());
        assert!(filter_list(vec![1, 3], is_even).is_empty());
    }

    #[test]
    fn test_filter_product_list_uses_same_polarity() {
        let kept = filter_product_list(vec![1, 2, 3, 4], "even", |key, n| {
            assert_eq!(key, "even");
            is_even(n)
        });
        assert_eq!(kept, vec![2, 4]);
    }

    #[test]
    fn test_filter_product_list_by_name() {
        #[derive(Debug, Clone, PartialEq)]
        struct Package {
            name: &'static str,
            version: &'static str,
        }

        let packages = vec![
            Package { name: "a", version: "1.0" },
            Package { name: "b", version: "2.0" },
        ];

        let kept = filter_product_list(packages, "a", |name, p| p.name != name);
        assert_eq!(kept, vec![Package { name: "b", version: "2.0" }]);
    }
}
