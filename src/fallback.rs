//! Ordered fallback lookups over nested containers.
//!
//! Channel and metadata names have drifted over the facility's operational
//! history. Instead of special-casing each historical name at every call site,
//! callers describe the places a value may live as an ordered list of
//! [`Candidate`]s and let [`get_with_fallbacks`] pick the first one that
//! resolves.
//!
//! ```rust
//! use serde_json::json;
//! use xdi_export::fallback::{get_with_fallbacks, Candidate};
//!
//! let config = json!({"nexafs_sc": {"data": {"ucal_sc_exposure_time": 0.5}}});
//! let candidates = [
//!     Candidate::chain(["nexafs_i0up", "data", "nexafs_i0up_exposure_time"]),
//!     Candidate::chain(["nexafs_sc", "data", "ucal_sc_exposure_time"]),
//! ];
//! let exposure = get_with_fallbacks(&config, &candidates).and_then(|v| v.as_f64());
//! assert_eq!(exposure, Some(0.5));
//! ```

use serde_json::Value;

/// A single place a value may be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A key looked up directly in the container
    Key(String),
    /// A path of nested keys; every key must exist at its level
    Chain(Vec<String>),
}

impl Candidate {
    /// Single-key candidate
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Nested-key candidate
    pub fn chain<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chain(keys.into_iter().map(Into::into).collect())
    }

    /// Build a list of single-key candidates, in priority order
    pub fn keys(keys: &[&str]) -> Vec<Self> {
        keys.iter().map(|k| Self::key(*k)).collect()
    }
}

impl From<&str> for Candidate {
    fn from(key: &str) -> Self {
        Self::key(key)
    }
}

impl<const N: usize> From<[&str; N]> for Candidate {
    fn from(keys: [&str; N]) -> Self {
        Self::chain(keys)
    }
}

/// Key-addressable container that may hold further containers.
///
/// `Item` is what a key resolves to. Chains descend through `Item`, so an item
/// type that is a leaf simply never resolves any key.
pub trait NestedLookup {
    /// Value type stored under a key
    type Item: NestedLookup<Item = Self::Item>;

    /// Value stored under `key`, if present
    fn get_key(&self, key: &str) -> Option<&Self::Item>;

    /// Whether `key` is present
    fn contains_key(&self, key: &str) -> bool {
        self.get_key(key).is_some()
    }
}

impl NestedLookup for Value {
    type Item = Value;

    fn get_key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }
}

/// Resolve a single candidate, requiring every key of a chain to exist.
pub fn resolve<'a, C: NestedLookup>(container: &'a C, candidate: &Candidate) -> Option<&'a C::Item> {
    match candidate {
        Candidate::Key(key) => container.get_key(key),
        Candidate::Chain(keys) => {
            let (first, rest) = keys.split_first()?;
            let mut current = container.get_key(first)?;
            for key in rest {
                current = current.get_key(key)?;
            }
            Some(current)
        }
    }
}

/// Return the value at the first candidate that fully resolves.
///
/// `None` means no candidate resolved; callers pick their own default.
pub fn get_with_fallbacks<'a, C: NestedLookup>(
    container: &'a C,
    candidates: &[Candidate],
) -> Option<&'a C::Item> {
    candidates.iter().find_map(|c| resolve(container, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_single_key_priority() {
        let thing = json!({"manip_x": 1.0, "Manipulator_x": 2.0});
        let found = get_with_fallbacks(&thing, &Candidate::keys(&["manip_x", "Manipulator_x"]));
        assert_eq!(found, Some(&json!(1.0)));

        let found = get_with_fallbacks(&thing, &Candidate::keys(&["manip_y", "Manipulator_x"]));
        assert_eq!(found, Some(&json!(2.0)));
    }

    #[test]
    fn test_partial_chain_is_not_a_match() {
        let config = json!({
            "nexafs_i0up": {"data": {}},
            "nexafs_sc": {"data": {"ucal_sc_exposure_time": 2.0}}
        });
        let candidates = [
            Candidate::from(["nexafs_i0up", "data", "nexafs_i0up_exposure_time"]),
            Candidate::from(["nexafs_sc", "data", "ucal_sc_exposure_time"]),
        ];
        assert_eq!(get_with_fallbacks(&config, &candidates), Some(&json!(2.0)));
    }

    #[test]
    fn test_chain_through_scalar_fails() {
        let config = json!({"en": 3});
        let candidates = [Candidate::from(["en", "data"])];
        assert_eq!(get_with_fallbacks(&config, &candidates), None);
    }

    #[test]
    fn test_empty_inputs() {
        let thing = json!({"a": 1});
        assert_eq!(get_with_fallbacks(&thing, &[]), None);
        assert_eq!(get_with_fallbacks(&thing, &[Candidate::Chain(vec![])]), None);
        assert_eq!(get_with_fallbacks(&json!([1, 2]), &[Candidate::key("a")]), None);
    }

    #[test]
    fn test_default_supplied_by_caller() {
        let thing = json!({});
        let value = get_with_fallbacks(&thing, &[Candidate::key("tesz")])
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        assert_eq!(value, 0.0);
    }

    proptest! {
        #[test]
        fn first_resolvable_candidate_wins(
            present in prop::collection::btree_map("[a-e]", 0i64..100, 0..5),
            lookups in prop::collection::vec("[a-h]", 0..6),
        ) {
            let container = Value::Object(
                present.iter().map(|(k, v)| (k.clone(), json!(*v))).collect(),
            );
            let candidates: Vec<Candidate> = lookups.iter().map(|p| Candidate::key(p.as_str())).collect();

            let expected = lookups.iter().find_map(|p| present.get(p)).map(|v| json!(*v));
            prop_assert_eq!(get_with_fallbacks(&container, &candidates).cloned(), expected);
        }

        #[test]
        fn nested_chain_requires_every_level(depth in 1usize..5, cut in 0usize..5) {
            let keys: Vec<String> = (0..depth).map(|i| format!("k{i}")).collect();
            let mut value = json!(42);
            for key in keys.iter().rev() {
                let mut map = serde_json::Map::new();
                map.insert(key.clone(), value);
                value = Value::Object(map);
            }
            let mut broken = keys.clone();
            if cut < depth {
                broken[cut] = "missing".to_string();
            }
            let found = get_with_fallbacks(&value, &[Candidate::Chain(broken)]);
            if cut < depth {
                prop_assert!(found.is_none());
            } else {
                prop_assert_eq!(found.cloned(), Some(json!(42)));
            }
        }
    }
}
