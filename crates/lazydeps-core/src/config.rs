//! Dependency configuration.
//!
//! A [`DependencyMap`] maps dependency names to the stylesheets and scripts
//! that make up each dependency. Maps are merged rather than replaced: a later
//! map overrides same-named entries and leaves the others alone.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

/// The resources making up one named dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Stylesheet URLs, loaded concurrently before any script.
    pub css: Vec<String>,
    /// Script URLs.
    pub js: Vec<String>,
    /// Load scripts one at a time in array order.
    pub sequential: bool,
}

impl DependencyConfig {
    /// Create an empty dependency configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stylesheet URL.
    #[must_use]
    pub fn with_css(mut self, url: impl Into<String>) -> Self {
        self.css.push(url.into());
        self
    }

    /// Append a script URL.
    #[must_use]
    pub fn with_js(mut self, url: impl Into<String>) -> Self {
        self.js.push(url.into());
        self
    }

    /// Set whether scripts load sequentially.
    #[must_use]
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Whether the dependency references no resources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }
}

/// Name → dependency configuration, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyMap(BTreeMap<String, DependencyConfig>);

impl DependencyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, config: DependencyConfig) -> Self {
        self.0.insert(name.into(), config);
        self
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        config: DependencyConfig,
    ) -> Option<DependencyConfig> {
        self.0.insert(name.into(), config)
    }

    /// Merge `other` into `self`; entries in `other` win.
    ///
    /// Returns the names that were not present before the merge.
    pub fn merge(&mut self, other: Self) -> Vec<String> {
        let mut added = Vec::new();
        for (name, config) in other.0 {
            if self.0.insert(name.clone(), config).is_none() {
                added.push(name);
            }
        }
        added
    }

    /// Look up a dependency.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DependencyConfig> {
        self.0.get(name)
    }

    /// Whether `name` is configured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Configured names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over entries in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, DependencyConfig> {
        self.0.iter()
    }

    /// Number of configured dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, DependencyConfig)> for DependencyMap {
    fn from_iter<I: IntoIterator<Item = (N, DependencyConfig)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, config)| (name.into(), config))
                .collect(),
        )
    }
}

impl IntoIterator for DependencyMap {
    type Item = (String, DependencyConfig);
    type IntoIter = btree_map::IntoIter<String, DependencyConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DependencyMap {
    type Item = (&'a String, &'a DependencyConfig);
    type IntoIter = btree_map::Iter<'a, String, DependencyConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One or many dependency names, as accepted by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepNames(Vec<String>);

impl DepNames {
    /// The names in the order given.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Whether no names were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DepNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_owned()])
    }
}

impl From<String> for DepNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for DepNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for DepNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| (*n).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for DepNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| (*n).to_owned()).collect())
    }
}

impl From<&[String]> for DepNames {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_and_reports_new_names() {
        let mut base = DependencyMap::new()
            .with("widget", DependencyConfig::new().with_js("old.js"))
            .with("chart", DependencyConfig::new().with_js("chart.js"));

        let added = base.merge(
            DependencyMap::new()
                .with("widget", DependencyConfig::new().with_js("new.js"))
                .with("editor", DependencyConfig::new().with_css("editor.css")),
        );

        assert_eq!(added, vec!["editor".to_string()]);
        assert_eq!(base.len(), 3);
        assert_eq!(base.get("widget").unwrap().js, vec!["new.js".to_string()]);
        assert_eq!(base.get("chart").unwrap().js, vec!["chart.js".to_string()]);
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let map: DependencyMap =
            serde_json::from_str(r#"{"widget": {"js": ["a.js", "b.js"], "sequential": true}}"#)
                .unwrap();
        let widget = map.get("widget").unwrap();
        assert!(widget.css.is_empty());
        assert_eq!(widget.js.len(), 2);
        assert!(widget.sequential);
    }

    #[test]
    fn test_dep_names_conversions() {
        assert_eq!(DepNames::from("a").as_slice(), &["a".to_string()]);
        assert_eq!(DepNames::from(["a", "b"]).into_vec(), vec!["a", "b"]);
        assert!(DepNames::from(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_empty_dependency() {
        assert!(DependencyConfig::new().is_empty());
        assert!(!DependencyConfig::new().with_css("a.css").is_empty());
    }
}
