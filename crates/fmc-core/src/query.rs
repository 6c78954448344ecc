//! Convenience builder for FMC query parameters.
//!
//! Resources add optional pairs such as `section`, `category` or
//! `insertBefore`; the dispatcher adds the paging pairs.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: ToString,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append pairs from another list, skipping keys already present.
    pub fn merge(&mut self, other: &[(&'static str, String)]) {
        for (key, value) in other {
            if !self.contains(key) {
                self.pairs.push((key, value.clone()));
            }
        }
    }

    /// Returns true if a pair with the given key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| *k == key)
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("section", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn merge_keeps_existing_values() {
        let mut params = QueryParams::new();
        params.push("limit", 25);
        params.merge(&[("limit", "1000".to_string()), ("expanded", "true".to_string())]);
        assert_eq!(
            params.into_pairs(),
            vec![("limit", "25".to_string()), ("expanded", "true".to_string())]
        );
    }
}
