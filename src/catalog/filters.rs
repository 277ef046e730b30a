//! Query filter normalization.
//!
//! A catalog query arrives as a set of optional form values. Empty strings
//! and the `"0"` sentinel (the "any" option of the query form selects) are
//! excluded; the remaining filters are combined with logical AND. With no
//! filters left, the whole collection matches.

/// A filterable book field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Type name, substring, case-insensitive
    Type,
    /// Location code, substring, case-insensitive
    Location,
    /// Title, substring, case-insensitive
    Title,
    /// Subject/content, substring, case-insensitive
    Content,
    /// Language code, substring, case-insensitive
    Language,
    /// Author name, substring, case-insensitive
    Author,
    /// Publisher, substring, case-insensitive
    Publisher,
}

/// The normalized, non-empty filter set of one query.
#[derive(Debug, Clone, Default)]
pub struct BookFilters {
    active: Vec<(FilterField, String)>,
}

impl BookFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter unless its value is empty or the `"0"` sentinel.
    pub fn push(&mut self, field: FilterField, value: Option<&str>) {
        if let Some(value) = value {
            let trimmed = value.trim();
            if !trimmed.is_empty() && trimmed != "0" {
                self.active.push((field, trimmed.to_string()));
            }
        }
    }

    /// True when no filter survived normalization; the full collection is
    /// considered in that case.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FilterField, String)> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_excluded() {
        let mut filters = BookFilters::new();
        filters.push(FilterField::Type, Some("fiction"));
        filters.push(FilterField::Author, Some(""));
        filters.push(FilterField::Publisher, Some("   "));
        filters.push(FilterField::Language, None);
        assert_eq!(filters.len(), 1);
        let (field, value) = filters.iter().next().unwrap();
        assert_eq!(*field, FilterField::Type);
        assert_eq!(value, "fiction");
    }

    #[test]
    fn test_sentinel_zero_is_excluded() {
        let mut filters = BookFilters::new();
        filters.push(FilterField::Type, Some("0"));
        filters.push(FilterField::Location, Some(" 0 "));
        assert!(filters.is_empty());
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut filters = BookFilters::new();
        filters.push(FilterField::Title, Some("  trial  "));
        assert_eq!(filters.iter().next().unwrap().1, "trial");
    }

    #[test]
    fn test_no_filters_means_full_collection() {
        let filters = BookFilters::new();
        assert!(filters.is_empty());
    }
}
