use crate::model::CountryRef;

/// Countries whose common name contains `query`, ignoring case.
///
/// An empty query matches everything. No trimming or diacritic folding is
/// applied, and dataset order is preserved.
pub fn filter(dataset: &[CountryRef], query: &str) -> Vec<CountryRef> {
    if query.is_empty() {
        return dataset.to_vec();
    }

    let needle = query.to_lowercase();
    dataset
        .iter()
        .filter(|country| country.common_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
