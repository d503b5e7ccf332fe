use std::collections::HashSet;

/// Removes duplicate and empty values, keeping the first occurrence of each
///
/// The output preserves first-seen order and never contains empty strings,
/// so applying it twice yields the same result as applying it once.
pub fn remove_duplicates<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut encountered = HashSet::new();
    let mut result = Vec::new();

    for value in values {
        if value.is_empty() || encountered.contains(&value) {
            continue;
        }
        encountered.insert(value.clone());
        result.push(value);
    }

    result
}
