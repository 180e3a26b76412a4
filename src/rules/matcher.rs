//! Picks the rule that applies to a file.

use std::path::Path;

use crate::models::Rule;

use super::classifier;

/// First enabled rule that accepts `path`, scanning `rules` in order.
///
/// Rules must be supplied in creation order. A path that cannot be stat'ed
/// matches nothing.
pub fn match_rule<'a>(path: &Path, rules: &'a [Rule]) -> Option<&'a Rule> {
    let metadata = std::fs::metadata(path).ok()?;
    let category = classifier::classify(path, metadata.is_dir());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    rules.iter().filter(|rule| rule.enabled).find(|rule| {
        rule.allow_all_files
            || (!ext.is_empty() && match_extension(&ext, &rule.custom_extensions))
            || category.is_some_and(|c| contains_category(&rule.file_types, c))
    })
}

/// Case- and dot-insensitive extension membership
pub fn match_extension(ext: &str, items: &[String]) -> bool {
    let wanted = normalize_extension(ext);
    items.iter().any(|item| normalize_extension(item) == wanted)
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn contains_category(items: &[String], category: &str) -> bool {
    items.iter().any(|item| item.eq_ignore_ascii_case(category))
}
