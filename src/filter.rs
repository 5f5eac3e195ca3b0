use crate::results::ContentItem;

/// Filter content items by a case-insensitive substring of their tag or text.
///
/// The input is never modified; an empty predicate yields every item, in order.
pub fn filter_content<'a>(items: &'a [ContentItem], predicate: &str) -> Vec<&'a ContentItem> {
    if predicate.is_empty() {
        return items.iter().collect();
    }

    let needle = predicate.to_lowercase();
    items.iter().filter(|item| matches(item, &needle)).collect()
}

/// `needle` must already be lowercase
fn matches(item: &ContentItem, needle: &str) -> bool {
    item.tag.to_lowercase().contains(needle) || item.text.to_lowercase().contains(needle)
}
