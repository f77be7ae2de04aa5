//! Project tag scanner for one open-work source.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::action::ActionLine;

/// Open item that references the project under completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingItem {
    pub date: NaiveDate,
    pub description: String,
}

/// Lazily yields open items in `content` tagged `+{project_id}`.
///
/// Lines that do not parse as dated items are skipped, so one messy line
/// never fails the scan. Resolved items are ignored regardless of tags.
pub fn scan_blocking_items<'a>(
    content: &'a str,
    project_id: &'a str,
) -> impl Iterator<Item = BlockingItem> + 'a {
    content
        .lines()
        .filter_map(ActionLine::parse)
        .filter(move |item| item.is_open() && item.has_project_tag(project_id))
        .map(|item| BlockingItem {
            date: item.date,
            description: item.description,
        })
}

#[cfg(test)]
mod tests {
    use super::scan_blocking_items;

    const SOURCE: &str = "# Waiting For\n\
\n\
- [ ] 2025-10-28 Reply from vendor @email +upgrade-sd\n\
- [x] 2025-10-20 Old reminder +upgrade-sd\n\
- [ ] not-a-date Broken line +upgrade-sd\n\
- [ ] 2025-10-29 Unrelated +garden\n\
- [ ] 2025-10-30 Second item +upgrade-sd @phone\n";

    #[test]
    fn yields_open_matching_items_in_line_order() {
        let items: Vec<_> = scan_blocking_items(SOURCE, "upgrade-sd").collect();
        let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Reply from vendor", "Second item"]);
        assert_eq!(items[0].date.to_string(), "2025-10-28");
    }

    #[test]
    fn substring_and_superstring_tags_do_not_match() {
        let source = "- [ ] 2025-10-28 A +sd-cards-v2\n- [ ] 2025-10-28 B +sd\n";
        assert_eq!(scan_blocking_items(source, "sd-cards").count(), 0);
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert_eq!(scan_blocking_items("", "anything").count(), 0);
    }
}
