//! The built-in menu legend.

use palaver_core::entities::{MenuCategory, MenuData, MenuItem};

/// Categories and their items, in display order.
const LEGEND: &[(&str, &[&str])] = &[
    ("general", &["dashboard", "calendar", "members"]),
    ("forum-management", &["categories", "forums", "topics", "tags"]),
];

/// The menu state a fresh tracker starts from: every category collapsed,
/// nothing selected.
#[must_use]
pub fn default_menu() -> MenuData {
    MenuData {
        categories: LEGEND
            .iter()
            .map(|(category, items)| MenuCategory {
                id: (*category).to_string(),
                expanded: false,
                items: items
                    .iter()
                    .map(|item| MenuItem {
                        id: (*item).to_string(),
                        selected: false,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_menu_shape() {
        let menu = default_menu();
        assert_eq!(menu.categories.len(), 2);
        assert!(menu.categories.iter().all(|c| !c.expanded));
        assert_eq!(menu.selected_count(), 0);
        assert_eq!(menu.categories[0].id, "general");
        assert_eq!(menu.categories[1].items.len(), 4);
    }
}
