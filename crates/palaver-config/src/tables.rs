//! The deployment-wide cacheable table list.

/// Tables mirrored into the cache at boot.
///
/// The mirror is the system of record for all reads, so every table the
/// application reads must appear here; a missing table fails `build()` and
/// the process does not start.
pub const DEFAULT_CACHEABLE_TABLES: &[&str] = &[
    "members",
    "member_devices",
    "member_groups",
    "group_members",
    "sessions",
    "menu_tracker",
    "calendars",
    "calendar_events",
    "categories",
    "forums",
    "topics",
    "posts",
    "post_likes",
    "polls",
    "poll_options",
    "poll_votes",
    "tags",
    "topic_tags",
    "attachments",
    "private_messages",
    "notifications",
    "reports",
    "bans",
    "moderation_log",
    "settings",
    "emoticons",
    "signatures",
    "drafts",
    "bookmarks",
    "subscriptions",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_tables_are_cacheable() {
        for table in ["members", "member_devices", "sessions", "menu_tracker", "calendars"] {
            assert!(DEFAULT_CACHEABLE_TABLES.contains(&table), "missing {table}");
        }
    }

    #[test]
    fn test_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for table in DEFAULT_CACHEABLE_TABLES {
            assert!(seen.insert(table), "duplicate {table}");
        }
    }
}
