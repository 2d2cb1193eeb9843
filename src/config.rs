/// Grouping configuration for Tab Grouper
///
/// Every component takes a `GroupingConfig` by reference instead of reading
/// module-level globals, so tests can run against alternate configurations.
use crate::tab_data::GroupColor;

/// Title prefix marking groups this extension created. Groups without the
/// prefix are user-owned and must never be touched.
pub const AUTO_GROUP_PREFIX: &str = "[Auto]";

/// URL prefixes excluded from domain extraction and grouping.
pub const IGNORED_URL_PATTERNS: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "about:",
    "data:",
    "moz-extension://",
    "edge://",
    "opera://",
    "brave://",
];

/// Maximum number of tabs one auto-created group may hold.
pub const MAX_GROUP_SIZE: usize = 20;

/// Blank internal page used to seed group creation when no real tab is
/// available (the host refuses to create a group with zero members).
pub const PLACEHOLDER_TAB_URL: &str = "chrome://newtab";

/// Color rotation for new groups.
pub const DEFAULT_GROUP_COLORS: &[GroupColor] = &[
    GroupColor::Blue,
    GroupColor::Red,
    GroupColor::Yellow,
    GroupColor::Green,
    GroupColor::Pink,
    GroupColor::Purple,
    GroupColor::Cyan,
    GroupColor::Orange,
];

/// Settings consumed by the reconciliation components.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingConfig {
    /// Title prefix for auto-created groups.
    pub auto_group_prefix: String,
    /// URL prefixes that are never grouped. The extractor and the validator
    /// both read this list, so their decisions cannot diverge.
    pub ignored_url_patterns: Vec<String>,
    /// Colors cycled through when creating groups.
    pub group_colors: Vec<GroupColor>,
    /// Cap on tabs per auto-created group.
    pub max_group_size: usize,
    /// Master switch; when false the handlers do nothing.
    pub enable_auto_grouping: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig {
            auto_group_prefix: AUTO_GROUP_PREFIX.to_string(),
            ignored_url_patterns: IGNORED_URL_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            group_colors: DEFAULT_GROUP_COLORS.to_vec(),
            max_group_size: MAX_GROUP_SIZE,
            enable_auto_grouping: true,
        }
    }
}

impl GroupingConfig {
    /// Title of the auto-created group for a domain, e.g. `[Auto] example.com`.
    pub fn group_title(&self, domain: &str) -> String {
        format!("{} {}", self.auto_group_prefix, domain)
    }

    /// Deterministic color for a domain: a stable hash of the domain picks an
    /// index into the rotation, so repeated creations within a session agree.
    pub fn color_for_domain(&self, domain: &str) -> GroupColor {
        if self.group_colors.is_empty() {
            return GroupColor::Grey;
        }
        let hash = domain
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        self.group_colors[hash % self.group_colors.len()]
    }
}
