/// Narrow capability interface over the host tab/tab-group API
///
/// The reconciliation logic only ever talks to this trait, so it can run
/// against the live `chrome.*` bridge in the extension and against an
/// in-memory fake in tests.
use thiserror::Error;

use crate::tab_data::{GroupColor, GroupInfo, TabInfo};

/// Failure modes of host API calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrowserError {
    /// Tab or group vanished between lookup and use; an expected race.
    #[error("resource not found: {0}")]
    NotFound(String),
    /// Host denied the call (restricted page, revoked permission,
    /// invalidated extension context).
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Anything else the host reported.
    #[error("host api error: {0}")]
    Api(String),
}

impl BrowserError {
    /// Classify a host error message the way the host phrases them.
    pub fn from_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("no tab with id")
            || lower.contains("no group with id")
            || lower.contains("not found")
        {
            BrowserError::NotFound(message)
        } else if lower.contains("cannot access")
            || lower.contains("permission denied")
            || lower.contains("extension context invalidated")
        {
            BrowserError::PermissionDenied(message)
        } else {
            BrowserError::Api(message)
        }
    }
}

/// Host tab/tab-group operations the grouping logic needs. All calls are
/// asynchronous and fallible; none of them panic.
pub trait Browser {
    /// Tabs in one window, or in every window when `window_id` is `None`.
    async fn query_tabs(&self, window_id: Option<i32>) -> Result<Vec<TabInfo>, BrowserError>;

    /// Live data for one tab.
    async fn get_tab(&self, tab_id: i32) -> Result<TabInfo, BrowserError>;

    /// All groups in a window.
    async fn query_groups(&self, window_id: i32) -> Result<Vec<GroupInfo>, BrowserError>;

    /// Live data for one group; `NotFound` once the host dissolved it.
    async fn get_group(&self, group_id: i32) -> Result<GroupInfo, BrowserError>;

    /// Create a new group from the given tabs (at least one required) and
    /// return its id. The group lands in the window of those tabs.
    async fn create_group(&self, tab_ids: &[i32]) -> Result<i32, BrowserError>;

    /// Add tabs to an existing group. A tab belongs to at most one group, so
    /// this also removes them from any previous group.
    async fn add_to_group(&self, tab_ids: &[i32], group_id: i32) -> Result<(), BrowserError>;

    /// Remove tabs from whatever group they are in.
    async fn ungroup(&self, tab_ids: &[i32]) -> Result<(), BrowserError>;

    /// Set a group's title and color, returning the updated group.
    async fn update_group(
        &self,
        group_id: i32,
        title: &str,
        color: GroupColor,
    ) -> Result<GroupInfo, BrowserError>;

    /// Open a new tab in a window (used for placeholder seeds).
    async fn create_tab(&self, window_id: i32, url: &str) -> Result<TabInfo, BrowserError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory host with the two behaviors the grouping logic leans on:
    //! a tab belongs to at most one group, and a group left with zero tabs
    //! is dissolved immediately.

    use std::cell::RefCell;

    use super::{Browser, BrowserError};
    use crate::tab_data::{GroupColor, GroupInfo, TabInfo, TAB_GROUP_ID_NONE};

    #[derive(Default)]
    struct State {
        tabs: Vec<TabInfo>,
        groups: Vec<GroupInfo>,
        next_tab_id: i32,
        next_group_id: i32,
        mutation_calls: usize,
        query_calls: usize,
    }

    #[derive(Default)]
    pub struct FakeBrowser {
        state: RefCell<State>,
        pub fail_queries: RefCell<bool>,
        pub fail_mutations: RefCell<bool>,
    }

    impl FakeBrowser {
        pub fn new() -> Self {
            let browser = FakeBrowser::default();
            {
                let mut state = browser.state.borrow_mut();
                state.next_tab_id = 1;
                state.next_group_id = 100;
            }
            browser
        }

        pub fn add_tab(&self, id: i32, window_id: i32, url: &str) -> TabInfo {
            let tab = TabInfo {
                id: Some(id),
                url: Some(url.to_string()),
                title: None,
                window_id,
                group_id: TAB_GROUP_ID_NONE,
            };
            let mut state = self.state.borrow_mut();
            state.next_tab_id = state.next_tab_id.max(id + 1);
            state.tabs.push(tab.clone());
            tab
        }

        pub fn add_group(&self, id: i32, window_id: i32, title: &str, members: &[i32]) -> GroupInfo {
            let group = GroupInfo {
                id,
                title: Some(title.to_string()),
                color: GroupColor::Blue,
                collapsed: false,
                window_id,
            };
            let mut state = self.state.borrow_mut();
            state.next_group_id = state.next_group_id.max(id + 1);
            state.groups.push(group.clone());
            for tab in state.tabs.iter_mut() {
                if tab.id.is_some_and(|tab_id| members.contains(&tab_id)) {
                    tab.group_id = id;
                }
            }
            group
        }

        pub fn remove_group(&self, group_id: i32) {
            let mut state = self.state.borrow_mut();
            state.groups.retain(|g| g.id != group_id);
            for tab in state.tabs.iter_mut() {
                if tab.group_id == group_id {
                    tab.group_id = TAB_GROUP_ID_NONE;
                }
            }
        }

        pub fn tab(&self, tab_id: i32) -> Option<TabInfo> {
            self.state
                .borrow()
                .tabs
                .iter()
                .find(|t| t.id == Some(tab_id))
                .cloned()
        }

        pub fn set_tab_url(&self, tab_id: i32, url: &str) {
            let mut state = self.state.borrow_mut();
            if let Some(tab) = state.tabs.iter_mut().find(|t| t.id == Some(tab_id)) {
                tab.url = Some(url.to_string());
            }
        }

        pub fn all_groups(&self) -> Vec<GroupInfo> {
            self.state.borrow().groups.clone()
        }

        pub fn tabs_in_group(&self, group_id: i32) -> Vec<TabInfo> {
            self.state
                .borrow()
                .tabs
                .iter()
                .filter(|t| t.group_id == group_id)
                .cloned()
                .collect()
        }

        pub fn mutation_calls(&self) -> usize {
            self.state.borrow().mutation_calls
        }

        pub fn query_calls(&self) -> usize {
            self.state.borrow().query_calls
        }

        fn check_query(&self) -> Result<(), BrowserError> {
            if *self.fail_queries.borrow() {
                return Err(BrowserError::Api("injected query failure".to_string()));
            }
            Ok(())
        }

        fn check_mutation(&self) -> Result<(), BrowserError> {
            if *self.fail_mutations.borrow() {
                return Err(BrowserError::PermissionDenied(
                    "Permission denied (injected)".to_string(),
                ));
            }
            Ok(())
        }

        fn dissolve_empty_groups(state: &mut State) {
            let tabs = &state.tabs;
            state
                .groups
                .retain(|group| tabs.iter().any(|tab| tab.group_id == group.id));
        }
    }

    impl Browser for FakeBrowser {
        async fn query_tabs(&self, window_id: Option<i32>) -> Result<Vec<TabInfo>, BrowserError> {
            self.check_query()?;
            let mut state = self.state.borrow_mut();
            state.query_calls += 1;
            Ok(state
                .tabs
                .iter()
                .filter(|tab| window_id.is_none_or(|w| tab.window_id == w))
                .cloned()
                .collect())
        }

        async fn get_tab(&self, tab_id: i32) -> Result<TabInfo, BrowserError> {
            self.check_query()?;
            let mut state = self.state.borrow_mut();
            state.query_calls += 1;
            state
                .tabs
                .iter()
                .find(|t| t.id == Some(tab_id))
                .cloned()
                .ok_or_else(|| BrowserError::NotFound(format!("No tab with id: {tab_id}")))
        }

        async fn query_groups(&self, window_id: i32) -> Result<Vec<GroupInfo>, BrowserError> {
            self.check_query()?;
            let mut state = self.state.borrow_mut();
            state.query_calls += 1;
            Ok(state
                .groups
                .iter()
                .filter(|g| g.window_id == window_id)
                .cloned()
                .collect())
        }

        async fn get_group(&self, group_id: i32) -> Result<GroupInfo, BrowserError> {
            self.check_query()?;
            let mut state = self.state.borrow_mut();
            state.query_calls += 1;
            state
                .groups
                .iter()
                .find(|g| g.id == group_id)
                .cloned()
                .ok_or_else(|| BrowserError::NotFound(format!("No group with id: {group_id}")))
        }

        async fn create_group(&self, tab_ids: &[i32]) -> Result<i32, BrowserError> {
            self.check_mutation()?;
            let mut state = self.state.borrow_mut();
            state.mutation_calls += 1;

            let first = tab_ids
                .first()
                .ok_or_else(|| BrowserError::Api("cannot group zero tabs".to_string()))?;
            let window_id = state
                .tabs
                .iter()
                .find(|t| t.id == Some(*first))
                .map(|t| t.window_id)
                .ok_or_else(|| BrowserError::NotFound(format!("No tab with id: {first}")))?;

            let group_id = state.next_group_id;
            state.next_group_id += 1;
            for tab in state.tabs.iter_mut() {
                if tab.id.is_some_and(|id| tab_ids.contains(&id)) {
                    tab.group_id = group_id;
                }
            }
            Self::dissolve_empty_groups(&mut state);
            state.groups.push(GroupInfo {
                id: group_id,
                title: None,
                color: GroupColor::Grey,
                collapsed: false,
                window_id,
            });
            Ok(group_id)
        }

        async fn add_to_group(&self, tab_ids: &[i32], group_id: i32) -> Result<(), BrowserError> {
            self.check_mutation()?;
            let mut state = self.state.borrow_mut();
            state.mutation_calls += 1;

            if !state.groups.iter().any(|g| g.id == group_id) {
                return Err(BrowserError::NotFound(format!("No group with id: {group_id}")));
            }
            for tab_id in tab_ids {
                if !state.tabs.iter().any(|t| t.id == Some(*tab_id)) {
                    return Err(BrowserError::NotFound(format!("No tab with id: {tab_id}")));
                }
            }
            for tab in state.tabs.iter_mut() {
                if tab.id.is_some_and(|id| tab_ids.contains(&id)) {
                    tab.group_id = group_id;
                }
            }
            Self::dissolve_empty_groups(&mut state);
            Ok(())
        }

        async fn ungroup(&self, tab_ids: &[i32]) -> Result<(), BrowserError> {
            self.check_mutation()?;
            let mut state = self.state.borrow_mut();
            state.mutation_calls += 1;

            for tab in state.tabs.iter_mut() {
                if tab.id.is_some_and(|id| tab_ids.contains(&id)) {
                    tab.group_id = TAB_GROUP_ID_NONE;
                }
            }
            Self::dissolve_empty_groups(&mut state);
            Ok(())
        }

        async fn update_group(
            &self,
            group_id: i32,
            title: &str,
            color: GroupColor,
        ) -> Result<GroupInfo, BrowserError> {
            self.check_mutation()?;
            let mut state = self.state.borrow_mut();
            state.mutation_calls += 1;

            let group = state
                .groups
                .iter_mut()
                .find(|g| g.id == group_id)
                .ok_or_else(|| BrowserError::NotFound(format!("No group with id: {group_id}")))?;
            group.title = Some(title.to_string());
            group.color = color;
            Ok(group.clone())
        }

        async fn create_tab(&self, window_id: i32, url: &str) -> Result<TabInfo, BrowserError> {
            self.check_mutation()?;
            let mut state = self.state.borrow_mut();
            state.mutation_calls += 1;

            let id = state.next_tab_id;
            state.next_tab_id += 1;
            let tab = TabInfo {
                id: Some(id),
                url: Some(url.to_string()),
                title: None,
                window_id,
                group_id: TAB_GROUP_ID_NONE,
            };
            state.tabs.push(tab.clone());
            Ok(tab)
        }
    }
}
