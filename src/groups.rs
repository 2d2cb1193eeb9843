/// Group reconciliation: locate, create, and attach
///
/// These routines never propagate host failures to their callers; a failed
/// call is logged and collapses to "not found" / `false`, so the tab simply
/// stays where it was.
use crate::browser::{Browser, BrowserError};
use crate::config::{GroupingConfig, PLACEHOLDER_TAB_URL};
use crate::domain::{extract_domain, is_ignored_url, is_valid_domain};
use crate::tab_data::{GroupInfo, TabInfo};

fn log_host_error(context: &str, err: &BrowserError) {
    match err {
        // Expected race: the resource vanished between lookup and use.
        BrowserError::NotFound(_) => log::warn!("{context}: {err}"),
        _ => log::error!("{context}: {err}"),
    }
}

/// All tabs in a window (or everywhere) whose extracted domain matches.
/// Query failure is logged and yields an empty list.
pub async fn find_tabs_by_domain<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    domain: &str,
    window_id: Option<i32>,
) -> Vec<TabInfo> {
    let tabs = match browser.query_tabs(window_id).await {
        Ok(tabs) => tabs,
        Err(err) => {
            log_host_error("querying tabs", &err);
            return Vec::new();
        }
    };

    tabs.into_iter()
        .filter(|tab| tab.id.is_some())
        .filter(|tab| extract_domain(tab.url.as_deref(), config).as_deref() == Some(domain))
        .collect()
}

/// Find the auto-created group for a domain in a window. Matches on the
/// exact title (prefix + domain); user-owned groups never match. Read-only.
pub async fn find_group_by_domain<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    domain: &str,
    window_id: i32,
) -> Option<GroupInfo> {
    let groups = match browser.query_groups(window_id).await {
        Ok(groups) => groups,
        Err(err) => {
            log_host_error("querying groups", &err);
            return None;
        }
    };

    let title = config.group_title(domain);
    groups
        .into_iter()
        .find(|g| g.title.as_deref() == Some(title.as_str()))
}

/// Create a group for a domain in a window and return it fully described
/// (titled and colored).
///
/// The host refuses to group zero tabs, so the group is seeded from the live
/// tabs of that domain in the window. When `target_tab` is given (the tab
/// whose creation triggered this) and no peer tab shares the domain, no group
/// is created: a lone tab does not warrant one. When no target is given and
/// no domain tab exists at all, a blank placeholder tab seeds the group; it
/// stays in the group until a real tab joins, because removing it earlier
/// would leave the group empty and the host would dissolve it (see
/// `add_tab_to_group`).
pub async fn create_group_for_domain<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    domain: &str,
    window_id: i32,
    target_tab: Option<i32>,
) -> Option<GroupInfo> {
    if !is_valid_domain(domain) {
        log::debug!("refusing to create group for malformed domain {domain:?}");
        return None;
    }

    // Seed only from tabs that are not already grouped: tabs in foreign
    // groups may be user-owned, and user groups are never mutated.
    let mut seed_ids: Vec<i32> = find_tabs_by_domain(browser, config, domain, Some(window_id))
        .await
        .into_iter()
        .filter(|tab| !tab.is_grouped())
        .filter_map(|tab| tab.id)
        .take(config.max_group_size)
        .collect();

    if let Some(target) = target_tab {
        let has_peer = seed_ids.iter().any(|&id| id != target);
        if !has_peer {
            log::debug!("no peer tab for domain {domain} in window {window_id}, skipping group");
            return None;
        }
        if !seed_ids.contains(&target) {
            seed_ids.push(target);
        }
    } else if seed_ids.is_empty() {
        let placeholder = match browser.create_tab(window_id, PLACEHOLDER_TAB_URL).await {
            Ok(tab) => tab,
            Err(err) => {
                log_host_error("creating placeholder tab", &err);
                return None;
            }
        };
        let Some(placeholder_id) = placeholder.id else {
            log::error!("placeholder tab came back without an id");
            return None;
        };
        seed_ids.push(placeholder_id);
    }

    let group_id = match browser.create_group(&seed_ids).await {
        Ok(id) => id,
        Err(err) => {
            log_host_error("creating group", &err);
            return None;
        }
    };

    // Title and color must land right after creation; an untitled group is
    // invisible to the locator and would invite duplicates.
    let title = config.group_title(domain);
    let color = config.color_for_domain(domain);
    match browser.update_group(group_id, &title, color).await {
        Ok(group) => Some(group),
        Err(err) => {
            log_host_error("titling new group", &err);
            None
        }
    }
}

/// Locate the group for a domain, creating it if absent.
pub async fn get_or_create_group<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    domain: &str,
    window_id: i32,
    target_tab: Option<i32>,
) -> Option<GroupInfo> {
    if let Some(group) = find_group_by_domain(browser, config, domain, window_id).await {
        return Some(group);
    }
    create_group_for_domain(browser, config, domain, window_id, target_tab).await
}

/// Attach a tab to a group, tolerating the group having vanished since it
/// was looked up. Returns `false` on any failure; never panics, no retry.
///
/// After a successful attach, any placeholder tab (blank internal page used
/// only to seed creation) other than the tab just attached is detached from
/// the group. Doing the cleanup here, after a real member exists, keeps the
/// group from ever being briefly empty.
pub async fn add_tab_to_group<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    tab_id: i32,
    group_id: i32,
) -> bool {
    // Re-check, not a cached assumption: the host dissolves empty groups on
    // its own schedule.
    let group = match browser.get_group(group_id).await {
        Ok(group) => group,
        Err(err) => {
            log_host_error("group vanished before attach", &err);
            return false;
        }
    };

    if let Ok(tabs) = browser.query_tabs(Some(group.window_id)).await {
        let member_count = tabs
            .iter()
            .filter(|t| t.group_id == group.id && t.id != Some(tab_id))
            .count();
        if member_count >= config.max_group_size {
            log::info!(
                "group {} is at its size limit ({}), leaving tab {tab_id} ungrouped",
                group.id,
                config.max_group_size
            );
            return false;
        }
    }

    if let Err(err) = browser.add_to_group(&[tab_id], group_id).await {
        log_host_error("attaching tab to group", &err);
        return false;
    }

    remove_placeholder_tabs(browser, config, &group, tab_id).await;
    true
}

/// Detach seed/placeholder tabs now that a real tab is in the group.
/// Cleanup failures are logged and do not affect the attach result.
async fn remove_placeholder_tabs<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    group: &GroupInfo,
    just_attached: i32,
) {
    let tabs = match browser.query_tabs(Some(group.window_id)).await {
        Ok(tabs) => tabs,
        Err(err) => {
            log_host_error("querying group members for cleanup", &err);
            return;
        }
    };

    let placeholder_ids: Vec<i32> = tabs
        .iter()
        .filter(|tab| tab.group_id == group.id)
        .filter(|tab| tab.id != Some(just_attached))
        .filter(|tab| is_ignored_url(tab.url.as_deref(), config))
        .filter_map(|tab| tab.id)
        .collect();

    if placeholder_ids.is_empty() {
        return;
    }

    if let Err(err) = browser.ungroup(&placeholder_ids).await {
        log_host_error("detaching placeholder tabs", &err);
    } else {
        log::debug!(
            "detached {} placeholder tab(s) from group {}",
            placeholder_ids.len(),
            group.id
        );
    }
}
