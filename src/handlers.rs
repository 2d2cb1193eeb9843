/// Tab lifecycle event handlers
///
/// Each handler is a short pipeline: guard, extract domain, locate-or-create
/// a group, attach. No state is kept between invocations. The public entry
/// points swallow every failure: an error escaping into the host's event
/// dispatch loop could disable the listener for the rest of the session.
use crate::browser::{Browser, BrowserError};
use crate::config::GroupingConfig;
use crate::domain::extract_domain;
use crate::groups::{add_tab_to_group, get_or_create_group};
use crate::tab_data::{TabChangeInfo, TabInfo, TabMoveInfo};

/// React to a newly created tab: place it in the group for its domain.
/// Tabs without an id or address, and tabs already sitting in a group, are
/// left alone.
pub async fn handle_tab_created<B: Browser>(browser: &B, config: &GroupingConfig, tab: &TabInfo) {
    if !config.enable_auto_grouping {
        return;
    }
    if let Err(err) = tab_created(browser, config, tab).await {
        log::error!("error handling tab created: {err}");
    }
}

async fn tab_created<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    tab: &TabInfo,
) -> Result<(), BrowserError> {
    let Some(tab_id) = tab.id else {
        return Ok(());
    };
    if tab.url.is_none() || tab.is_grouped() {
        return Ok(());
    }

    let Some(domain) = extract_domain(tab.url.as_deref(), config) else {
        return Ok(());
    };

    let Some(group) = get_or_create_group(browser, config, &domain, tab.window_id, Some(tab_id)).await
    else {
        log::debug!("no group for domain {domain} in window {}", tab.window_id);
        return Ok(());
    };

    // Already where it belongs; repeated deliveries are a no-op.
    if tab.group_id == group.id {
        return Ok(());
    }

    if !add_tab_to_group(browser, config, tab_id, group.id).await {
        log::warn!("failed to add tab {tab_id} to group {}", group.id);
    }
    Ok(())
}

/// React to a tab navigation. Only runs when the change carries a new
/// address. A tab that navigated to a non-groupable address leaves its
/// group; otherwise it is re-homed to the group for its new domain.
pub async fn handle_tab_updated<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    tab_id: i32,
    change: &TabChangeInfo,
    tab: &TabInfo,
) {
    if !config.enable_auto_grouping {
        return;
    }
    if let Err(err) = tab_updated(browser, config, tab_id, change, tab).await {
        log::error!("error handling tab updated: {err}");
    }
}

async fn tab_updated<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    tab_id: i32,
    change: &TabChangeInfo,
    tab: &TabInfo,
) -> Result<(), BrowserError> {
    let Some(new_url) = change.url.as_deref() else {
        return Ok(());
    };

    let Some(domain) = extract_domain(Some(new_url), config) else {
        // Navigated to an internal page; it no longer belongs to any domain.
        if tab.is_grouped() {
            browser.ungroup(&[tab_id]).await?;
        }
        return Ok(());
    };

    let Some(group) = get_or_create_group(browser, config, &domain, tab.window_id, None).await
    else {
        log::warn!("failed to get or create group for domain {domain}");
        return Ok(());
    };

    if tab.group_id == group.id {
        return Ok(());
    }

    // Attaching also moves the tab out of any prior group.
    if !add_tab_to_group(browser, config, tab_id, group.id).await {
        log::warn!("failed to add tab {tab_id} to group {}", group.id);
    }
    Ok(())
}

/// React to a tab move, including intra-window moves so a tab dragged out of
/// its group is put back. Event parameters may be stale relative to the live
/// tab, so the tab is refetched first.
pub async fn handle_tab_moved<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    tab_id: i32,
    move_info: &TabMoveInfo,
) {
    if !config.enable_auto_grouping {
        return;
    }
    if let Err(err) = tab_moved(browser, config, tab_id, move_info).await {
        log::error!("error handling tab moved: {err}");
    }
}

async fn tab_moved<B: Browser>(
    browser: &B,
    config: &GroupingConfig,
    tab_id: i32,
    move_info: &TabMoveInfo,
) -> Result<(), BrowserError> {
    let tab = match browser.get_tab(tab_id).await {
        Ok(tab) => tab,
        Err(BrowserError::NotFound(msg)) => {
            log::warn!("moved tab already gone: {msg}");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let Some(tab_id) = tab.id else {
        return Ok(());
    };
    let Some(domain) = extract_domain(tab.url.as_deref(), config) else {
        return Ok(());
    };

    // The move event names the destination window.
    let window_id = move_info.window_id;
    let Some(group) = get_or_create_group(browser, config, &domain, window_id, None).await else {
        log::warn!("failed to get or create group for domain {domain} in window {window_id}");
        return Ok(());
    };

    if tab.group_id == group.id {
        return Ok(());
    }

    if !add_tab_to_group(browser, config, tab_id, group.id).await {
        log::warn!("failed to add tab {tab_id} to group {}", group.id);
    }
    Ok(())
}
