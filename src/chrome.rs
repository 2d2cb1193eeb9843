/// Live host implementation of `Browser` over chrome.tabs / chrome.tabGroups
///
/// All calls go through a thin JS bridge module; payloads cross the boundary
/// as `JsValue` and are converted with serde-wasm-bindgen.
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::browser::{Browser, BrowserError};
use crate::tab_data::{GroupColor, GroupInfo, TabInfo};

#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getGroup(group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn addTabsToGroup(tab_ids: JsValue, group_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, props: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(props: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = registerTabListeners)]
    pub fn register_tab_listeners(
        on_created: &js_sys::Function,
        on_updated: &js_sys::Function,
        on_moved: &js_sys::Function,
    );
}

fn host_error(err: JsValue) -> BrowserError {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    BrowserError::from_message(message)
}

fn decode<T: serde::de::DeserializeOwned>(value: JsValue, context: &str) -> Result<T, BrowserError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| BrowserError::Api(format!("decoding {context}: {err}")))
}

fn encode<T: Serialize>(value: &T, context: &str) -> Result<JsValue, BrowserError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| BrowserError::Api(format!("encoding {context}: {err}")))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    window_id: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupUpdate<'a> {
    title: &'a str,
    color: GroupColor,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTab<'a> {
    window_id: i32,
    url: &'a str,
    active: bool,
}

/// The real browser. Stateless; all state lives in the host.
pub struct ChromeBrowser;

impl Browser for ChromeBrowser {
    async fn query_tabs(&self, window_id: Option<i32>) -> Result<Vec<TabInfo>, BrowserError> {
        let query = encode(&WindowQuery { window_id }, "tab query")?;
        let tabs = queryTabs(query).await.map_err(host_error)?;
        decode(tabs, "tab list")
    }

    async fn get_tab(&self, tab_id: i32) -> Result<TabInfo, BrowserError> {
        let tab = getTab(tab_id).await.map_err(host_error)?;
        decode(tab, "tab")
    }

    async fn query_groups(&self, window_id: i32) -> Result<Vec<GroupInfo>, BrowserError> {
        let query = encode(
            &WindowQuery {
                window_id: Some(window_id),
            },
            "group query",
        )?;
        let groups = queryGroups(query).await.map_err(host_error)?;
        decode(groups, "group list")
    }

    async fn get_group(&self, group_id: i32) -> Result<GroupInfo, BrowserError> {
        let group = getGroup(group_id).await.map_err(host_error)?;
        decode(group, "group")
    }

    async fn create_group(&self, tab_ids: &[i32]) -> Result<i32, BrowserError> {
        let ids = encode(&tab_ids, "tab ids")?;
        let group_id = groupTabs(ids).await.map_err(host_error)?;
        decode(group_id, "group id")
    }

    async fn add_to_group(&self, tab_ids: &[i32], group_id: i32) -> Result<(), BrowserError> {
        let ids = encode(&tab_ids, "tab ids")?;
        addTabsToGroup(ids, group_id).await.map_err(host_error)
    }

    async fn ungroup(&self, tab_ids: &[i32]) -> Result<(), BrowserError> {
        let ids = encode(&tab_ids, "tab ids")?;
        ungroupTabs(ids).await.map_err(host_error)
    }

    async fn update_group(
        &self,
        group_id: i32,
        title: &str,
        color: GroupColor,
    ) -> Result<GroupInfo, BrowserError> {
        let props = encode(&GroupUpdate { title, color }, "group update")?;
        let group = updateGroup(group_id, props).await.map_err(host_error)?;
        decode(group, "group")
    }

    async fn create_tab(&self, window_id: i32, url: &str) -> Result<TabInfo, BrowserError> {
        let props = encode(
            &NewTab {
                window_id,
                url,
                active: false,
            },
            "new tab",
        )?;
        let tab = createTab(props).await.map_err(host_error)?;
        decode(tab, "tab")
    }
}
