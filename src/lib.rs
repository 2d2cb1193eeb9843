/// Tab Grouper - Chrome extension that groups tabs by domain
/// Built with Rust + WASM

mod browser;
mod chrome;
mod config;
mod domain;
mod groups;
mod handlers;
mod tab_data;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::ChromeBrowser;
use crate::config::GroupingConfig;
use crate::tab_data::{TabChangeInfo, TabInfo, TabMoveInfo};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export domain extraction for JavaScript access
#[wasm_bindgen]
pub fn extract_domain(url: &str) -> Option<String> {
    domain::extract_domain(Some(url), &GroupingConfig::default())
}

/// Register the tab lifecycle listeners. Called once by the background
/// service worker after the wasm module is instantiated. The closures are
/// leaked on purpose: the listeners live for the whole session.
#[wasm_bindgen]
pub fn start_background() {
    let config = GroupingConfig::default();
    log::info!("tab grouper background listeners starting");

    let on_created = {
        let config = config.clone();
        Closure::wrap(Box::new(move |tab: JsValue| {
            let tab: TabInfo = match serde_wasm_bindgen::from_value(tab) {
                Ok(tab) => tab,
                Err(err) => {
                    log::error!("bad tab-created payload: {err}");
                    return;
                }
            };
            let config = config.clone();
            spawn_local(async move {
                handlers::handle_tab_created(&ChromeBrowser, &config, &tab).await;
            });
        }) as Box<dyn Fn(JsValue)>)
    };

    let on_updated = {
        let config = config.clone();
        Closure::wrap(Box::new(move |tab_id: i32, change: JsValue, tab: JsValue| {
            let change: TabChangeInfo = match serde_wasm_bindgen::from_value(change) {
                Ok(change) => change,
                Err(err) => {
                    log::error!("bad tab-updated payload: {err}");
                    return;
                }
            };
            let tab: TabInfo = match serde_wasm_bindgen::from_value(tab) {
                Ok(tab) => tab,
                Err(err) => {
                    log::error!("bad tab-updated payload: {err}");
                    return;
                }
            };
            let config = config.clone();
            spawn_local(async move {
                handlers::handle_tab_updated(&ChromeBrowser, &config, tab_id, &change, &tab).await;
            });
        }) as Box<dyn Fn(i32, JsValue, JsValue)>)
    };

    let on_moved = {
        let config = config.clone();
        Closure::wrap(Box::new(move |tab_id: i32, move_info: JsValue| {
            let move_info: TabMoveInfo = match serde_wasm_bindgen::from_value(move_info) {
                Ok(info) => info,
                Err(err) => {
                    log::error!("bad tab-moved payload: {err}");
                    return;
                }
            };
            let config = config.clone();
            spawn_local(async move {
                handlers::handle_tab_moved(&ChromeBrowser, &config, tab_id, &move_info).await;
            });
        }) as Box<dyn Fn(i32, JsValue)>)
    };

    chrome::register_tab_listeners(
        on_created.as_ref().unchecked_ref(),
        on_updated.as_ref().unchecked_ref(),
        on_moved.as_ref().unchecked_ref(),
    );

    on_created.forget();
    on_updated.forget();
    on_moved.forget();
}
