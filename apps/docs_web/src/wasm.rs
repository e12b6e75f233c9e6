use std::{cell::RefCell, rc::Rc};

use client_core::{ApiKeyChangeHandler, HttpOptionsSource};
use tracing::{error, info};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlInputElement};

use crate::{
    dom::DomOptionList,
    selectors::{api_key_input_selector, dataset_select_selector},
};

type EventClosure = Closure<dyn FnMut(Event)>;

thread_local! {
    static READY_HANDLER: RefCell<Option<EventClosure>> = const { RefCell::new(None) };
    static API_KEY_CHANGE_HANDLER: RefCell<Option<EventClosure>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(err) = install() {
        error!(error = ?err, "dataset options: install failed");
    }
}

/// Binds the change listener once the document has loaded.
fn install() -> Result<(), JsValue> {
    let document = document()?;
    if document.ready_state() != "loading" {
        return bind(&document);
    }

    let ready = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let result = document().and_then(|document| bind(&document));
        if let Err(err) = result {
            error!(error = ?err, "dataset options: bind failed");
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", ready.as_ref().unchecked_ref())?;
    READY_HANDLER.with(|slot| *slot.borrow_mut() = Some(ready));
    Ok(())
}

/// Listens on the document rather than the field: the documentation UI only
/// renders the key input once an operation is expanded, and may replace it.
fn bind(document: &Document) -> Result<(), JsValue> {
    let origin = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .location()
        .origin()?;
    let source =
        HttpOptionsSource::new(&origin).map_err(|err| JsValue::from_str(&err.to_string()))?;

    let handler = Rc::new(ApiKeyChangeHandler::new(
        source,
        DomOptionList::new(document.clone(), dataset_select_selector()),
    ));

    let input_selector = api_key_input_selector();
    let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(input) = api_key_input(&event, &input_selector) else {
            return;
        };
        let api_key = input.value();
        let handler = Rc::clone(&handler);
        spawn_local(async move {
            handler.handle_change(&api_key).await;
        });
    });
    document.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    API_KEY_CHANGE_HANDLER.with(|slot| *slot.borrow_mut() = Some(on_change));

    info!(endpoint = %origin, "dataset options: listening for api key changes");
    Ok(())
}

fn api_key_input(event: &Event, selector: &str) -> Option<HtmlInputElement> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    if !element.matches(selector).unwrap_or(false) {
        return None;
    }
    element.dyn_into::<HtmlInputElement>().ok()
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}
