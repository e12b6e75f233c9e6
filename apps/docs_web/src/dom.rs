use client_core::{OptionListTarget, TargetError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlOptionElement, HtmlSelectElement};

use crate::options::{rewrite_options, SelectNodes};

/// A `<select>` looked up on every access, since the documentation UI renders
/// its parameter table lazily and may re-render it.
pub(crate) struct DomOptionList {
    document: Document,
    selector: String,
}

impl DomOptionList {
    pub(crate) fn new(document: Document, selector: impl Into<String>) -> Self {
        Self {
            document,
            selector: selector.into(),
        }
    }

    fn select(&self) -> Result<HtmlSelectElement, TargetError> {
        self.document
            .query_selector(&self.selector)
            .map_err(js_error)?
            .ok_or_else(|| TargetError::new(format!("no element matches {}", self.selector)))?
            .dyn_into::<HtmlSelectElement>()
            .map_err(|_| TargetError::new(format!("{} is not a select element", self.selector)))
    }
}

impl OptionListTarget for DomOptionList {
    fn replace_options(&self, options: &[String]) -> Result<(), TargetError> {
        let select = self.select()?;
        rewrite_options(&mut SelectElementNodes(&select), options).map_err(js_error)
    }

    fn current_options(&self) -> Result<Vec<String>, TargetError> {
        let children = self.select()?.children();
        Ok((0..children.length())
            .filter_map(|index| children.item(index))
            .filter_map(|element| element.dyn_into::<HtmlOptionElement>().ok())
            .map(|option| option.value())
            .collect())
    }
}

struct SelectElementNodes<'a>(&'a HtmlSelectElement);

impl SelectNodes for SelectElementNodes<'_> {
    type Error = JsValue;

    fn remove_first_child(&mut self) -> Result<bool, JsValue> {
        let Some(child) = self.0.first_child() else {
            return Ok(false);
        };
        self.0.remove_child(&child)?;
        Ok(true)
    }

    fn append_option(&mut self, value: &str, label: &str) -> Result<(), JsValue> {
        let element = HtmlOptionElement::new_with_text_and_value(label, value)?;
        self.0.append_child(&element)?;
        Ok(())
    }
}

fn js_error(err: JsValue) -> TargetError {
    TargetError::new(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
