//! Background-removal providers backed by JavaScript functions.
//!
//! Each provider is a plain object `{ name: string, remove: (bytes) => Uint8Array }`.
//! The chain tries them in array order (hosted first, local fallback second).
//!
//! Model inference in the browser is usually asynchronous. A provider that
//! returns a Promise is reported as failed; hosts running the model
//! asynchronously should call `JsEditSession.apply_cutout` with the result
//! instead.

use js_sys::{Array, Function, Reflect, Uint8Array};
use tailor_core::background::{BackgroundRemover, ProviderChain, ProviderError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A synchronous JavaScript segmentation callback.
pub(crate) struct JsProvider {
    name: String,
    remove: Function,
}

impl JsProvider {
    /// Read `{ name, remove }` from a JavaScript object.
    pub(crate) fn from_object(value: &JsValue, index: u32) -> Result<Self, JsValue> {
        let remove = Reflect::get(value, &JsValue::from_str("remove"))?
            .dyn_into::<Function>()
            .map_err(|_| JsValue::from_str(&format!("Provider {} has no remove function", index)))?;
        let name = Reflect::get(value, &JsValue::from_str("name"))?
            .as_string()
            .unwrap_or_else(|| format!("provider-{}", index));
        Ok(Self { name, remove })
    }
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

impl BackgroundRemover for JsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn remove(&self, image: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let input = Uint8Array::from(image);
        let output = self
            .remove
            .call1(&JsValue::NULL, &input)
            .map_err(|e| ProviderError::Unavailable(describe(&e)))?;

        output
            .dyn_into::<Uint8Array>()
            .map(|bytes| bytes.to_vec())
            .map_err(|_| {
                ProviderError::Failed(
                    "provider did not return a Uint8Array (use apply_cutout for async models)"
                        .to_string(),
                )
            })
    }
}

/// Build an ordered chain from an array of provider objects.
pub(crate) fn chain_from_array(providers: &Array) -> Result<ProviderChain, JsValue> {
    let mut chain = ProviderChain::new();
    for (index, value) in providers.iter().enumerate() {
        chain.push(JsProvider::from_object(&value, index as u32)?);
    }
    Ok(chain)
}
