//! `wasm-bindgen` bindings exposing the RPC façade's `convert`/`list_units`
//! contract at the JS boundary (§6a). Nothing else from §6 — not
//! `define_unit`/`define_conversion`/`reset_session`, not the package
//! loader, not the model-validation adapter — is implemented here; those
//! remain genuinely out of scope for this crate.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

fn set(obj: &Object, key: &str, value: JsValue) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), &value).map(|_| ())
}

fn error_object(err: &ucon_core::Error) -> JsValue {
    let obj = Object::new();
    let _ = set(&obj, "error", JsValue::from_str(&err.to_string()));
    let _ = set(&obj, "error_type", JsValue::from_str(err.error_type()));
    obj.into()
}

/// Converts `value from_unit` to `to_unit` against the standard graph,
/// returning `{quantity, unit, uncertainty?}` or a structured
/// `{error, error_type}` object.
#[wasm_bindgen]
pub fn convert(value: f64, from_unit: &str, to_unit: &str) -> Result<JsValue, JsValue> {
    let graph = ucon_core::standard::conversion_graph();
    let result = (|| -> ucon_core::Result<ucon_core::Number> {
        let from = ucon_core::parse_unit_expression(from_unit, &graph)?;
        let to = ucon_core::parse_unit_expression(to_unit, &graph)?;
        let quantity = ucon_core::Number::new(value, from, None);
        quantity.to(&to, &graph)
    })();

    match result {
        Ok(number) => {
            let obj = Object::new();
            set(&obj, "quantity", JsValue::from_f64(number.quantity()))?;
            set(&obj, "unit", JsValue::from_str(&number.unit().to_string()))?;
            let uncertainty = number
                .uncertainty()
                .map(JsValue::from_f64)
                .unwrap_or(JsValue::NULL);
            set(&obj, "uncertainty", uncertainty)?;
            Ok(obj.into())
        }
        Err(err) => Err(error_object(&err)),
    }
}

/// Lists known unit names, optionally filtered to one dimension's human
/// name, as a JS array of strings.
#[wasm_bindgen]
pub fn list_units(dimension: Option<String>) -> JsValue {
    let graph = ucon_core::standard::conversion_graph();
    let units = graph.registered_units(dimension.as_deref());
    let array = Array::new();
    for unit in units {
        array.push(&JsValue::from_str(unit.name()));
    }
    array.into()
}
