#![cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::json;
use serde_wasm_bindgen as swb;
use vizij_reveal_wasm::{abi_version, VizijReveal};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js(v: serde_json::Value) -> JsValue {
    v.serialize(&swb::Serializer::json_compatible()).unwrap()
}

fn slide_up() -> JsValue {
    js(json!({
        "slideUp": {
            "hidden": { "y": 50, "opacity": 0 },
            "visible": { "y": 0, "opacity": 1, "transition": { "duration": 0.5, "ease": "linear" } }
        }
    }))
}

fn viewport(y: f64) -> JsValue {
    js(json!({ "viewport": { "x": 0, "y": y, "width": 800, "height": 600 } }))
}

fn events(out: &JsValue) -> Array {
    Array::from(&Reflect::get(out, &JsValue::from_str("events")).unwrap())
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(VizijReveal::new(JsValue::UNDEFINED).is_ok());
    assert!(VizijReveal::new(js(json!({ "emit_settled_frames": false }))).is_ok());
}

#[wasm_bindgen_test]
fn attach_update_and_reveal() {
    let mut eng = VizijReveal::new(JsValue::NULL).unwrap();
    let ids = eng.define_variants(slide_up()).unwrap();
    assert_eq!(ids.len(), 1);

    eng.attach(
        "hero".into(),
        js(json!({ "variant": "slideUp", "bounds": { "x": 0, "y": 100, "width": 100, "height": 100 } })),
    )
    .unwrap();
    assert_eq!(eng.state("hero".into()).as_deref(), Some("Hidden"));

    let out = eng.update(0.016, viewport(0.0)).unwrap();
    assert_eq!(events(&out).length(), 1);
    assert_eq!(eng.state("hero".into()).as_deref(), Some("Entering"));

    eng.update(1.0, JsValue::UNDEFINED).unwrap();
    assert_eq!(eng.state("hero".into()).as_deref(), Some("Visible"));
    let style = eng.style("hero".into()).unwrap();
    let opacity = Reflect::get(&style, &JsValue::from_str("opacity")).unwrap();
    assert_eq!(opacity.as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn errors_surface_as_js_errors() {
    let mut eng = VizijReveal::new(JsValue::NULL).unwrap();
    eng.define_variants(slide_up()).unwrap();
    // No bounds on an observed target.
    assert!(eng.attach("ghost".into(), js(json!({ "variant": "slideUp" }))).is_err());
    assert!(eng
        .define_variants(js(json!({ "name": "half", "hidden": { "opacity": 0 } })))
        .is_err());
    assert!(eng.define_variants(JsValue::NULL).is_err());
}

#[wasm_bindgen_test]
fn callback_can_detach_during_a_tick() {
    let mut eng = VizijReveal::new(JsValue::NULL).unwrap();
    eng.define_variants(slide_up()).unwrap();
    for h in ["a", "b"] {
        eng.attach(
            h.into(),
            js(json!({ "variant": "slideUp", "bounds": { "x": 0, "y": 0, "width": 10, "height": 10 } })),
        )
        .unwrap();
    }
    let on_event = Function::new_with_args("ev", "return ev.Enter && ev.Enter.handle === 'a' ? ['b'] : null;");
    let out = eng.update_with_callback(0.016, viewport(0.0), on_event).unwrap();
    assert_eq!(events(&out).length(), 1);
    assert_eq!(eng.target_count(), 1);
    assert!(eng.state("b".into()).is_none());
}

#[wasm_bindgen_test]
fn detach_is_idempotent() {
    let mut eng = VizijReveal::new(JsValue::NULL).unwrap();
    eng.define_variants(slide_up()).unwrap();
    eng.attach("menu".into(), js(json!({ "variant": "slideUp", "policy": { "mode": "manual" } })))
        .unwrap();
    eng.detach("menu".into());
    eng.detach("menu".into());
    assert_eq!(eng.target_count(), 0);
}
