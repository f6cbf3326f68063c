use js_sys::{Array, Function, JSON};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_reveal_core::{
    AttachCfg, Config, Engine, Inputs, Outputs, RevealEvent, TickControl, TickHook, VariantRef,
};

#[wasm_bindgen]
pub struct VizijReveal {
    core: Engine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Plain JS objects instead of `Map`s for style snapshots.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("serialize error: {e}")))
}

/// Forwards events to a JS callback. The callback may return a handle or an array of
/// handles to detach before the tick continues.
struct JsHook {
    f: Function,
}

impl TickHook for JsHook {
    fn on_event(&mut self, event: &RevealEvent, ctl: &mut TickControl) {
        let Ok(arg) = to_js(event) else {
            return;
        };
        let Ok(ret) = self.f.call1(&JsValue::UNDEFINED, &arg) else {
            return;
        };
        if let Some(handle) = ret.as_string() {
            ctl.detach(&handle);
        } else if Array::is_array(&ret) {
            for v in Array::from(&ret).iter() {
                if let Some(handle) = v.as_string() {
                    ctl.detach(&handle);
                }
            }
        }
    }
}

#[wasm_bindgen]
impl VizijReveal {
    /// Create a new engine. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new VizijReveal({ default_policy: { mode: "repeat", amount: 0.5 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijReveal, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(VizijReveal {
            core: Engine::new(cfg),
        })
    }

    /// Define variants from a single definition, an array, or an object keyed by name.
    /// Returns the variant ids. Valid definitions are kept even when another one fails.
    #[wasm_bindgen(js_name = define_variants)]
    pub fn define_variants(&mut self, defs: JsValue) -> Result<Vec<u32>, JsError> {
        if jsvalue_is_undefined_or_null(&defs) {
            return Err(JsError::new("define_variants: defs is null/undefined"));
        }
        // Strings pass through; objects go through JSON so the core parser sees one format.
        let json = match defs.as_string() {
            Some(s) => s,
            None => JSON::stringify(&defs)
                .map_err(|e| JsError::new(&format!("define_variants stringify error: {:?}", e)))?
                .as_string()
                .ok_or_else(|| JsError::new("define_variants: stringify produced non-string"))?,
        };
        let ids = self
            .core
            .load_variants_json(&json)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(ids.into_iter().map(|id| id.0).collect())
    }

    /// Attach an element. `cfg` matches AttachCfg:
    ///   { variant: "slideUp" | {hidden, visible, transition}, policy?, bounds?, region? }
    /// Returns the TargetId (u32).
    #[wasm_bindgen]
    pub fn attach(&mut self, handle: String, cfg: JsValue) -> Result<u32, JsError> {
        let cfg: AttachCfg =
            swb::from_value(cfg).map_err(|e| JsError::new(&format!("attach cfg error: {e}")))?;
        let id = self
            .core
            .attach(&handle, cfg)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    /// Attach an element orchestrated by `parent` (staggered with its siblings).
    #[wasm_bindgen(js_name = attach_child)]
    pub fn attach_child(&mut self, parent: String, handle: String, variant: JsValue) -> Result<u32, JsError> {
        let variant: VariantRef =
            swb::from_value(variant).map_err(|e| JsError::new(&format!("variant error: {e}")))?;
        let id = self
            .core
            .attach_child(&parent, &handle, variant)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    /// Release an element and its children. Safe to call repeatedly.
    #[wasm_bindgen]
    pub fn detach(&mut self, handle: String) {
        self.core.detach(&handle);
    }

    /// Step by dt (seconds) with inputs { viewport?, geometry?, commands?, geometry_unavailable? }.
    /// Returns { frames, events }.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32, inputs: JsValue) -> Result<JsValue, JsError> {
        let inputs = parse_inputs(inputs)?;
        let out: &Outputs = self.core.update(dt, inputs);
        to_js(out)
    }

    /// Like `update`, but calls `on_event(event)` as each event fires. Returning a handle
    /// (or an array of handles) from the callback detaches them immediately.
    #[wasm_bindgen(js_name = update_with_callback)]
    pub fn update_with_callback(&mut self, dt: f32, inputs: JsValue, on_event: Function) -> Result<JsValue, JsError> {
        let inputs = parse_inputs(inputs)?;
        let mut hook = JsHook { f: on_event };
        let out: &Outputs = self.core.update_with_hook(dt, inputs, &mut hook);
        to_js(out)
    }

    /// "Hidden" | "Entering" | "Visible" | "Exiting", or undefined for unknown handles.
    #[wasm_bindgen]
    pub fn state(&self, handle: String) -> Option<String> {
        self.core.state(&handle).map(|s| format!("{s:?}"))
    }

    /// Current style for an element, or undefined.
    #[wasm_bindgen]
    pub fn style(&self, handle: String) -> Result<JsValue, JsError> {
        match self.core.style(&handle) {
            Some(style) => to_js(&style),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = is_degraded)]
    pub fn is_degraded(&self) -> bool {
        self.core.is_degraded()
    }

    #[wasm_bindgen(js_name = target_count)]
    pub fn target_count(&self) -> u32 {
        self.core.target_count() as u32
    }
}

fn parse_inputs(inputs: JsValue) -> Result<Inputs, JsError> {
    if jsvalue_is_undefined_or_null(&inputs) {
        Ok(Inputs::default())
    } else {
        swb::from_value(inputs).map_err(|e| JsError::new(&format!("inputs error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
