//! Slider metadata for the UI.

use crate::shared::{init, to_js};
use vibeflow_core::config::{ranges, Module};
use wasm_bindgen::prelude::*;

/// Slider ranges (`min`, `max`, `step`, `default`) for one sandbox module,
/// named in snake_case (`"pid_tuning"`, `"two_dof_modes"`, ...).
#[wasm_bindgen]
pub fn parameter_ranges(module: JsValue) -> Result<JsValue, JsValue> {
    init();
    let module: Module = serde_wasm_bindgen::from_value(module)
        .map_err(|e| JsValue::from_str(&format!("Unknown module: {e}")))?;
    to_js(&ranges(module))
}

#[cfg(test)]
mod tests {
    use serde::de::value::Error as ValueError;
    use serde::de::IntoDeserializer;
    use serde::Deserialize;
    use vibeflow_core::config::{ranges, Module};

    fn decode(name: &str) -> Result<Module, ValueError> {
        Module::deserialize(name.into_deserializer())
    }

    #[test]
    fn known_modules_resolve() {
        assert_eq!(decode("mass_spring_damper").expect("msd"), Module::MassSpringDamper);
        assert_eq!(decode("isolation").expect("isolation"), Module::Isolation);
        assert_eq!(ranges(decode("pid_tuning").expect("pid")).len(), 7);
        assert_eq!(ranges(decode("two_dof_modes").expect("modes")).len(), 4);
    }

    #[test]
    fn unknown_module_is_rejected() {
        let err = decode("audio").expect_err("unknown module");
        assert!(err.to_string().contains("audio"));
        assert!(decode("PidTuning").is_err());
    }
}
