use js_sys::Function;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod counter;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;
pub mod play;
pub mod sim;

pub use config::{EnvConfig, Variant};
pub use deck::{Card, Deck, ShoeSize};
pub use error::{ConfigError, GameError, PlayError, SimulationError};
pub use game::{Action, BlackjackGame, GameRules, Observation, Outcome, RoundState, Step, StepInfo};
pub use hand::{hand_value, is_bust, is_natural, Hand, HandValue};

fn from_js<T: DeserializeOwned>(params: &JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(params.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

#[wasm_bindgen]
pub fn run_simulation(params: &JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let input: sim::SimulationInput = from_js(params)?;
    let result = sim::run(input)
        .map_err(|err| JsValue::from_str(&format!("Simulation failed: {err}")))?;
    to_js(&result)
}

#[wasm_bindgen]
pub fn run_simulation_with_progress(
    params: &JsValue,
    progress_callback: &Function,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let input: sim::SimulationInput = from_js(params)?;

    let progress_cb = |current: u32, total: u32| {
        let _ = progress_callback.call2(
            &JsValue::NULL,
            &JsValue::from(current),
            &JsValue::from(total),
        );
    };

    let result = sim::run_with_progress(input, progress_cb)
        .map_err(|err| JsValue::from_str(&format!("Simulation failed: {err}")))?;
    to_js(&result)
}

/// Step-by-step environment handle for JavaScript drivers.
#[wasm_bindgen(js_name = BlackjackEnvironment)]
pub struct WasmEnvironment {
    game: BlackjackGame,
}

#[wasm_bindgen(js_class = BlackjackEnvironment)]
impl WasmEnvironment {
    #[wasm_bindgen(constructor)]
    pub fn new(params: &JsValue) -> Result<WasmEnvironment, JsValue> {
        console_error_panic_hook::set_once();
        let config: EnvConfig = if params.is_undefined() || params.is_null() {
            EnvConfig::default()
        } else {
            from_js(params)?
        };
        let game = BlackjackGame::from_config(&config)
            .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))?;
        Ok(WasmEnvironment { game })
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.game.reset())
    }

    pub fn step(&mut self, action: i32) -> Result<JsValue, JsValue> {
        let step = self
            .game
            .step_code(action as i64)
            .map_err(|err| JsValue::from_str(&format!("Step failed: {err}")))?;
        to_js(&step)
    }

    pub fn display(&self, reveal: bool) -> String {
        self.game.display(reveal)
    }
}
