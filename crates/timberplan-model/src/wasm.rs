//! Browser entry points for web-based teaching demos.
//!
//! Scenarios come in as plain JS objects and reports go back the same way;
//! the shapes match the `serde` forms of [`Scenario`] and
//! [`crate::report::PlanReport`].

use wasm_bindgen::prelude::*;

use timberplan_solver::Simplex;

use crate::build::build_lp;
use crate::report::PlanReport;
use crate::scenario::Scenario;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Build and solve a scenario, returning the plan report.
#[wasm_bindgen]
pub fn solve(scenario: JsValue) -> Result<JsValue, JsValue> {
    let scenario: Scenario = serde_wasm_bindgen::from_value(scenario).map_err(js_err)?;
    let plan = build_lp(&scenario).map_err(js_err)?;
    let solution = Simplex::new().solve(&plan.problem).map_err(js_err)?;
    let report = PlanReport::from_solution(&scenario, &plan, &solution);
    serde_wasm_bindgen::to_value(&report).map_err(js_err)
}

/// Validate a scenario and return its diagnostics.
#[wasm_bindgen]
pub fn validate(scenario: JsValue) -> Result<JsValue, JsValue> {
    let scenario: Scenario = serde_wasm_bindgen::from_value(scenario).map_err(js_err)?;
    let diagnostics: Vec<Diagnostic> = scenario
        .check()
        .iter()
        .map(|problem| Diagnostic {
            severity: "error".to_string(),
            message: problem.to_string(),
        })
        .collect();
    serde_wasm_bindgen::to_value(&diagnostics).map_err(js_err)
}

#[derive(serde::Serialize)]
struct Diagnostic {
    severity: String,
    message: String,
}
