/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

#![allow(non_snake_case)]

use log::Level;
use serde::Serialize;
use wasm_bindgen::{prelude::wasm_bindgen, JsError};

use coupling_graph::{
    align_with, classify, metric_options, normalize, resiliency_charts, serial::RawGraph,
    AlignOptions, ChangePointPayload, MetricKey, ResiliencyScore,
};

pub type WasmError = JsError;

#[wasm_bindgen(start)]
pub fn init() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(Level::Debug).unwrap();
}

#[wasm_bindgen(typescript_custom_section)]
const TS_APPEND_CONTENT: &'static str = r#"
export type MetricKey = "lat" | "coexec" | "freq" | "imp" | "dep";
export type MetricScope = "node" | "edge";
export interface MetricOption {
    key: MetricKey;
    label: string;
    scope: MetricScope;
}
export type ChartRow = { time: string } & { [entity: string]: number };
export interface AlignedTable {
    entities: string[];
    rows: ChartRow[];
}
export interface CanonicalGraph {
    nodes: { id: string; importance: number; dependence: number }[];
    links: {
        source: string;
        target: string;
        weight: number;
        latencyMs: number;
        frequency: number;
        coExecution: number;
    }[];
}
"#;

fn to_json<T: Serialize>(value: &T) -> Result<String, WasmError> {
    Ok(serde_json::to_string(value)?)
}

/// Selectable metrics as a json-encoded `MetricOption[]`.
#[wasm_bindgen(js_name = "metricOptions")]
pub fn metric_options_json() -> Result<String, WasmError> {
    to_json(&metric_options())
}

/// Returns "node" or "edge".
#[wasm_bindgen(js_name = "classifyMetric")]
pub fn classify_metric(key: &str) -> Result<String, WasmError> {
    Ok(classify(key)?.to_string())
}

/// Align a json-encoded change-point payload into a json-encoded
/// `AlignedTable`. Numeric times are taken as milliseconds unless
/// `epochUnit` says otherwise ("seconds", "millis" or "micros").
#[wasm_bindgen(js_name = "alignChangePoints")]
pub fn align_change_points(
    itemsJson: &str,
    metric: &str,
    epochUnit: Option<String>,
) -> Result<String, WasmError> {
    let metric = metric.parse::<MetricKey>()?;
    let items = serde_json::from_str::<ChangePointPayload>(itemsJson)?.into_items();
    let options = match epochUnit {
        Some(unit) => AlignOptions {
            epoch_unit: serde_json::from_value(serde_json::Value::String(unit))?,
        },
        None => AlignOptions::default(),
    };
    to_json(&align_with(&items, metric, &options)?)
}

/// Normalize a json-encoded graph payload into a json-encoded
/// `CanonicalGraph`.
#[wasm_bindgen(js_name = "normalizeGraph")]
pub fn normalize_graph(rawJson: &str) -> Result<String, WasmError> {
    let raw = RawGraph::from_payload(serde_json::from_str(rawJson)?)?;
    let graph = normalize(&raw);
    if graph.is_empty() {
        log::debug!("no graph data for the selected time range");
    }
    to_json(&graph)
}

/// Chart series for a json-encoded list of resiliency scores, or
/// `null` when there are none.
#[wasm_bindgen(js_name = "resiliencyCharts")]
pub fn resiliency_charts_json(scoresJson: &str) -> Result<String, WasmError> {
    let scores = serde_json::from_str::<Vec<ResiliencyScore>>(scoresJson)?;
    to_json(&resiliency_charts(&scores))
}
