/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

#![allow(dead_code)]

use std::path::Path;

use coupling_graph::{serial::RawGraph, ChangePointPayload, SeriesItem};

#[macro_export]
macro_rules! define_tests {
    ($test:ident, [ $( $(#[$attr:meta])* ( $case:ident, $path:literal, $metric:literal ) ),+ ]) => {
		$(
			#[test]
			$(#[$attr])*
			fn $case() {
				let items = cases::load_items($path);
				let metric = std::str::FromStr::from_str($metric).unwrap();
				$test(&items, metric);
			}
		)*
    };
}

pub fn load_items(path: &str) -> Vec<SeriesItem> {
    let path = Path::new("../tests").join(path).join("items.json");
    serde_json::from_str::<ChangePointPayload>(&std::fs::read_to_string(path).unwrap())
        .unwrap()
        .into_items()
}

pub fn load_graph(path: &str) -> RawGraph {
    let path = Path::new("../tests/graphs").join(path);
    RawGraph::from_payload(serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap())
        .unwrap()
}
