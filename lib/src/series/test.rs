/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::BTreeSet;

use itertools::Itertools;
use serde_json::json;

use crate::{
    error::Error,
    ids::EntityKey,
    metrics::MetricKey,
    time::{EpochUnit, Timestamp},
};

use super::{
    aligned::{align, align_with, AlignOptions, TIME_COLUMN},
    serial::{ChangePointPayload, SeriesItem},
};

const T1: i64 = 1_714_557_600_000;
const T2: i64 = 1_714_557_660_000;
const T3: i64 = 1_714_557_720_000;

fn ts(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap()
}

fn scenario() -> Vec<SeriesItem> {
    vec![
        SeriesItem::edge("A", "B")
            .with_sample(T1, MetricKey::Latency, 5.0)
            .with_sample(T2, MetricKey::Latency, 7.0)
            .with_change_point(T2),
        SeriesItem::edge("C", "D").with_sample(T1, MetricKey::Latency, 3.0),
    ]
}

#[test]
fn two_edge_scenario() {
    let table = align(&scenario(), MetricKey::Latency).unwrap();
    let ab = EntityKey::edge("A", "B");
    let cd = EntityKey::edge("C", "D");

    assert_eq!(table.entities, vec![ab.clone(), cd.clone()]);
    assert_eq!(table.rows.len(), 2);

    let row1 = &table.rows[0];
    assert_eq!(row1.time, ts(T1));
    assert_eq!(row1.value(&ab), Some(5.0));
    assert_eq!(row1.value(&cd), Some(3.0));
    assert!(row1.change_points.is_empty());

    let row2 = &table.rows[1];
    assert_eq!(row2.time, ts(T2));
    assert_eq!(row2.value(&ab), Some(7.0));
    assert_eq!(row2.change_point_value(&ab), Some(7.0));
    assert_eq!(row2.value(&cd), None);
}

#[test]
fn empty_input() {
    let table = align(&[], MetricKey::Importance).unwrap();
    assert!(table.is_empty());
    assert!(table.entities.is_empty());
}

#[test]
fn order_independent() {
    let items = vec![
        SeriesItem::edge("A", "B")
            .with_sample(T3, MetricKey::Frequency, 1.0)
            .with_sample(T1, MetricKey::Frequency, 2.0),
        SeriesItem::edge("B", "C").with_sample(T2, MetricKey::Frequency, 3.0),
        SeriesItem::edge("C", "A")
            .with_sample("2024-05-01T10:01:00.000Z", MetricKey::Frequency, 4.0)
            .with_sample(T3 + 1, MetricKey::Frequency, 5.0),
    ];

    let expected = align(&items, MetricKey::Frequency).unwrap();
    assert_eq!(
        expected.rows.iter().map(|row| row.time).collect::<Vec<_>>(),
        vec![ts(T1), ts(T2), ts(T3), ts(T3 + 1)]
    );

    for perm in items.iter().cloned().permutations(items.len()) {
        let table = align(&perm, MetricKey::Frequency).unwrap();
        assert!(table
            .rows
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.time < b.time));
        assert_eq!(table.rows, expected.rows);
    }
}

#[test]
fn no_interpolation() {
    let items = vec![
        SeriesItem::node("svc1")
            .with_sample(T1, MetricKey::Importance, 0.5)
            .with_sample(T3, MetricKey::Importance, 0.7),
        SeriesItem::node("svc2").with_sample(T3, MetricKey::Importance, 0.1),
    ];
    let table = align(&items, MetricKey::Importance).unwrap();
    let times = table.rows.iter().map(|row| row.time).collect::<BTreeSet<_>>();
    assert_eq!(times, BTreeSet::from_iter([ts(T1), ts(T3)]));
    assert!(table.row(&ts(T2)).is_none());
    assert_eq!(
        table.row(&ts(T1)).unwrap().value(&EntityKey::node("svc2")),
        None
    );
}

#[test]
fn change_points_exact() {
    let items = vec![SeriesItem::node("svc1")
        .with_sample(T1, MetricKey::Dependence, 1.0)
        .with_sample(T2, MetricKey::Dependence, 2.0)
        .with_sample(T3, MetricKey::Dependence, 3.0)
        .with_change_point(T2 + 1)
        .with_change_point(T3)];
    let table = align(&items, MetricKey::Dependence).unwrap();
    let markers = table.change_points();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].time, ts(T3));
    assert_eq!(markers[0].entity, EntityKey::node("svc1"));
    assert_eq!(markers[0].value, 3.0);
}

#[test]
fn float_times_match_integer_change_points() {
    let items = serde_json::from_value::<Vec<SeriesItem>>(json!([{
        "source": "A",
        "target": "B",
        "series": [
            { "time": 1_714_557_600_000.0, "lat": 5.0 },
            { "time": 1_714_557_660_000.0, "lat": 6.0 }
        ],
        "change_points": [T1]
    }, {
        "source": "C",
        "target": "D",
        "series": [{ "time": T2, "lat": 1.0 }],
        "change_points": [1_714_557_660_000.0]
    }]))
    .unwrap();

    let table = align(&items, MetricKey::Latency).unwrap();
    let ab = EntityKey::edge("A", "B");
    let cd = EntityKey::edge("C", "D");
    assert_eq!(table.rows[0].change_point_value(&ab), Some(5.0));
    assert_eq!(table.rows[1].change_point_value(&ab), None);
    assert_eq!(table.rows[1].change_point_value(&cd), Some(1.0));
}

#[test]
fn change_points_per_entity() {
    let items = vec![
        SeriesItem::edge("A", "B")
            .with_sample(T1, MetricKey::CoExecution, 1.0)
            .with_change_point(T1),
        SeriesItem::edge("B", "C").with_sample(T1, MetricKey::CoExecution, 2.0),
    ];
    let table = align(&items, MetricKey::CoExecution).unwrap();
    let row = &table.rows[0];
    assert_eq!(row.change_point_value(&EntityKey::edge("A", "B")), Some(1.0));
    assert_eq!(row.change_point_value(&EntityKey::edge("B", "C")), None);
}

#[test]
fn scope_mismatch() {
    match align(&scenario(), MetricKey::Importance) {
        Err(Error::MetricScopeMismatch { metric, entity }) => {
            assert_eq!(metric, MetricKey::Importance);
            assert_eq!(entity, EntityKey::edge("A", "B"));
        }
        r => panic!("unexpected result: {r:?}"),
    }
}

#[test]
fn malformed_samples_are_skipped() {
    let items = serde_json::from_value::<Vec<SeriesItem>>(json!([{
        "source": "A",
        "target": "B",
        "series": [
            { "time": T1, "lat": 1.5 },
            { "time": T2, "lat": null },
            { "time": T3, "freq": 4 },
            { "lat": 2.0 },
            { "time": "not a time", "lat": 2.5 }
        ],
        "change_points": [T2]
    }, {
        "series": [{ "time": T1, "lat": 9.0 }]
    }]))
    .unwrap();

    let table = align(&items, MetricKey::Latency).unwrap();
    let ab = EntityKey::edge("A", "B");
    assert_eq!(table.entities, vec![ab.clone()]);
    assert_eq!(
        table.rows.iter().map(|row| row.time).collect::<Vec<_>>(),
        vec![ts(T1), ts(T2), ts(T3)]
    );
    assert_eq!(table.rows[0].value(&ab), Some(1.5));
    assert_eq!(table.rows[1].value(&ab), None);
    assert_eq!(table.rows[1].change_point_value(&ab), None);
    assert!(table.rows[2].values.is_empty());
}

#[test]
fn node_id_takes_precedence() {
    let item = serde_json::from_value::<SeriesItem>(json!({
        "node": "svc1", "source": "A", "target": "B"
    }))
    .unwrap();
    assert_eq!(item.entity_key(), Some(EntityKey::node("svc1")));

    let item = serde_json::from_value::<SeriesItem>(json!({
        "node": "", "source": "A", "target": "B"
    }))
    .unwrap();
    assert_eq!(item.entity_key(), Some(EntityKey::edge("A", "B")));
}

#[test]
fn change_points_on_samples() {
    let items = serde_json::from_value::<Vec<SeriesItem>>(json!([{
        "node": "svc1",
        "series": [
            { "time": T1, "imp": 1.0, "change_points": [T2] },
            { "time": T2, "imp": 2.0 }
        ]
    }]))
    .unwrap();
    let table = align(&items, MetricKey::Importance).unwrap();
    assert_eq!(
        table.rows[1].change_point_value(&EntityKey::node("svc1")),
        Some(2.0)
    );
}

#[test]
fn string_and_numeric_times_merge() {
    let items = vec![
        SeriesItem::node("a").with_sample(1000_i64, MetricKey::Importance, 1.0),
        SeriesItem::node("b").with_sample("1970-01-01T00:00:01Z", MetricKey::Importance, 2.0),
    ];
    let table = align(&items, MetricKey::Importance).unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].values.len(), 2);
}

#[test]
fn epoch_unit_option() {
    let micros = 1_714_557_600_000_000_i64;
    let items = vec![SeriesItem::node("a").with_sample(micros, MetricKey::Importance, 1.0)];
    let options = AlignOptions {
        epoch_unit: EpochUnit::Micros,
    };
    let table = align_with(&items, MetricKey::Importance, &options).unwrap();
    assert_eq!(table.rows[0].time, ts(T1));
}

#[test]
fn serialize_chart_rows() {
    let table = align(&scenario(), MetricKey::Latency).unwrap();
    assert_eq!(
        serde_json::to_value(&table.rows).unwrap(),
        json!([
            { "time": "2024-05-01T10:00:00.000Z", "A->B": 5.0, "C->D": 3.0 },
            { "time": "2024-05-01T10:01:00.000Z", "A->B": 7.0, "cp_A->B": 7.0 }
        ])
    );
    assert_eq!(
        serde_json::to_value(&table.entities).unwrap(),
        json!(["A->B", "C->D"])
    );
}

#[test]
fn entity_named_time() {
    let items = vec![SeriesItem::node("time").with_sample(T1, MetricKey::Importance, 0.5)];
    let table = align(&items, MetricKey::Importance).unwrap();
    let entity = EntityKey::node(TIME_COLUMN);
    assert_eq!(table.entities, vec![entity.clone()]);
    assert_eq!(table.rows[0].time, ts(T1));
    assert_eq!(table.rows[0].value(&entity), Some(0.5));
}

#[test]
fn payload_envelopes() {
    let bare = serde_json::from_value::<ChangePointPayload>(json!([{ "node": "a" }]))
        .unwrap()
        .into_items();
    assert_eq!(bare.len(), 1);

    let wrapped = serde_json::from_value::<ChangePointPayload>(json!({ "data": [{ "node": "a" }] }))
        .unwrap()
        .into_items();
    assert_eq!(wrapped.len(), 1);

    let missing = serde_json::from_value::<ChangePointPayload>(json!({ "error": "boom" }))
        .unwrap()
        .into_items();
    assert!(missing.is_empty());
}
