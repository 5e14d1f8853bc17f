/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::{BTreeMap, HashSet};

use serde::{ser::SerializeMap, Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    ids::EntityKey,
    metrics::MetricKey,
    time::{EpochUnit, Timestamp},
};

use super::{change_points::is_change_point, serial::SeriesItem};

/// Prefix of the change-point columns in serialized rows.
pub const CHANGE_POINT_PREFIX: &str = "cp_";

/// Column holding the row timestamp in serialized rows.
pub const TIME_COLUMN: &str = "time";

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct AlignOptions {
    /// Unit of numeric sample times.
    #[serde(default)]
    pub epoch_unit: EpochUnit,
}

/// All series of a query merged on their timestamps.
#[derive(Serialize, PartialEq, Clone, Default, Debug)]
pub struct AlignedTable {
    /// Distinct entities, in the order they were first encountered.
    pub entities: Vec<EntityKey>,
    /// One row per distinct timestamp, in chronological order.
    pub rows: Vec<AlignedRow>,
}

/// The samples of all entities at one timestamp. Entities without a
/// sample at this time have no entry.
#[derive(PartialEq, Clone, Debug)]
pub struct AlignedRow {
    pub time: Timestamp,
    pub values: BTreeMap<EntityKey, f64>,
    pub change_points: BTreeMap<EntityKey, f64>,
}

#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct ChangePointMarker {
    pub time: Timestamp,
    pub entity: EntityKey,
    pub value: f64,
}

/// Align the series of all items on their timestamps, reading the
/// given metric from each sample.
///
/// The metric must belong to the same namespace as the items: node
/// metrics for node series, edge metrics for edge series. Items that
/// identify neither a node nor an edge are skipped, as are samples
/// without a valid time. Samples lacking a numeric value for the
/// metric still produce their row, but no value in it.
pub fn align(items: &[SeriesItem], metric: MetricKey) -> Result<AlignedTable> {
    align_with(items, metric, &AlignOptions::default())
}

pub fn align_with(
    items: &[SeriesItem],
    metric: MetricKey,
    options: &AlignOptions,
) -> Result<AlignedTable> {
    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = BTreeMap::new();

    for item in items {
        let Some(entity) = item.entity_key() else {
            log::warn!("skipping series without node or source/target");
            continue;
        };

        if entity.scope() != metric.scope() {
            return Err(Error::MetricScopeMismatch { metric, entity });
        }

        if seen.insert(entity.clone()) {
            if entity.to_string() == TIME_COLUMN {
                log::warn!("entity {entity} collides with the time column of serialized rows");
            }
            entities.push(entity.clone());
        }

        let change_points = item.change_points();

        for point in &item.series {
            let Some(time) = &point.time else {
                log::debug!("{entity}: skipping sample without time");
                continue;
            };

            let timestamp = match time.to_timestamp(options.epoch_unit) {
                Ok(timestamp) => timestamp,
                Err(e) => {
                    log::debug!("{entity}: skipping sample: {e}");
                    continue;
                }
            };

            let row = rows
                .entry(timestamp)
                .or_insert_with(|| AlignedRow::new(timestamp));

            let Some(value) = point.value(metric) else {
                continue;
            };

            row.values.insert(entity.clone(), value);
            if is_change_point(time, &change_points) {
                row.change_points.insert(entity.clone(), value);
            }
        }
    }

    Ok(AlignedTable {
        entities,
        rows: rows.into_values().collect(),
    })
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, time: &Timestamp) -> Option<&AlignedRow> {
        self.rows
            .binary_search_by(|row| row.time.cmp(time))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// The change points of all entities, in row order.
    pub fn change_points(&self) -> Vec<ChangePointMarker> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.change_points
                    .iter()
                    .map(|(entity, value)| ChangePointMarker {
                        time: row.time,
                        entity: entity.clone(),
                        value: *value,
                    })
            })
            .collect()
    }
}

impl AlignedRow {
    pub fn new(time: Timestamp) -> Self {
        Self {
            time,
            values: BTreeMap::new(),
            change_points: BTreeMap::new(),
        }
    }

    pub fn value(&self, entity: &EntityKey) -> Option<f64> {
        self.values.get(entity).copied()
    }

    pub fn change_point_value(&self, entity: &EntityKey) -> Option<f64> {
        self.change_points.get(entity).copied()
    }
}

/// Rows serialize as flat chart records:
/// `{"time": ..., "<entity>": value, "cp_<entity>": value}`.
///
/// A node named `time` shares its column with the timestamp, so its
/// values cannot be told apart in this form; read them through
/// [`AlignedRow::value`] instead.
impl Serialize for AlignedRow {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map =
            serializer.serialize_map(Some(1 + self.values.len() + self.change_points.len()))?;
        map.serialize_entry(TIME_COLUMN, &self.time)?;
        for (entity, value) in &self.values {
            map.serialize_entry(&entity.to_string(), value)?;
        }
        for (entity, value) in &self.change_points {
            map.serialize_entry(&format!("{CHANGE_POINT_PREFIX}{entity}"), value)?;
        }
        map.end()
    }
}
