/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::HashSet;

use crate::time::SampleTime;

/// The change-point times of one series. Membership is exact
/// equality on the raw sample time; there is no tolerance window.
#[derive(PartialEq, Eq, Default, Clone, Debug)]
pub struct ChangePoints(HashSet<SampleTime>);

impl ChangePoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, time: &SampleTime) -> bool {
        match time {
            SampleTime::Fractional(_) => self.0.contains(&time.clone().canonical()),
            _ => self.0.contains(time),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SampleTime> for ChangePoints {
    fn from_iter<T: IntoIterator<Item = SampleTime>>(iter: T) -> Self {
        Self(iter.into_iter().map(SampleTime::canonical).collect())
    }
}

impl Extend<SampleTime> for ChangePoints {
    fn extend<T: IntoIterator<Item = SampleTime>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(SampleTime::canonical))
    }
}

pub fn is_change_point(time: &SampleTime, change_points: &ChangePoints) -> bool {
    change_points.contains(time)
}

#[cfg(test)]
mod tests {
    use ordered_float::OrderedFloat;

    use super::{is_change_point, ChangePoints};
    use crate::time::SampleTime;

    #[test]
    fn exact_match_only() {
        let cps = [1000, 3000].map(SampleTime::Epoch).into_iter().collect::<ChangePoints>();
        assert!(is_change_point(&SampleTime::Epoch(1000), &cps));
        assert!(!is_change_point(&SampleTime::Epoch(999), &cps));
        assert!(!is_change_point(&SampleTime::Epoch(1001), &cps));
        assert!(!is_change_point(&SampleTime::Epoch(2000), &cps));
    }

    #[test]
    fn raw_representation_matters() {
        let cps = ChangePoints::from_iter([SampleTime::from("1970-01-01T00:00:01Z")]);
        assert!(is_change_point(&SampleTime::from("1970-01-01T00:00:01Z"), &cps));
        assert!(!is_change_point(&SampleTime::Epoch(1000), &cps));
        assert!(!is_change_point(&SampleTime::Fractional(OrderedFloat(1000.0)), &cps));
    }

    #[test]
    fn numbers_match_by_value() {
        let cps = ChangePoints::from_iter([SampleTime::Epoch(1000)]);
        assert!(is_change_point(&SampleTime::Fractional(OrderedFloat(1000.0)), &cps));
        assert!(!is_change_point(&SampleTime::Fractional(OrderedFloat(1000.5)), &cps));

        let cps = ChangePoints::from_iter([SampleTime::Fractional(OrderedFloat(2000.0))]);
        assert!(is_change_point(&SampleTime::Epoch(2000), &cps));
    }

    #[test]
    fn empty_set() {
        let cps = ChangePoints::new();
        assert!(cps.is_empty());
        assert!(!is_change_point(&SampleTime::Epoch(0), &cps));
    }
}
