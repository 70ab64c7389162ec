use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;

use crate::models::Point;

/// Pure transformation over a point sequence, applied on the read path only.
pub trait PointsFilter: Send + Sync {
    fn apply(&self, points: Vec<Point>) -> Vec<Point>;
}

/// Returns the sequence unchanged.
pub struct IdentityFilter;

impl PointsFilter for IdentityFilter {
    fn apply(&self, points: Vec<Point>) -> Vec<Point> {
        points
    }
}

/// Collapses each run of consecutive coordinate-equal points to one
/// representative. Non-consecutive duplicates survive.
pub struct RedundancyFilter;

impl PointsFilter for RedundancyFilter {
    fn apply(&self, points: Vec<Point>) -> Vec<Point> {
        points.into_iter().dedup().collect()
    }
}

/// Keeps the points at even indices (0, 2, 4, ...), dropping the rest.
pub struct UndersamplingFilter;

impl PointsFilter for UndersamplingFilter {
    fn apply(&self, points: Vec<Point>) -> Vec<Point> {
        points.into_iter().step_by(2).collect()
    }
}

/// Filter selection for wiring, parsed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Identity,
    Redundancy,
    Undersampling,
}

impl FilterKind {
    pub fn into_filter(self) -> Arc<dyn PointsFilter> {
        match self {
            FilterKind::Identity => Arc::new(IdentityFilter),
            FilterKind::Redundancy => Arc::new(RedundancyFilter),
            FilterKind::Undersampling => Arc::new(UndersamplingFilter),
        }
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(FilterKind::Identity),
            "redundancy" => Ok(FilterKind::Redundancy),
            "undersampling" => Ok(FilterKind::Undersampling),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}
