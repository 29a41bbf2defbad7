use crate::aggregate::CountrySelection;
use crate::colors::{rgb_for_avg, Rgb};
use crate::types::CountryAggregate;

use super::centroids::centroid;

const MIN_RADIUS: f64 = 4.0;
const RADIUS_SCALE: f64 = 3.0;
const MAX_RADIUS: f64 = 30.0;
/// Degrees added around the fitted markers.
const FIT_PADDING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleMarker {
    pub cc: String,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub n: u64,
    pub avg: f64,
    pub radius: f64,
    pub color: Rgb,
    pub selected: bool,
}

/// Camera placement for the bubble map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// Fit the given bounds in degrees.
    Fit {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    },
    /// Whole-world view used when there is nothing to fit.
    World { center: (f64, f64), zoom: u8 },
}

impl Viewport {
    pub const WORLD: Viewport = Viewport::World {
        center: (20.0, 0.0),
        zoom: 2,
    };
}

/// Marker radius grows with the square root of the post count, capped.
#[must_use]
pub fn bubble_radius(n: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = n as f64;
    (MIN_RADIUS + RADIUS_SCALE * n.sqrt()).min(MAX_RADIUS)
}

/// One marker per country that has a known centroid.
///
/// Countries outside the centroid table are skipped.
#[must_use]
pub fn bubble_markers(
    countries: &[CountryAggregate],
    selection: &CountrySelection,
) -> Vec<BubbleMarker> {
    countries
        .iter()
        .filter_map(|agg| {
            let Some(point) = centroid(&agg.cc) else {
                tracing::debug!(cc = %agg.cc, "no centroid for country; marker skipped");
                return None;
            };
            Some(BubbleMarker {
                cc: point.cc.to_string(),
                name: point.name,
                lat: point.lat,
                lon: point.lon,
                n: agg.n,
                avg: agg.avg,
                radius: bubble_radius(agg.n),
                color: rgb_for_avg(agg.avg),
                selected: selection.is_selected(point.cc),
            })
        })
        .collect()
}

/// Bounds around all markers, or [`Viewport::WORLD`] when there are none.
#[must_use]
pub fn fit_viewport(markers: &[BubbleMarker]) -> Viewport {
    let Some(first) = markers.first() else {
        return Viewport::WORLD;
    };
    let init = (first.lat, first.lon, first.lat, first.lon);
    let (south, west, north, east) = markers.iter().fold(init, |(s, w, n, e), m| {
        (s.min(m.lat), w.min(m.lon), n.max(m.lat), e.max(m.lon))
    });
    Viewport::Fit {
        south: (south - FIT_PADDING).max(-90.0),
        west: (west - FIT_PADDING).max(-180.0),
        north: (north + FIT_PADDING).min(90.0),
        east: (east + FIT_PADDING).min(180.0),
    }
}
