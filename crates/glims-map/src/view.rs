//! Map camera placement.

use glims_outlines::OutlineTable;
use serde::Serialize;

/// Smallest zoom level returned by [`bbox_to_zoom`].
pub const MIN_ZOOM: f64 = 1.5;

/// Largest zoom level returned by [`bbox_to_zoom`].
pub const MAX_ZOOM: f64 = 10.5;

/// Default padding, as a fraction of the span.
pub const DEFAULT_PAD: f64 = 0.05;

/// Padding in degrees used when a span is zero.
const DEGENERATE_PAD: f64 = 0.5;

/// Map center in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Center {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

/// Camera center and zoom for a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// Map center.
    pub center: Center,
    /// Web-map zoom level.
    pub zoom: f64,
}

/// Zoom level that fits a box: `8 - log2(largest span)`.
///
/// Spans are floored at 1e-6 degrees and the result clamped to
/// [`MIN_ZOOM`]..=[`MAX_ZOOM`].
pub fn bbox_to_zoom(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> f64 {
    let lon_span = (lon_max - lon_min).max(1e-6);
    let lat_span = (lat_max - lat_min).max(1e-6);
    let span = lon_span.max(lat_span);
    (8.0 - span.log2()).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// View fitting the total bounds of a table, padded by `pad` times the span
/// on each side.
///
/// Returns `None` when no row has a geometry.
pub fn compute_view(table: &OutlineTable, pad: f64) -> Option<MapView> {
    let bounds = table.total_bounds()?;
    let (lon_min, lat_min) = (bounds.min().x, bounds.min().y);
    let (lon_max, lat_max) = (bounds.max().x, bounds.max().y);

    let pad_x = padding(lon_min, lon_max, pad);
    let pad_y = padding(lat_min, lat_max, pad);
    let (lon_min, lon_max) = (lon_min - pad_x, lon_max + pad_x);
    let (lat_min, lat_max) = (lat_min - pad_y, lat_max + pad_y);

    Some(MapView {
        center: Center {
            lon: (lon_min + lon_max) / 2.0,
            lat: (lat_min + lat_max) / 2.0,
        },
        zoom: bbox_to_zoom(lon_min, lat_min, lon_max, lat_max),
    })
}

fn padding(min: f64, max: f64, pad: f64) -> f64 {
    if max > min {
        (max - min) * pad
    } else {
        DEGENERATE_PAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{point, polygon, Geometry};
    use glims_outlines::Value;

    #[test]
    fn test_zoom_from_span() {
        // Alps: 12 degrees wide.
        assert_relative_eq!(bbox_to_zoom(4.0, 43.0, 16.0, 49.0), 8.0 - 12f64.log2());
        // 1 degree box.
        assert_relative_eq!(bbox_to_zoom(0.0, 0.0, 1.0, 0.5), 8.0);
    }

    #[test]
    fn test_zoom_clamped() {
        assert_relative_eq!(bbox_to_zoom(-180.0, -90.0, 180.0, 90.0), MIN_ZOOM);
        assert_relative_eq!(bbox_to_zoom(5.0, 5.0, 5.0, 5.0), MAX_ZOOM);
        assert_relative_eq!(bbox_to_zoom(5.0, 5.0, 5.001, 5.001), MAX_ZOOM);
    }

    #[test]
    fn test_compute_view_padded() {
        let mut table = OutlineTable::default();
        table.insert(
            Some(Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 4.0),
                (x: 0.0, y: 0.0),
            ])),
            [("glac_id", Value::from("G1"))],
        );

        let view = compute_view(&table, 0.05).unwrap();
        assert_relative_eq!(view.center.lon, 5.0);
        assert_relative_eq!(view.center.lat, 2.0);
        // Padded lon span 11 dominates.
        assert_relative_eq!(view.zoom, 8.0 - 11f64.log2());
    }

    #[test]
    fn test_compute_view_degenerate_span() {
        let mut table = OutlineTable::default();
        table.insert(
            Some(Geometry::Point(point!(x: 7.0, y: 46.0))),
            [("glac_id", Value::from("G1"))],
        );

        let view = compute_view(&table, 0.05).unwrap();
        assert_relative_eq!(view.center.lon, 7.0);
        assert_relative_eq!(view.center.lat, 46.0);
        // Padded to one degree each way.
        assert_relative_eq!(view.zoom, 8.0);
    }

    #[test]
    fn test_compute_view_empty() {
        assert!(compute_view(&OutlineTable::default(), 0.05).is_none());
    }
}
