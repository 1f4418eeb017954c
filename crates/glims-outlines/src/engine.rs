//! Geometry capabilities the cleaning pipeline relies on.
//!
//! The pipeline never implements geometry robustness itself. It asks a
//! [`GeometryEngine`] to check validity, repair, and produce canonical bytes.
//! [`GeoEngine`] is the default engine backed by the `geo` and `geozero`
//! crates.

use crate::{OutlineError, Result};
use geo::algorithm::bool_ops::FillRule;
use geo::{BooleanOps, Buffer, CoordsIter, Geometry, MultiPolygon, Polygon, Validation};
use geozero::{CoordDimensions, ToWkb};

/// Geometry operations used by the cleaning stages.
pub trait GeometryEngine {
    /// Whether the geometry is topologically valid.
    fn is_valid(&self, geometry: &Geometry<f64>) -> bool;

    /// Repair a geometry into a valid areal geometry.
    ///
    /// Returns [`OutlineError::RepairUnsupported`] when the engine has no
    /// repair for this kind of geometry; callers then fall back to
    /// [`GeometryEngine::buffer_zero`].
    fn make_valid(&self, geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>>;

    /// Repair a geometry by buffering it with a zero distance.
    fn buffer_zero(&self, geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>>;

    /// Deterministic byte encoding of a geometry, used for exact-duplicate detection.
    fn canonical_bytes(&self, geometry: &Geometry<f64>) -> Result<Vec<u8>>;
}

/// Default engine backed by `geo` (validation, boolean ops, buffer) and
/// `geozero` (WKB encoding).
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoEngine;

impl GeometryEngine for GeoEngine {
    fn is_valid(&self, geometry: &Geometry<f64>) -> bool {
        geometry.is_valid()
    }

    fn make_valid(&self, geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>> {
        let parts = areal_parts(geometry)
            .ok_or_else(|| OutlineError::RepairUnsupported(kind_name(geometry).to_string()))?;
        let multi = MultiPolygon::new(parts);
        ensure_finite(&multi)?;

        // Leave valid input byte-for-byte untouched so repeated cleaning is stable.
        if multi.is_valid() {
            return Ok(multi);
        }

        // Each part is rebuilt from its own rings, so every lobe of a
        // self-intersecting ring keeps its area.
        let rebuilt = MultiPolygon::new(multi.0.iter().flat_map(even_odd_fill).collect());
        if rebuilt.is_valid() {
            return Ok(rebuilt);
        }
        // Rebuilt parts may still overlap one another.
        Ok(rebuilt.union_with_fill_rule(&no_polygons(), FillRule::NonZero))
    }

    fn buffer_zero(&self, geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>> {
        let Some(parts) = areal_parts(geometry) else {
            // A zero-width buffer of points or lines has no area.
            return Ok(MultiPolygon::new(Vec::new()));
        };
        let multi = MultiPolygon::new(parts);
        ensure_finite(&multi)?;
        Ok(multi.buffer(0.0))
    }

    fn canonical_bytes(&self, geometry: &Geometry<f64>) -> Result<Vec<u8>> {
        geometry
            .to_wkb(CoordDimensions::xy())
            .map_err(|e| OutlineError::Encoding(e.to_string()))
    }
}

/// Polygonal parts of a geometry, or `None` if the geometry kind has no area.
///
/// Collections contribute their areal members and ignore the rest.
fn areal_parts(geometry: &Geometry<f64>) -> Option<Vec<Polygon<f64>>> {
    match geometry {
        Geometry::Polygon(p) => Some(vec![p.clone()]),
        Geometry::MultiPolygon(mp) => Some(mp.0.clone()),
        Geometry::Rect(r) => Some(vec![r.to_polygon()]),
        Geometry::Triangle(t) => Some(vec![t.to_polygon()]),
        Geometry::GeometryCollection(gc) => Some(
            gc.0.iter()
                .filter_map(areal_parts)
                .flatten()
                .collect(),
        ),
        _ => None,
    }
}

/// Region covered by an odd number of a polygon's rings.
fn even_odd_fill(polygon: &Polygon<f64>) -> Vec<Polygon<f64>> {
    polygon
        .union_with_fill_rule(&no_polygons(), FillRule::EvenOdd)
        .0
}

fn no_polygons() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

fn ensure_finite(multi: &MultiPolygon<f64>) -> Result<()> {
    if multi
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
    {
        Ok(())
    } else {
        Err(OutlineError::RepairFailed(
            "geometry has non-finite coordinates".to_string(),
        ))
    }
}

/// Human-readable geometry kind, for error messages.
pub(crate) fn kind_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
