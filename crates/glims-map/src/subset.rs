//! Region subsetting with seeded sampling.

use crate::region::Region;
use glims_outlines::OutlineTable;
use geo::Intersects;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default cap on polygons drawn per region.
pub const DEFAULT_MAX_POLYS: usize = 5000;

/// Rows whose geometry intersects the region box.
///
/// With more than `max_polys` matches, a sample of `max_polys` rows drawn
/// with a ChaCha8 generator seeded by `seed` is kept, in table order. The
/// same inputs always give the same subset.
pub fn subset_region(
    table: &OutlineTable,
    region: &Region,
    max_polys: usize,
    seed: u64,
) -> OutlineTable {
    let bbox = region.bbox();
    let hits: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.geometry.as_ref().is_some_and(|g| g.intersects(&bbox)))
        .map(|(i, _)| i)
        .collect();

    if hits.len() <= max_polys {
        return table.select(&hits);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, hits.len(), max_polys).into_vec();
    picked.sort_unstable();
    let positions: Vec<usize> = picked.into_iter().map(|i| hits[i]).collect();
    table.select(&positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};
    use glims_outlines::Value;

    fn square(x: f64, y: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + 0.1, y: y),
            (x: x + 0.1, y: y + 0.1),
            (x: x, y: y + 0.1),
            (x: x, y: y),
        ])
    }

    fn grid_table() -> OutlineTable {
        let mut table = OutlineTable::default();
        for i in 0..50 {
            table.insert(
                Some(square(5.0 + i as f64 * 0.1, 45.0)),
                [("glac_id", Value::from(format!("A{}", i)))],
            );
        }
        table.insert(Some(square(-150.0, 60.0)), [("glac_id", Value::from("AK"))]);
        table.insert(None, [("glac_id", Value::from("none"))]);
        table
    }

    #[test]
    fn test_subset_selects_intersecting_rows() {
        let table = grid_table();
        let alps = Region::new("Alps", (4.0, 16.0), (43.0, 49.0));
        let sub = subset_region(&table, &alps, 1000, 0);
        assert_eq!(sub.len(), 50);

        let alaska = Region::new("Alaska", (-170.0, -130.0), (52.0, 72.0));
        let sub = subset_region(&table, &alaska, 1000, 0);
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.value(0, "glac_id"), Some(&Value::from("AK")));
    }

    #[test]
    fn test_subset_includes_boundary_crossing() {
        let mut table = OutlineTable::default();
        table.insert(Some(square(15.95, 48.95)), [("glac_id", Value::from("edge"))]);
        let alps = Region::new("Alps", (4.0, 16.0), (43.0, 49.0));
        assert_eq!(subset_region(&table, &alps, 10, 0).len(), 1);
    }

    #[test]
    fn test_sampling_is_deterministic_and_ordered() {
        let table = grid_table();
        let alps = Region::new("Alps", (4.0, 16.0), (43.0, 49.0));

        let a = subset_region(&table, &alps, 10, 42);
        let b = subset_region(&table, &alps, 10, 42);
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);

        let labels: Vec<_> = a.rows().iter().map(|r| r.index).collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn test_sampling_depends_on_seed() {
        let table = grid_table();
        let alps = Region::new("Alps", (4.0, 16.0), (43.0, 49.0));
        let a = subset_region(&table, &alps, 10, 1);
        let b = subset_region(&table, &alps, 10, 2);
        assert_ne!(a, b);
    }
}
