//! Named longitude/latitude boxes.

use crate::{MapError, Result};
use geo::{coord, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named geographic box in degrees.
///
/// In YAML:
///
/// ```yaml
/// - name: Alps
///   lon: [4, 16]
///   lat: [43, 49]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Display name.
    pub name: String,
    /// Longitude range (min, max).
    pub lon: (f64, f64),
    /// Latitude range (min, max).
    pub lat: (f64, f64),
}

impl Region {
    /// Create a region.
    pub fn new(name: impl Into<String>, lon: (f64, f64), lat: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            lon,
            lat,
        }
    }

    /// The region as a rectangle (x = longitude, y = latitude).
    pub fn bbox(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.lon.0, y: self.lat.0 },
            coord! { x: self.lon.1, y: self.lat.1 },
        )
    }

    /// Check the bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        let (lon0, lon1) = self.lon;
        let (lat0, lat1) = self.lat;
        let finite = [lon0, lon1, lat0, lat1].iter().all(|v| v.is_finite());
        if !finite || lon0 > lon1 || lat0 > lat1 {
            return Err(MapError::InvalidRegion(self.name.clone()));
        }
        Ok(())
    }
}

/// Major glacierized regions: Alps, Himalaya, Alaska, Patagonia, Iceland.
pub fn default_regions() -> Vec<Region> {
    vec![
        Region::new("Alps", (4.0, 16.0), (43.0, 49.0)),
        Region::new("Himalaya", (75.0, 105.0), (25.0, 37.0)),
        Region::new("Alaska", (-170.0, -130.0), (52.0, 72.0)),
        Region::new("Patagonia", (-76.0, -65.0), (-56.0, -40.0)),
        Region::new("Iceland", (-25.0, -12.0), (63.0, 67.0)),
    ]
}

/// Parse a YAML list of regions.
pub fn parse_regions(yaml: &str) -> Result<Vec<Region>> {
    let regions: Vec<Region> = serde_yaml::from_str(yaml)?;
    for region in &regions {
        region.validate()?;
    }
    Ok(regions)
}

/// Load a YAML list of regions from a file.
pub fn load_regions(path: impl AsRef<Path>) -> Result<Vec<Region>> {
    parse_regions(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_regions() {
        let regions = default_regions();
        let names: Vec<_> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alps", "Himalaya", "Alaska", "Patagonia", "Iceland"]);
        assert!(regions.iter().all(|r| r.validate().is_ok()));
        assert_eq!(regions[3].lat, (-56.0, -40.0));
    }

    #[test]
    fn test_parse_regions_yaml() {
        let yaml = "- name: Svalbard\n  lon: [10, 35]\n  lat: [76, 81]\n\
                    - name: Alps\n  lon: [4, 16]\n  lat: [43, 49]\n";
        let regions = parse_regions(yaml).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0], Region::new("Svalbard", (10.0, 35.0), (76.0, 81.0)));
    }

    #[test]
    fn test_parse_regions_rejects_inverted_box() {
        let yaml = "- name: Bad\n  lon: [16, 4]\n  lat: [43, 49]\n";
        assert!(matches!(parse_regions(yaml), Err(MapError::InvalidRegion(name)) if name == "Bad"));
    }

    #[test]
    fn test_bbox() {
        let rect = Region::new("r", (-10.0, 5.0), (1.0, 2.0)).bbox();
        assert_eq!(rect.min().x, -10.0);
        assert_eq!(rect.max().y, 2.0);
    }
}
