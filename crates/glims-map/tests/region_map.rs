//! Cleaned outlines to region map, end to end.

use glims_map::{build_region_figure, default_regions, parse_regions, render_html, FigureOptions};
use glims_outlines::{clean, parse_geojson};

const RAW: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature",
         "geometry": {"type": "MultiPolygon", "coordinates": [
             [[[8.0,46.5],[8.1,46.5],[8.1,46.6],[8.0,46.6],[8.0,46.5]]],
             [[[8.3,46.5],[8.4,46.5],[8.4,46.6],[8.3,46.6],[8.3,46.5]]]]},
         "properties": {"line_type": "glac_bound", "glac_id": "G008000E46500N", "area": 2.1,
                        "anlys_time": "2003-08-01T00:00:00"}},
        {"type": "Feature",
         "geometry": {"type": "Polygon", "coordinates": [[[-148.0,61.0],[-147.9,61.0],[-147.9,61.1],[-148.0,61.0]]]},
         "properties": {"line_type": "glac_bound", "glac_id": "G211950E61000N", "area": 4.0,
                        "anlys_time": "2006-07-15T00:00:00"}},
        {"type": "Feature",
         "geometry": {"type": "Polygon", "coordinates": [[[8.0,46.5],[8.1,46.5],[8.1,46.6],[8.0,46.5]]]},
         "properties": {"line_type": "debris_cov", "glac_id": "G008000E46500N", "area": 0.4,
                        "anlys_time": "2003-08-01T00:00:00"}}
    ]
}"#;

#[test]
fn test_clean_then_map() {
    let cleaned = clean(&parse_geojson(RAW).unwrap()).unwrap();
    assert_eq!(cleaned.len(), 3);

    let figure =
        build_region_figure(&cleaned, &default_regions(), &FigureOptions::default()).unwrap();
    assert_eq!(figure.region_names(), vec!["Alps", "Alaska"]);
    assert_eq!(figure.data[0].locations.len(), 2);
    assert_eq!(figure.data[1].locations.len(), 1);
    assert!(figure.data[0].visible);

    let html = render_html(&figure).unwrap();
    assert!(html.contains("Zoom: Alps"));
}

#[test]
fn test_custom_regions_from_yaml() {
    let cleaned = clean(&parse_geojson(RAW).unwrap()).unwrap();
    let regions = parse_regions(
        "- name: Bernese Oberland\n  lon: [7.5, 8.5]\n  lat: [46.3, 46.8]\n\
         - name: Chugach\n  lon: [-150, -145]\n  lat: [60, 62]\n",
    )
    .unwrap();

    let options = FigureOptions {
        start: Some("Chugach".to_string()),
        ..FigureOptions::default()
    };
    let figure = build_region_figure(&cleaned, &regions, &options).unwrap();
    assert_eq!(figure.layout.title, "Zoom: Chugach");
    assert!(figure.data[1].visible);
}
