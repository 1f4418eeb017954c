//! Standalone HTML rendering of a figure.

use crate::figure::Figure;
use crate::Result;
use std::path::Path;

/// plotly.js bundle loaded by the page.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Render a self-contained page plotting `figure`.
pub fn render_html(figure: &Figure) -> Result<String> {
    // "</" inside the JSON would close the script element early.
    let json = figure.to_json()?.replace("</", "<\\/");
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
<style>html, body, #map {{ margin: 0; width: 100%; height: 100%; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const figure = {json};
Plotly.newPlot("map", figure.data, figure.layout, {{ responsive: true, scrollZoom: true }});
</script>
</body>
</html>
"#,
        title = escape_html(&figure.layout.title),
        cdn = PLOTLY_CDN,
        json = json,
    ))
}

/// Write the rendered page to a file.
pub fn write_html(figure: &Figure, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, render_html(figure)?)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{build_region_figure, FigureOptions};
    use crate::region::Region;
    use geo::{polygon, Geometry};
    use glims_outlines::{OutlineTable, Value};

    fn figure(region_name: &str) -> Figure {
        let mut table = OutlineTable::default();
        table.insert(
            Some(Geometry::Polygon(polygon![
                (x: 7.0, y: 46.0),
                (x: 7.1, y: 46.0),
                (x: 7.1, y: 46.1),
                (x: 7.0, y: 46.0),
            ])),
            [("glac_name", Value::from("</script><b>"))],
        );
        let regions = vec![Region::new(region_name, (4.0, 16.0), (43.0, 49.0))];
        build_region_figure(&table, &regions, &FigureOptions::default()).unwrap()
    }

    #[test]
    fn test_render_html_contains_figure() {
        let html = render_html(&figure("Alps")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("<title>Zoom: Alps</title>"));
        assert!(html.contains("choroplethmapbox"));
        assert!(html.contains("Plotly.newPlot"));
    }

    #[test]
    fn test_render_html_escapes() {
        let html = render_html(&figure("A&B")).unwrap();
        assert!(html.contains("<title>Zoom: A&amp;B</title>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        write_html(&figure("Alps"), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Plotly.newPlot"));
    }
}
