//! Plotly figure with one choropleth-mapbox trace per region and a
//! dropdown to switch between them.

use crate::region::Region;
use crate::subset::{subset_region, DEFAULT_MAX_POLYS};
use crate::view::{compute_view, MapView, DEFAULT_PAD};
use crate::{MapError, Result};
use geojson::feature::Id;
use glims_metrics::metric_defs;
use glims_outlines::{to_feature_collection, OutlineTable, WGS84_EPSG};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

/// Fill color shared by every outline.
pub const FILL_COLOR: &str = "rgba(0,120,255,0.45)";

/// Outline stroke width.
pub const LINE_WIDTH: f64 = 0.2;

/// Default basemap style.
pub const DEFAULT_BASEMAP: &str = "carto-positron";

// ============================================================================
// Options
// ============================================================================

/// Settings for [`build_region_figure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureOptions {
    /// Region shown first. Falls back to the first region with data.
    pub start: Option<String>,
    /// Cap on polygons per region.
    pub max_polys: usize,
    /// Sampling seed.
    pub seed: u64,
    /// Mapbox style name.
    pub basemap: String,
    /// View padding as a fraction of the span.
    pub pad: f64,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            start: None,
            max_polys: DEFAULT_MAX_POLYS,
            seed: 0,
            basemap: DEFAULT_BASEMAP.to_string(),
            pad: DEFAULT_PAD,
        }
    }
}

// ============================================================================
// Figure Types
// ============================================================================

/// A plotly figure: traces plus layout.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    /// One trace per region with data.
    pub data: Vec<ChoroplethTrace>,
    /// Figure layout.
    pub layout: Layout,
}

impl Figure {
    /// Names of the regions in the figure, in trace order.
    pub fn region_names(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }

    /// Figure JSON as accepted by `Plotly.newPlot`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A `choroplethmapbox` trace drawing every outline in one flat color.
#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethTrace {
    /// Always `choroplethmapbox`.
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    /// Region name.
    pub name: String,
    /// FeatureCollection whose features have ids "0".."n-1".
    pub geojson: geojson::FeatureCollection,
    /// Feature ids, one per outline.
    pub locations: Vec<String>,
    /// Property used to match locations.
    pub featureidkey: &'static str,
    /// Constant values; the color comes from the flat colorscale.
    pub z: Vec<u8>,
    /// Lower color bound.
    pub zmin: f64,
    /// Upper color bound.
    pub zmax: f64,
    /// Two-stop colorscale of one color.
    pub colorscale: Vec<(f64, &'static str)>,
    /// Whether the color bar is drawn.
    pub showscale: bool,
    /// Marker styling.
    pub marker: Marker,
    /// Whether the trace is shown.
    pub visible: bool,
}

/// Trace marker styling.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    /// Outline stroke.
    pub line: MarkerLine,
}

/// Outline stroke styling.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerLine {
    /// Stroke width in pixels.
    pub width: f64,
}

/// Figure layout.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    /// Title text.
    pub title: String,
    /// Margins in pixels.
    pub margin: Margin,
    /// Map settings.
    pub mapbox: Mapbox,
    /// Drag behavior.
    pub dragmode: &'static str,
    /// UI state key; changing it resets user pan and zoom.
    pub uirevision: String,
    /// Region dropdown.
    pub updatemenus: Vec<UpdateMenu>,
}

/// Layout margins.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Margin {
    /// Left.
    pub l: u32,
    /// Right.
    pub r: u32,
    /// Top.
    pub t: u32,
    /// Bottom.
    pub b: u32,
}

/// Mapbox layout settings.
#[derive(Debug, Clone, Serialize)]
pub struct Mapbox {
    /// Basemap style.
    pub style: String,
    /// Camera center.
    pub center: crate::view::Center,
    /// Camera zoom.
    pub zoom: f64,
}

/// A dropdown menu.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMenu {
    /// One button per region.
    pub buttons: Vec<Button>,
    /// Menu direction.
    pub direction: &'static str,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

/// A dropdown button running a plotly `update`.
#[derive(Debug, Clone, Serialize)]
pub struct Button {
    /// Region name.
    pub label: String,
    /// Always `update`.
    pub method: &'static str,
    /// Trace update followed by layout update.
    pub args: [JsonValue; 2],
}

// ============================================================================
// Building
// ============================================================================

/// Whether the table's coordinates can be read as longitude/latitude.
///
/// Tables without a CRS are taken to be WGS 84.
pub fn is_lon_lat(table: &OutlineTable) -> bool {
    table
        .crs()
        .map_or(true, |crs| crs.epsg() == Some(WGS84_EPSG))
}

/// Build a figure with one trace per region that contains outlines.
///
/// Regions without outlines are skipped and left out of the dropdown. Only
/// the start region's trace is visible. Fails with
/// [`MapError::NoRegionData`] if every region is empty.
pub fn build_region_figure(
    table: &OutlineTable,
    regions: &[Region],
    options: &FigureOptions,
) -> Result<Figure> {
    if !is_lon_lat(table) {
        warn!(
            "build_region_figure: outlines are in {}, region bounds assume EPSG:{}",
            table.crs().map(ToString::to_string).unwrap_or_default(),
            WGS84_EPSG
        );
    }

    let mut traces = Vec::new();
    let mut views: Vec<MapView> = Vec::new();

    for region in regions {
        let subset = subset_region(table, region, options.max_polys, options.seed);
        let Some(view) = compute_view(&subset, options.pad) else {
            debug!("build_region_figure[{}]: no outlines, skipping", region.name);
            continue;
        };

        metrics::gauge!(metric_defs::MAP_POLYGONS.name, "region" => region.name.clone())
            .set(subset.len() as f64);
        debug!(
            "build_region_figure[{}]: {} outlines, zoom {:.2}",
            region.name,
            subset.len(),
            view.zoom
        );

        traces.push(region_trace(&region.name, &subset)?);
        views.push(view);
    }

    if traces.is_empty() {
        return Err(MapError::NoRegionData(regions.len()));
    }

    let start = options
        .start
        .as_deref()
        .and_then(|name| traces.iter().position(|t| t.name == name))
        .unwrap_or(0);
    traces[start].visible = true;

    let buttons = traces
        .iter()
        .zip(&views)
        .enumerate()
        .map(|(i, (trace, view))| {
            let visible: Vec<bool> = (0..traces.len()).map(|j| j == i).collect();
            Button {
                label: trace.name.clone(),
                method: "update",
                args: [
                    json!({ "visible": visible }),
                    json!({
                        "title": title(&trace.name),
                        "uirevision": uirevision(&trace.name),
                        "mapbox.center": view.center,
                        "mapbox.zoom": view.zoom,
                        "mapbox.style": options.basemap,
                    }),
                ],
            }
        })
        .collect();

    let start_name = traces[start].name.clone();
    info!(
        "build_region_figure: {} regions with data, starting at {}",
        traces.len(),
        start_name
    );

    let layout = Layout {
        title: title(&start_name),
        margin: Margin { l: 0, r: 0, t: 40, b: 0 },
        mapbox: Mapbox {
            style: options.basemap.clone(),
            center: views[start].center,
            zoom: views[start].zoom,
        },
        dragmode: "pan",
        uirevision: uirevision(&start_name),
        updatemenus: vec![UpdateMenu {
            buttons,
            direction: "down",
            x: 0.01,
            y: 0.99,
        }],
    };

    Ok(Figure {
        data: traces,
        layout,
    })
}

fn region_trace(name: &str, subset: &OutlineTable) -> Result<ChoroplethTrace> {
    let mut collection = to_feature_collection(subset)?;
    collection.foreign_members = None;
    for (i, feature) in collection.features.iter_mut().enumerate() {
        feature.id = Some(Id::String(i.to_string()));
    }
    let locations: Vec<String> = (0..collection.features.len()).map(|i| i.to_string()).collect();

    Ok(ChoroplethTrace {
        trace_type: "choroplethmapbox",
        name: name.to_string(),
        z: vec![1; locations.len()],
        geojson: collection,
        locations,
        featureidkey: "id",
        zmin: 0.0,
        zmax: 1.0,
        colorscale: vec![(0.0, FILL_COLOR), (1.0, FILL_COLOR)],
        showscale: false,
        marker: Marker {
            line: MarkerLine { width: LINE_WIDTH },
        },
        visible: false,
    })
}

fn title(region: &str) -> String {
    format!("Zoom: {}", region)
}

fn uirevision(region: &str) -> String {
    format!("region:{}", region)
}
