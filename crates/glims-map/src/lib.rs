//! # glims-map
//!
//! Interactive region maps of cleaned glacier outlines.
//!
//! Outlines are grouped into named [`Region`] boxes, sampled down to a
//! manageable size, and drawn as plotly `choroplethmapbox` traces. A
//! dropdown switches between regions, moving the camera to each region's
//! [`MapView`].
//!
//! ## Example
//!
//! ```no_run
//! use glims_map::{build_region_figure, default_regions, write_html, FigureOptions};
//! use glims_outlines::read_geojson;
//!
//! let outlines = read_geojson("data/clean/glims_north.geojson")?;
//! let options = FigureOptions {
//!     start: Some("Alps".to_string()),
//!     ..FigureOptions::default()
//! };
//! let figure = build_region_figure(&outlines, &default_regions(), &options)?;
//! write_html(&figure, "glaciers.html")?;
//! # Ok::<(), glims_map::MapError>(())
//! ```

mod error;
mod figure;
mod html;
mod region;
mod subset;
mod view;

pub use error::MapError;
pub use figure::{
    build_region_figure, is_lon_lat, Button, ChoroplethTrace, Figure, FigureOptions, Layout,
    Mapbox, Margin, Marker, MarkerLine, UpdateMenu, DEFAULT_BASEMAP, FILL_COLOR, LINE_WIDTH,
};
pub use html::{render_html, write_html, PLOTLY_CDN};
pub use region::{default_regions, load_regions, parse_regions, Region};
pub use subset::{subset_region, DEFAULT_MAX_POLYS};
pub use view::{bbox_to_zoom, compute_view, Center, MapView, DEFAULT_PAD, MAX_ZOOM, MIN_ZOOM};

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, MapError>;
