//! The outline record collection.

use crate::schema::{ColumnDef, Schema};
use crate::value::Value;
use crate::{OutlineError, Result};
use geo::{BoundingRect, Geometry, Rect};
use std::collections::BTreeSet;

/// EPSG code of WGS84 geographic coordinates.
pub const WGS84_EPSG: u32 = 4326;

// ============================================================================
// Coordinate Reference System
// ============================================================================

/// Coordinate reference system of a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Crs {
    /// A CRS identified by its EPSG code.
    Epsg(u32),
    /// Any other CRS identifier, kept verbatim.
    Named(String),
}

impl Crs {
    /// WGS84 (EPSG:4326).
    pub const fn wgs84() -> Self {
        Crs::Epsg(WGS84_EPSG)
    }

    /// Parse a CRS name.
    ///
    /// Recognizes `EPSG:<code>` and OGC URNs such as
    /// `urn:ogc:def:crs:EPSG::4326`. Anything else becomes [`Crs::Named`].
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        let upper = trimmed.to_ascii_uppercase();

        let code = if let Some(rest) = upper.strip_prefix("EPSG:") {
            Some(rest)
        } else if upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
            upper.rsplit(':').next()
        } else {
            None
        };

        match code.and_then(|c| c.parse::<u32>().ok()) {
            Some(code) => Crs::Epsg(code),
            None => Crs::Named(trimmed.to_string()),
        }
    }

    /// EPSG code, if the CRS has one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Named(_) => None,
        }
    }

    /// OGC URN form used in the legacy GeoJSON `crs` member.
    pub fn to_urn(&self) -> String {
        match self {
            Crs::Epsg(code) => format!("urn:ogc:def:crs:EPSG::{}", code),
            Crs::Named(name) => name.clone(),
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Named(name) => write!(f, "{}", name),
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One glacier outline: a row label, a geometry and its attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Row label. Not necessarily unique until the table is reindexed.
    pub index: usize,
    /// Outline geometry, if any.
    pub geometry: Option<Geometry<f64>>,
    /// One value per schema column, in schema order.
    pub values: Vec<Value>,
}

// ============================================================================
// Table
// ============================================================================

/// An ordered collection of glacier outlines sharing one schema and one CRS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineTable {
    schema: Schema,
    rows: Vec<Outline>,
    crs: Option<Crs>,
}

impl OutlineTable {
    /// Create an empty table with the given schema and no CRS.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            crs: None,
        }
    }

    /// Set the CRS, builder style.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Append a row whose values follow the schema order.
    ///
    /// The row label is the row's position at insertion time.
    pub fn push(&mut self, geometry: Option<Geometry<f64>>, values: Vec<Value>) -> Result<()> {
        if values.len() != self.schema.len() {
            return Err(OutlineError::RowWidth {
                expected: self.schema.len(),
                actual: values.len(),
            });
        }
        let index = self.rows.len();
        self.rows.push(Outline {
            index,
            geometry,
            values,
        });
        Ok(())
    }

    /// Append a row from named attributes.
    ///
    /// Unknown names become new columns (earlier rows get nulls); columns the
    /// row does not mention are null. Column kinds widen as values are seen.
    pub fn insert<K, I>(&mut self, geometry: Option<Geometry<f64>>, attributes: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut values = vec![Value::Null; self.schema.len()];

        for (name, value) in attributes {
            let name = name.into();
            let pos = match self.schema.position(&name) {
                Some(pos) => pos,
                None => {
                    let kind = value.kind().unwrap_or(crate::ValueKind::Mixed);
                    let pos = self.schema.push(ColumnDef::new(name.clone(), kind));
                    for row in &mut self.rows {
                        row.values.push(Value::Null);
                    }
                    values.push(Value::Null);
                    pos
                }
            };
            self.observe_kind(pos, &value);
            values[pos] = value;
        }

        let index = self.rows.len();
        self.rows.push(Outline {
            index,
            geometry,
            values,
        });
    }

    /// Widen a column's kind after seeing a value.
    ///
    /// A column created from a null starts as `Mixed` and narrows to the
    /// first concrete kind when no non-null value was seen yet.
    fn observe_kind(&mut self, pos: usize, value: &Value) {
        let Some(kind) = value.kind() else {
            return;
        };
        let seen_before = self
            .rows
            .iter()
            .any(|row| row.values.get(pos).is_some_and(|v| !v.is_null()));
        let column = &mut self.schema.columns_mut()[pos];
        column.kind = if seen_before {
            column.kind.merge(kind)
        } else {
            kind
        };
    }

    /// The table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable access to the schema.
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// The table CRS, if any.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Replace the CRS label. Coordinates are not touched.
    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Outline] {
        &self.rows
    }

    /// Mutable rows in order.
    pub fn rows_mut(&mut self) -> &mut [Outline] {
        &mut self.rows
    }

    /// Take the rows out of the table, leaving it empty.
    pub(crate) fn take_rows(&mut self) -> Vec<Outline> {
        std::mem::take(&mut self.rows)
    }

    /// Put back rows derived from [`OutlineTable::take_rows`] without changing their width.
    pub(crate) fn restore_rows(&mut self, rows: Vec<Outline>) {
        debug_assert!(rows.iter().all(|r| r.values.len() == self.schema.len()));
        self.rows = rows;
    }

    /// Keep only the rows for which the predicate returns true.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Outline) -> bool,
    {
        self.rows.retain(f);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of the named column in a row.
    ///
    /// Returns `None` if the column does not exist or the row is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let pos = self.schema.position(column)?;
        self.rows.get(row).and_then(|r| r.values.get(pos))
    }

    /// All values of the named column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let pos = self.schema.position(name)?;
        Some(self.rows.iter().map(|r| &r.values[pos]).collect())
    }

    /// Distinct labels of a categorical column, sorted.
    ///
    /// Returns `None` if the column is absent or not tagged categorical.
    pub fn categories(&self, name: &str) -> Option<Vec<String>> {
        let def = self.schema.get(name)?;
        if !def.categorical {
            return None;
        }
        let labels: BTreeSet<String> = self
            .column(name)?
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();
        Some(labels.into_iter().collect())
    }

    /// Bounding box over all row geometries.
    pub fn total_bounds(&self) -> Option<Rect<f64>> {
        self.rows
            .iter()
            .filter_map(|r| r.geometry.as_ref().and_then(|g| g.bounding_rect()))
            .reduce(|a, b| {
                let min = geo::coord! {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                };
                let max = geo::coord! {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                };
                Rect::new(min, max)
            })
    }

    /// Copy of this table restricted to the given row positions, in the given order.
    pub fn select(&self, positions: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: positions
                .iter()
                .filter_map(|&p| self.rows.get(p).cloned())
                .collect(),
            crs: self.crs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueKind;
    use geo::polygon;

    fn square(x: f64, y: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ])
    }

    #[test]
    fn test_crs_from_name() {
        assert_eq!(Crs::from_name("EPSG:4326"), Crs::Epsg(4326));
        assert_eq!(Crs::from_name("epsg:3413"), Crs::Epsg(3413));
        assert_eq!(Crs::from_name("urn:ogc:def:crs:EPSG::4326"), Crs::Epsg(4326));
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84"),
            Crs::Named("urn:ogc:def:crs:OGC:1.3:CRS84".to_string())
        );
    }

    #[test]
    fn test_crs_urn_roundtrip() {
        let crs = Crs::wgs84();
        assert_eq!(crs.to_urn(), "urn:ogc:def:crs:EPSG::4326");
        assert_eq!(Crs::from_name(&crs.to_urn()), crs);
        assert_eq!(crs.to_string(), "EPSG:4326");
    }

    #[test]
    fn test_insert_grows_schema() {
        let mut table = OutlineTable::default();
        table.insert(Some(square(0.0, 0.0)), [("glac_id", Value::from("G1"))]);
        table.insert(
            Some(square(1.0, 0.0)),
            [("area", Value::from(2.0)), ("glac_id", Value::from("G2"))],
        );

        assert_eq!(table.schema().names().collect::<Vec<_>>(), vec!["glac_id", "area"]);
        assert_eq!(table.value(0, "area"), Some(&Value::Null));
        assert_eq!(table.value(1, "glac_id"), Some(&Value::from("G2")));
        assert_eq!(table.rows()[1].index, 1);
    }

    #[test]
    fn test_insert_widens_kind() {
        let mut table = OutlineTable::default();
        table.insert(None, [("area", Value::Null)]);
        assert_eq!(table.schema().get("area").unwrap().kind, ValueKind::Mixed);
        table.insert(None, [("area", Value::from(3i64))]);
        assert_eq!(table.schema().get("area").unwrap().kind, ValueKind::Integer);
        table.insert(None, [("area", Value::from(3.5))]);
        assert_eq!(table.schema().get("area").unwrap().kind, ValueKind::Float);
    }

    #[test]
    fn test_push_checks_width() {
        let schema = Schema::from_columns([ColumnDef::new("glac_id", ValueKind::Text)]);
        let mut table = OutlineTable::new(schema);
        assert!(table.push(None, vec![]).is_err());
        assert!(table.push(None, vec![Value::from("G1")]).is_ok());
    }

    #[test]
    fn test_categories_require_tag() {
        let mut table = OutlineTable::default();
        table.insert(None, [("surge_type", Value::from("0"))]);
        table.insert(None, [("surge_type", Value::from("2"))]);
        table.insert(None, [("surge_type", Value::from("0"))]);
        assert_eq!(table.categories("surge_type"), None);

        table.schema_mut().get_mut("surge_type").unwrap().categorical = true;
        assert_eq!(
            table.categories("surge_type"),
            Some(vec!["0".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn test_total_bounds() {
        let mut table = OutlineTable::default();
        assert!(table.total_bounds().is_none());
        table.insert(Some(square(0.0, 0.0)), Vec::<(String, Value)>::new());
        table.insert(Some(square(5.0, -2.0)), Vec::<(String, Value)>::new());
        let bounds = table.total_bounds().unwrap();
        assert_eq!(bounds.min().x, 0.0);
        assert_eq!(bounds.min().y, -2.0);
        assert_eq!(bounds.max().x, 6.0);
        assert_eq!(bounds.max().y, 1.0);
    }
}
