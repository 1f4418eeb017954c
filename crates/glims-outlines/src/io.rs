//! GeoJSON loading and saving for outline tables.
//!
//! Tables are read from and written to GeoJSON FeatureCollections. The
//! legacy top-level `crs` member, which GLIMS exports still carry, is
//! honored on read and emitted on write.

use crate::table::{Crs, OutlineTable};
use crate::value::Value;
use crate::{OutlineError, Result};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use serde_json::{json, Number};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Read a GeoJSON FeatureCollection file into a table.
pub fn read_geojson(path: impl AsRef<Path>) -> Result<OutlineTable> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let geojson = GeoJson::from_reader(reader)?;
    let table = from_geojson(geojson)?;
    debug!(
        "read_geojson[{}]: {} rows, {} columns",
        path.display(),
        table.len(),
        table.schema().len()
    );
    Ok(table)
}

/// Parse a GeoJSON FeatureCollection document into a table.
pub fn parse_geojson(text: &str) -> Result<OutlineTable> {
    let geojson: GeoJson = text.parse()?;
    from_geojson(geojson)
}

/// Write a table as a GeoJSON FeatureCollection file.
pub fn write_geojson(table: &OutlineTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &to_feature_collection(table)?)?;
    writer.flush()?;
    debug!("write_geojson[{}]: {} rows", path.display(), table.len());
    Ok(())
}

/// Serialize a table to a GeoJSON FeatureCollection string.
pub fn to_geojson_string(table: &OutlineTable) -> Result<String> {
    Ok(serde_json::to_string(&to_feature_collection(table)?)?)
}

fn from_geojson(geojson: GeoJson) -> Result<OutlineTable> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => return Err(OutlineError::NotFeatureCollection("Feature".into())),
        GeoJson::Geometry(_) => return Err(OutlineError::NotFeatureCollection("Geometry".into())),
    };

    let mut table = OutlineTable::default();
    table.set_crs(
        collection
            .foreign_members
            .as_ref()
            .and_then(crs_from_member),
    );

    for feature in collection.features {
        let geometry = match feature.geometry {
            Some(geometry) => Some(geo::Geometry::<f64>::try_from(geometry)?),
            None => None,
        };
        let attributes = feature
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value_from_json(value)));
        table.insert(geometry, attributes);
    }
    Ok(table)
}

/// Convert a table to a GeoJSON FeatureCollection.
///
/// Features carry every column as a property and no `id`.
pub fn to_feature_collection(table: &OutlineTable) -> Result<FeatureCollection> {
    let names: Vec<&str> = table.schema().names().collect();

    let features = table
        .rows()
        .iter()
        .map(|row| {
            let properties: JsonObject = names
                .iter()
                .zip(&row.values)
                .map(|(name, value)| (name.to_string(), value_to_json(value)))
                .collect();
            Feature {
                bbox: None,
                geometry: row
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let foreign_members = table.crs().map(|crs| {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": crs.to_urn() } }),
        );
        members
    });

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    })
}

/// CRS from a legacy `{"crs": {"type": "name", "properties": {"name": ...}}}` member.
fn crs_from_member(members: &JsonObject) -> Option<Crs> {
    members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(Crs::from_name)
}

fn value_from_json(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Text(s),
        // Nested values are kept as their JSON text.
        other => Value::Text(other.to_string()),
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Timestamp(ts) => JsonValue::String(ts.to_rfc3339()),
        Value::Text(s) => JsonValue::String(s.clone()),
    }
}
