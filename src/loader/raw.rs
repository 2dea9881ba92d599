//! Serde shapes of a Tiled JSON document. Only the fields the decoder reads
//! are declared; everything else is ignored.

use crate::error::{MapError, Result};
use crate::properties::{Properties, PropertyKind, PropertyValue};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
pub(crate) struct JsonMap {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub orientation: String,
    pub layers: Vec<JsonLayer>,
    pub tilesets: Vec<JsonTileset>,
    #[serde(default)]
    pub properties: JsonProperties,
    #[serde(default)]
    pub version: Option<JsonValue>,
}

#[derive(Deserialize)]
pub(crate) struct JsonLayer {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub offsetx: Option<f32>,
    #[serde(default)]
    pub offsety: Option<f32>,
    #[serde(default)]
    pub properties: JsonProperties,
    // tilelayer
    #[serde(default)]
    pub data: Option<JsonLayerData>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
    // imagelayer
    #[serde(default)]
    pub image: Option<String>,
    // objectgroup
    #[serde(default)]
    pub objects: Vec<JsonObject>,
    // group
    #[serde(default)]
    pub layers: Vec<JsonLayer>,
}

/// Tile layer payload: plain gids or a base64 string.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonLayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

#[derive(Deserialize)]
pub(crate) struct JsonTileset {
    pub firstgid: u32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_tile_size")]
    pub tilewidth: u32,
    #[serde(default = "default_tile_size")]
    pub tileheight: u32,
    #[serde(default)]
    pub margin: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub imagewidth: u32,
    #[serde(default)]
    pub imageheight: u32,
    #[serde(default)]
    pub tilecount: Option<u32>,
    #[serde(default)]
    pub columns: Option<u32>,
    #[serde(default)]
    pub properties: JsonProperties,
    #[serde(default)]
    pub tileproperties: Option<HashMap<String, JsonProperties>>,
    #[serde(default)]
    pub tiles: Option<JsonTiles>,
}

fn default_tile_size() -> u32 {
    32
}

/// `tiles` of a tileset: a list with explicit ids, or the legacy object
/// keyed by local index.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonTiles {
    List(Vec<JsonTile>),
    Keyed(HashMap<String, JsonTile>),
}

impl JsonTiles {
    /// `(local index, tile)` pairs sorted by index. Keys that are not
    /// integers are dropped.
    pub fn into_indexed(self) -> Vec<(u32, JsonTile)> {
        let mut tiles: Vec<(u32, JsonTile)> = match self {
            JsonTiles::List(list) => list
                .into_iter()
                .enumerate()
                .map(|(pos, tile)| (tile.id.unwrap_or(pos as u32), tile))
                .collect(),
            JsonTiles::Keyed(map) => map
                .into_iter()
                .filter_map(|(key, tile)| match key.trim().parse::<u32>() {
                    Ok(id) => Some((id, tile)),
                    Err(_) => {
                        log::warn!("ignoring tileset tile with non-numeric key '{key}'");
                        None
                    }
                })
                .collect(),
        };
        tiles.sort_by_key(|(id, _)| *id);
        tiles
    }
}

#[derive(Deserialize)]
pub(crate) struct JsonTile {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub imagewidth: Option<u32>,
    #[serde(default)]
    pub imageheight: Option<u32>,
    #[serde(default)]
    pub properties: JsonProperties,
}

/// One object-group record. The keys that decide its geometry are kept
/// apart in [`ShapeKeys`].
#[derive(Deserialize)]
pub(crate) struct JsonObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Pre-1.9 name of `class`.
    #[serde(default, rename = "type")]
    pub legacy_class: String,
    #[serde(default)]
    pub class: String,
    #[serde(flatten)]
    pub bounds: ObjectBounds,
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(flatten)]
    pub shape: ShapeKeys,
    #[serde(default)]
    pub properties: JsonProperties,
}

#[derive(Deserialize, Default)]
pub(crate) struct ObjectBounds {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

/// Geometry keys of an object. Editors may write more than one.
#[derive(Deserialize, Default)]
pub(crate) struct ShapeKeys {
    #[serde(default)]
    pub gid: Option<u32>,
    #[serde(default)]
    pub polyline: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    pub polygon: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    pub ellipse: bool,
}

#[derive(Deserialize)]
pub(crate) struct JsonObjectPoint {
    pub x: f32,
    pub y: f32,
}

/// Entry of the list encoding: `{"name", "type", "value"}`.
#[derive(Deserialize)]
pub(crate) struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    value: JsonValue,
}

impl JsonProperty {
    /// The named value, or `None` when the value does not match its
    /// declared type. An undeclared type is inferred from the value.
    fn into_entry(self) -> Result<Option<(String, PropertyValue)>> {
        let value = match self.type_name.as_deref() {
            None => PropertyValue::infer(&self.value),
            Some(type_name) => PropertyKind::from_type_name(type_name)
                .ok_or_else(|| MapError::UnsupportedPropertyType {
                    name: self.name.clone(),
                    kind: type_name.to_owned(),
                })?
                .read(&self.value),
        };
        Ok(value.map(|value| (self.name, value)))
    }
}

/// Properties in either Tiled encoding.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonProperties {
    List(Vec<JsonProperty>),
    Keyed(serde_json::Map<String, JsonValue>),
}

impl Default for JsonProperties {
    fn default() -> Self {
        JsonProperties::List(Vec::new())
    }
}

impl JsonProperties {
    /// Typed properties. Entries whose value does not fit their type are
    /// dropped; an unknown declared type fails the whole decode.
    pub fn into_properties(self) -> Result<Properties> {
        match self {
            JsonProperties::List(list) => list
                .into_iter()
                .filter_map(|prop| prop.into_entry().transpose())
                .collect(),
            JsonProperties::Keyed(map) => Ok(map
                .into_iter()
                .filter_map(|(name, value)| Some((name, PropertyValue::infer(&value)?)))
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_list_form() {
        let props: JsonProperties = serde_json::from_str(
            r#"[
                {"name":"is_night","type":"bool","value":true},
                {"name":"gravity","type":"float","value":9.8},
                {"name":"theme","type":"string","value":"forest"},
                {"name":"big_id","type":"object","value":5000000000}
            ]"#,
        )
        .unwrap();
        let props = props.into_properties().unwrap();

        assert_eq!(props.get_bool("is_night"), Some(true));
        assert_eq!(props.get_f32("gravity"), Some(9.8));
        assert_eq!(props.get_string("theme"), Some("forest"));
        assert_eq!(props.get_i64("big_id"), Some(5_000_000_000));
    }

    #[test]
    fn properties_keyed_form_infers_types() {
        let props: JsonProperties =
            serde_json::from_str(r#"{"solid": true, "hp": 3, "speed": 1.5, "label": "x", "skip": null}"#)
                .unwrap();
        let props = props.into_properties().unwrap();

        assert_eq!(props.get_bool("solid"), Some(true));
        assert_eq!(props.get_i64("hp"), Some(3));
        assert_eq!(props.get_f32("speed"), Some(1.5));
        assert_eq!(props.get_string("label"), Some("x"));
        assert!(!props.contains("skip"));
    }

    #[test]
    fn unknown_property_type_is_an_error() {
        let props: JsonProperties =
            serde_json::from_str(r#"[{"name":"mystery","type":"not_supported","value":"x"}]"#).unwrap();
        let err = props.into_properties().unwrap_err();
        assert!(matches!(err, MapError::UnsupportedPropertyType { .. }));
    }

    #[test]
    fn mistyped_list_entries_are_dropped() {
        let props: JsonProperties = serde_json::from_str(
            r#"[{"name":"hp","type":"int","value":"lots"},{"name":"ok","value":true}]"#,
        )
        .unwrap();
        let props = props.into_properties().unwrap();
        assert!(!props.contains("hp"));
        assert_eq!(props.get_bool("ok"), Some(true));
    }

    #[test]
    fn object_keys_split_into_bounds_and_shape() {
        let obj: JsonObject = serde_json::from_str(
            r#"{"id":3,"type":"npc","x":4,"y":5,"width":16,"height":8,"gid":7,"ellipse":true}"#,
        )
        .unwrap();
        assert_eq!(obj.legacy_class, "npc");
        assert_eq!((obj.bounds.x, obj.bounds.y, obj.bounds.width, obj.bounds.height), (4.0, 5.0, 16.0, 8.0));
        assert_eq!(obj.shape.gid, Some(7));
        assert!(obj.shape.ellipse);
        assert!(obj.shape.polygon.is_none());
        assert!(obj.visible);
    }

    #[test]
    fn keyed_tiles_sort_numerically() {
        let tiles: JsonTiles = serde_json::from_str(
            r#"{"10": {"image": "c.png"}, "2": {"image": "b.png"}, "0": {"image": "a.png"}}"#,
        )
        .unwrap();
        let ids: Vec<u32> = tiles.into_indexed().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 2, 10]);
    }

    #[test]
    fn layer_data_accepts_both_forms() {
        let plain: JsonLayerData = serde_json::from_str("[1, 2, 3]").unwrap();
        assert!(matches!(plain, JsonLayerData::Gids(ref v) if v == &[1, 2, 3]));

        let packed: JsonLayerData = serde_json::from_str(r#""AQAAAA==""#).unwrap();
        assert!(matches!(packed, JsonLayerData::Encoded(_)));
    }
}
