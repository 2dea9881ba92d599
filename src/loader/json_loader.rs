use crate::error::{MapError, Result};
use crate::loader::objects::parse_object_group;
use crate::loader::raw::{JsonLayer, JsonMap};
use crate::loader::tile_stream::{build_rows, read_gids, CellShape};
use crate::loader::tilesets::load_tilesets;
use crate::map::{span, ImageLayer, Layer, MapFormat, ObjectCollection, TilemapData};
use crate::options::DecodeOptions;
use crate::properties::Properties;
use crate::tileset::build_tile_index;
use macroquad::prelude::{vec2, Vec2};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Decodes a Tiled JSON document held as text.
pub fn parse_tiled_json(text: &str, options: DecodeOptions) -> Result<TilemapData> {
    let doc: JsonMap = serde_json::from_str(text)?;
    decode_map(doc, options)
}

/// Decodes an already parsed Tiled JSON document.
pub fn parse_tiled_value(value: JsonValue, options: DecodeOptions) -> Result<TilemapData> {
    let doc: JsonMap = serde_json::from_value(value)?;
    decode_map(doc, options)
}

/// Decodes a borrowed document, leaving the caller's copy in place.
pub(crate) fn parse_tiled_ref(value: &JsonValue, options: DecodeOptions) -> Result<TilemapData> {
    let doc = JsonMap::deserialize(value)?;
    decode_map(doc, options)
}

fn decode_map(j: JsonMap, options: DecodeOptions) -> Result<TilemapData> {
    if j.orientation != "orthogonal" {
        return Err(MapError::UnsupportedOrientation(j.orientation));
    }

    let version = j.version.map(|v| match v {
        JsonValue::String(s) => s,
        other => other.to_string(),
    });

    let mut map = TilemapData {
        name: None,
        format: MapFormat::TiledJson,
        width: j.width,
        height: j.height,
        tile_width: j.tilewidth,
        tile_height: j.tileheight,
        width_in_pixels: span(j.width, j.tilewidth),
        height_in_pixels: span(j.height, j.tileheight),
        orientation: j.orientation,
        version,
        properties: j.properties.into_properties()?,
        layers: Vec::new(),
        images: Vec::new(),
        tilesets: Vec::new(),
        image_collections: Vec::new(),
        objects: ObjectCollection::new(),
        collision: ObjectCollection::new(),
        tiles: Vec::new(),
    };

    let mut walk = LayerWalk {
        map: &mut map,
        options,
        seen: 0,
    };
    walk.layers(j.layers, Vec2::ZERO)?;

    let registry = load_tilesets(j.tilesets)?;
    map.tiles = build_tile_index(&registry.tilesets);
    map.tilesets = registry.tilesets;
    map.image_collections = registry.image_collections;

    stamp_tile_properties(&mut map);
    Ok(map)
}

/// Layer offset, warning when only one axis is given.
fn layer_offset(name: &str, x: Option<f32>, y: Option<f32>) -> Vec2 {
    if x.is_some() != y.is_some() {
        log::warn!("layer '{name}' has a partial offset ({x:?}, {y:?}), missing axis treated as 0");
    }
    vec2(x.unwrap_or(0.0), y.unwrap_or(0.0))
}

struct LayerWalk<'m> {
    map: &'m mut TilemapData,
    options: DecodeOptions,
    /// Layers visited so far, groups and their children included.
    seen: usize,
}

impl LayerWalk<'_> {
    /// Visits `layers` in declaration order; `parent` is the accumulated
    /// offset of enclosing groups.
    fn layers(&mut self, layers: Vec<JsonLayer>, parent: Vec2) -> Result<()> {
        for mut layer in layers {
            let position = self.seen;
            self.seen += 1;

            let name = layer.name.clone().unwrap_or_default();
            let offset = parent + layer_offset(&name, layer.offsetx, layer.offsety);

            let kind = std::mem::take(&mut layer.kind);
            match kind.as_str() {
                "tilelayer" => self.tile_layer(layer, name, offset)?,
                "imagelayer" => self.image_layer(layer, name, offset)?,
                "objectgroup" => self.object_group(layer, position, offset)?,
                "group" => self.layers(layer.layers, offset)?,
                other => log::warn!("skipping layer '{name}' of unsupported type '{other}'"),
            }
        }
        Ok(())
    }

    fn tile_layer(&mut self, layer: JsonLayer, name: String, offset: Vec2) -> Result<()> {
        if let Some(compression) = layer.compression.as_deref().filter(|c| !c.is_empty()) {
            log::warn!("layer compression '{compression}' is unsupported, skipping layer '{name}'");
            return Ok(());
        }

        let gids = read_gids(&name, layer.data, layer.encoding.as_deref())?;
        let shape = CellShape {
            layer: self.map.layers.len(),
            width: layer.width,
            tile_width: self.map.tile_width,
            tile_height: self.map.tile_height,
        };
        let data = build_rows(&gids, shape, self.options.empty_cells);
        log::debug!(
            "layer '{name}': {} gids into {} rows of {}",
            gids.len(),
            data.len(),
            layer.width
        );

        self.map.layers.push(Layer {
            name,
            x: layer.x,
            y: layer.y,
            width: layer.width,
            height: layer.height,
            width_in_pixels: span(layer.width, self.map.tile_width),
            height_in_pixels: span(layer.height, self.map.tile_height),
            alpha: layer.opacity,
            offset_x: offset.x,
            offset_y: offset.y,
            visible: layer.visible,
            properties: layer.properties.into_properties()?,
            data,
        });
        Ok(())
    }

    fn image_layer(&mut self, layer: JsonLayer, name: String, offset: Vec2) -> Result<()> {
        self.map.images.push(ImageLayer {
            name,
            image: layer.image.unwrap_or_default(),
            x: layer.x as f32,
            y: layer.y as f32,
            offset_x: offset.x,
            offset_y: offset.y,
            alpha: layer.opacity,
            visible: layer.visible,
            properties: layer.properties.into_properties()?,
        });
        Ok(())
    }

    fn object_group(&mut self, layer: JsonLayer, position: usize, offset: Vec2) -> Result<()> {
        let key = match layer.name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                let generated = format!("objectgroup_{position}");
                log::warn!("object group without a name, storing its objects under '{generated}'");
                generated
            }
        };

        parse_object_group(
            layer.objects,
            &key,
            offset,
            &mut self.map.objects,
            &mut self.map.collision,
        )
    }
}

/// Gives every placed cell the properties its tileset declares for it.
/// Properties already on the cell are kept.
fn stamp_tile_properties(map: &mut TilemapData) {
    let TilemapData {
        layers,
        tilesets,
        tiles,
        ..
    } = map;

    let cells = layers
        .iter_mut()
        .flat_map(|layer| layer.data.iter_mut())
        .flatten()
        .flatten();

    for cell in cells {
        let Ok(gid) = u32::try_from(cell.index) else {
            continue;
        };
        if gid == 0 {
            continue;
        }
        let Some(coord) = tiles.get(gid as usize).and_then(Option::as_ref) else {
            continue;
        };
        let tile_props: Option<&Properties> = tilesets
            .get(coord.source)
            .and_then(|set| set.properties_for_gid(gid));
        if let Some(props) = tile_props {
            cell.properties.fill_missing(props);
        }
    }
}
