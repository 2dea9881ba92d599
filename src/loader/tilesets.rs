use crate::error::{MapError, Result};
use crate::loader::raw::{JsonTile, JsonTiles, JsonTileset};
use crate::properties::Properties;
use crate::tileset::{CollectionImage, ImageCollection, TileSource};
use std::collections::HashMap;

/// Every tileset of a map, split by kind, in declaration order.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    pub tilesets: Vec<TileSource>,
    pub image_collections: Vec<ImageCollection>,
}

#[derive(Clone, Copy)]
enum Slot {
    Grid(usize),
    Images(usize),
}

impl Registry {
    fn close_range(&mut self, slot: Slot, next_first_gid: u32) {
        let last_gid = Some(next_first_gid.saturating_sub(1));
        match slot {
            Slot::Grid(i) => self.tilesets[i].last_gid = last_gid,
            Slot::Images(i) => self.image_collections[i].last_gid = last_gid,
        }
    }
}

/// Resolves the declared tilesets. Each one ends right before the next
/// declared `firstgid`; the final one stays open.
pub(crate) fn load_tilesets(raw: Vec<JsonTileset>) -> Result<Registry> {
    let mut registry = Registry::default();
    let mut previous: Option<Slot> = None;

    for mut set in raw {
        if let Some(source_file) = set.source.take() {
            return Err(MapError::ExternalTileset {
                firstgid: set.firstgid,
                source_file,
            });
        }

        let first_gid = set.firstgid;
        let slot = if set.image.is_some() {
            registry.tilesets.push(grid_tileset(set)?);
            Slot::Grid(registry.tilesets.len() - 1)
        } else if set.tiles.is_some() {
            registry.image_collections.push(image_collection(set)?);
            Slot::Images(registry.image_collections.len() - 1)
        } else {
            return Err(MapError::InvalidTileset { name: set.name });
        };

        if let Some(prev) = previous {
            registry.close_range(prev, first_gid);
        }
        previous = Some(slot);
    }

    if registry.tilesets.is_empty() && registry.image_collections.is_empty() {
        return Err(MapError::NoTilesets);
    }
    Ok(registry)
}

fn grid_tileset(set: JsonTileset) -> Result<TileSource> {
    let mut ts = TileSource::new(
        set.name,
        set.firstgid,
        set.tilewidth,
        set.tileheight,
        set.margin,
        set.spacing,
    );
    ts.image = set.image.unwrap_or_default();
    ts.properties = set.properties.into_properties()?;
    ts.update_tile_data(set.imagewidth, set.imageheight, set.tilecount)?;

    if let Some(columns) = set.columns {
        if columns != ts.columns {
            log::warn!(
                "tileset '{}': declares {} columns but its image holds {}",
                ts.name,
                columns,
                ts.columns
            );
        }
    }

    let mut tile_properties = HashMap::new();
    if let Some(legacy) = set.tileproperties {
        for (key, props) in legacy {
            match key.trim().parse::<u32>() {
                Ok(local) => {
                    tile_properties.insert(local, props.into_properties()?);
                }
                Err(_) => log::warn!("tileset '{}': ignoring tile properties for key '{key}'", ts.name),
            }
        }
    }
    if let Some(tiles) = set.tiles {
        for (local, tile) in tiles.into_indexed() {
            let props = tile.properties.into_properties()?;
            if !props.is_empty() {
                tile_properties
                    .entry(local)
                    .or_insert_with(Properties::new)
                    .fill_missing(&props);
            }
        }
    }
    ts.tile_properties = tile_properties;

    log::debug!(
        "tileset '{}': gids {}..{} on a {}x{} grid",
        ts.name,
        ts.first_gid,
        u64::from(ts.first_gid) + u64::from(ts.total),
        ts.columns,
        ts.rows
    );
    Ok(ts)
}

fn image_collection(set: JsonTileset) -> Result<ImageCollection> {
    let mut coll = ImageCollection::new(
        set.name,
        set.firstgid,
        set.tilewidth,
        set.tileheight,
        set.margin,
        set.spacing,
    );
    coll.properties = set.properties.into_properties()?;

    let tiles = set.tiles.map(JsonTiles::into_indexed).unwrap_or_default();
    for (local, JsonTile { image, imagewidth, imageheight, .. }) in tiles {
        let Some(image) = image else {
            log::warn!("image collection '{}': tile {local} has no image", coll.name);
            continue;
        };
        let gid = set.firstgid.checked_add(local).ok_or_else(|| MapError::SizeOverflow {
            what: format!("gid of tile {local} in image collection '{}'", coll.name),
        })?;
        coll.add_image(CollectionImage {
            gid,
            image,
            width: imagewidth,
            height: imageheight,
        });
    }
    Ok(coll)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(json: &str) -> Result<Registry> {
        let raw: Vec<JsonTileset> = serde_json::from_str(json).unwrap();
        load_tilesets(raw)
    }

    #[test]
    fn ranges_close_at_next_firstgid() {
        let reg = load(
            r#"[
                {"firstgid":1,"name":"a","image":"a.png","imagewidth":64,"imageheight":64,"tilewidth":32,"tileheight":32},
                {"firstgid":5,"name":"b","tiles":{"0":{"image":"x.png"},"1":{"image":"y.png"}}},
                {"firstgid":7,"name":"c","image":"c.png","imagewidth":32,"imageheight":32,"tilewidth":32,"tileheight":32}
            ]"#,
        )
        .unwrap();

        assert_eq!(reg.tilesets[0].last_gid, Some(4));
        assert_eq!(reg.image_collections[0].last_gid, Some(6));
        assert_eq!(reg.tilesets[1].last_gid, None);

        let gids: Vec<u32> = reg.image_collections[0].images.iter().map(|i| i.gid).collect();
        assert_eq!(gids, vec![5, 6]);
    }

    #[test]
    fn external_tileset_is_rejected() {
        let err = load(r#"[{"firstgid":1,"source":"tiles.tsx"}]"#).unwrap_err();
        assert!(matches!(err, MapError::ExternalTileset { firstgid: 1, .. }));
    }

    #[test]
    fn tileset_without_image_or_tiles_is_rejected() {
        let err = load(r#"[{"firstgid":1,"name":"ghost"}]"#).unwrap_err();
        assert!(matches!(err, MapError::InvalidTileset { ref name } if name == "ghost"));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(load("[]").unwrap_err(), MapError::NoTilesets));
    }

    #[test]
    fn tile_properties_from_both_encodings() {
        let reg = load(
            r#"[{
                "firstgid":1,"name":"a","image":"a.png","imagewidth":64,"imageheight":32,
                "tilewidth":32,"tileheight":32,
                "tileproperties":{"0":{"solid":true}},
                "tiles":[{"id":1,"properties":[{"name":"damage","type":"int","value":10}]}]
            }]"#,
        )
        .unwrap();

        let ts = &reg.tilesets[0];
        assert_eq!(ts.properties_for_gid(1).and_then(|p| p.get_bool("solid")), Some(true));
        assert_eq!(ts.properties_for_gid(2).and_then(|p| p.get_i64("damage")), Some(10));
        assert!(ts.properties_for_gid(3).is_none());
    }

    #[test]
    fn declared_columns_are_checked_against_the_image() {
        crate::test_log::install();
        let reg = load(
            r#"[{"firstgid":1,"name":"miscounted","image":"m.png","columns":5,
                "imagewidth":100,"imageheight":64,"tilewidth":32,"tileheight":32}]"#,
        )
        .unwrap();

        let ts = &reg.tilesets[0];
        assert_eq!((ts.columns, ts.rows, ts.total), (3, 2, 6));
        let warnings = crate::test_log::warnings_about("miscounted");
        assert!(warnings.iter().any(|w| w.contains("declares 5 columns but its image holds 3")));
        assert!(warnings.iter().any(|w| w.contains("not an even multiple")));
    }

    #[test]
    fn collection_gids_past_u32_are_an_error() {
        let err = load(
            r#"[{"firstgid":4294967295,"name":"tail",
                "tiles":[{"id":0,"image":"a.png"},{"id":1,"image":"b.png"}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MapError::SizeOverflow { ref what } if what.contains("tail")));

        let reg = load(r#"[{"firstgid":4294967295,"name":"last","tiles":[{"id":0,"image":"a.png"}]}]"#)
            .unwrap();
        assert_eq!(reg.image_collections[0].images[0].gid, u32::MAX);
    }

    #[test]
    fn image_collection_keeps_image_sizes() {
        let reg = load(
            r#"[{"firstgid":3,"name":"props","tilewidth":64,"tileheight":48,
                "tiles":[{"id":0,"image":"tree.png","imagewidth":64,"imageheight":48},
                         {"id":4,"image":"rock.png","imagewidth":16,"imageheight":16}]}]"#,
        )
        .unwrap();

        let coll = &reg.image_collections[0];
        assert_eq!(coll.max_width, 64);
        assert_eq!(coll.images[1].gid, 7);
        assert_eq!(coll.images[1].width, Some(16));
    }
}
