use crate::error::{MapError, Result};
use crate::properties::Properties;
use std::collections::HashMap;

/// Number of distinct gids, flag bits aside, that a map can address.
const GID_SPACE: u64 = 1 << 32;

/// Source pixel cell of a gid: top-left corner inside the tileset image and
/// the position of the tileset in [`TilemapData::tilesets`](crate::TilemapData::tilesets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    /// Left edge of the cell in the tileset image.
    pub x: u32,
    /// Top edge of the cell in the tileset image.
    pub y: u32,
    /// Index of the owning tileset.
    pub source: usize,
}

/// A tileset cut from one image on a uniform grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// Tileset name.
    pub name: String,
    /// Gid of the first cell.
    pub first_gid: u32,
    /// Last gid before the next declared tileset, `None` for the final one.
    pub last_gid: Option<u32>,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// Border around the whole grid, in pixels.
    pub margin: u32,
    /// Gap between neighbouring cells, in pixels.
    pub spacing: u32,
    /// Image path as written in the document.
    pub image: String,
    /// Image width in pixels.
    pub image_width: u32,
    /// Image height in pixels.
    pub image_height: u32,
    /// Cells per row.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Number of usable cells.
    pub total: u32,
    /// Tileset level properties.
    pub properties: Properties,
    /// Per-tile properties keyed by local index.
    pub tile_properties: HashMap<u32, Properties>,
}

impl TileSource {
    /// Tileset with no grid yet. Call [`TileSource::update_tile_data`] once
    /// the image size is known.
    pub fn new(
        name: impl Into<String>,
        first_gid: u32,
        tile_width: u32,
        tile_height: u32,
        margin: u32,
        spacing: u32,
    ) -> Self {
        Self {
            name: name.into(),
            first_gid,
            last_gid: None,
            tile_width,
            tile_height,
            margin,
            spacing,
            image: String::new(),
            image_width: 0,
            image_height: 0,
            columns: 0,
            rows: 0,
            total: 0,
            properties: Properties::new(),
            tile_properties: HashMap::new(),
        }
    }

    /// Derives `columns`, `rows` and `total` from the image size.
    ///
    /// `declared_count` clamps `total` when the last row is only partly used.
    /// Fails when the cells would run past the last addressable gid.
    pub fn update_tile_data(
        &mut self,
        image_width: u32,
        image_height: u32,
        declared_count: Option<u32>,
    ) -> Result<()> {
        self.image_width = image_width;
        self.image_height = image_height;

        let columns = grid_extent(image_width, self.margin, self.spacing, self.tile_width);
        let rows = grid_extent(image_height, self.margin, self.spacing, self.tile_height);
        if columns.uneven || rows.uneven {
            log::warn!(
                "tileset '{}': image tile area is not an even multiple of the tile size",
                self.name
            );
        }

        self.columns = columns.count;
        self.rows = rows.count;

        let mut total = u64::from(self.columns) * u64::from(self.rows);
        if let Some(count) = declared_count {
            total = total.min(u64::from(count));
        }
        let fits = u64::from(self.first_gid) + total <= GID_SPACE;
        self.total = match u32::try_from(total) {
            Ok(total) if fits => total,
            _ => {
                return Err(MapError::SizeOverflow {
                    what: format!("gid range of tileset '{}' ({total} tiles)", self.name),
                })
            }
        };
        Ok(())
    }

    /// Whether `gid` falls in this tileset's usable range.
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.total
    }

    /// Properties declared for the tile at `gid`.
    pub fn properties_for_gid(&self, gid: u32) -> Option<&Properties> {
        let local = gid.checked_sub(self.first_gid)?;
        self.tile_properties.get(&local)
    }

    /// Pixel origins of every usable cell, row-major.
    pub fn layout(&self) -> impl Iterator<Item = (u32, u32)> {
        tile_layout(
            self.margin,
            self.spacing,
            self.tile_width,
            self.tile_height,
            self.columns,
            self.rows,
            self.total,
        )
    }
}

struct Extent {
    count: u32,
    uneven: bool,
}

fn grid_extent(image: u32, margin: u32, spacing: u32, tile: u32) -> Extent {
    let step = i64::from(tile) + i64::from(spacing);
    let usable = i64::from(image) - 2 * i64::from(margin) + i64::from(spacing);
    if step <= 0 || usable <= 0 {
        return Extent {
            count: 0,
            uneven: usable != 0,
        };
    }
    Extent {
        count: u32::try_from(usable / step).unwrap_or(u32::MAX),
        uneven: usable % step != 0,
    }
}

/// Top-left pixel of each cell in a gridded tileset, row-major, starting at
/// `(margin, margin)`. Ends after `total` cells or `rows` full rows.
/// Coordinates past `u32::MAX` saturate.
pub fn tile_layout(
    margin: u32,
    spacing: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
    total: u32,
) -> impl Iterator<Item = (u32, u32)> {
    let step_x = tile_width.saturating_add(spacing);
    let step_y = tile_height.saturating_add(spacing);
    (0..rows)
        .flat_map(move |row| {
            let y = margin.saturating_add(row.saturating_mul(step_y));
            (0..columns).map(move |col| (margin.saturating_add(col.saturating_mul(step_x)), y))
        })
        .take(total as usize)
}

/// One entry of an image collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionImage {
    /// Global id of the image.
    pub gid: u32,
    /// Image path as written in the document.
    pub image: String,
    /// Declared image width.
    pub width: Option<u32>,
    /// Declared image height.
    pub height: Option<u32>,
}

/// A tileset made of individually sized images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection {
    /// Tileset name.
    pub name: String,
    /// Gid of the first image.
    pub first_gid: u32,
    /// Last gid before the next declared tileset, `None` for the final one.
    pub last_gid: Option<u32>,
    /// Largest image width, as declared by the tileset.
    pub max_width: u32,
    /// Largest image height.
    pub max_height: u32,
    /// Declared margin, unused by the images themselves.
    pub margin: u32,
    /// Declared spacing, unused by the images themselves.
    pub spacing: u32,
    /// Tileset level properties.
    pub properties: Properties,
    /// Images in ascending local id order.
    pub images: Vec<CollectionImage>,
}

impl ImageCollection {
    /// Collection with no images.
    pub fn new(
        name: impl Into<String>,
        first_gid: u32,
        max_width: u32,
        max_height: u32,
        margin: u32,
        spacing: u32,
    ) -> Self {
        Self {
            name: name.into(),
            first_gid,
            last_gid: None,
            max_width,
            max_height,
            margin,
            spacing,
            properties: Properties::new(),
            images: Vec::new(),
        }
    }

    /// Number of images.
    pub fn total(&self) -> u32 {
        self.images.len() as u32
    }

    /// Appends an image.
    pub fn add_image(&mut self, image: CollectionImage) {
        self.images.push(image);
    }

    /// Whether `gid` falls within `first_gid..first_gid + total()`.
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.total()
    }

    /// Image registered for `gid`.
    pub fn image_for_gid(&self, gid: u32) -> Option<&CollectionImage> {
        self.images.iter().find(|img| img.gid == gid)
    }
}

/// Flat `gid -> TileCoord` table over every gridded tileset. Later tilesets
/// win when ranges overlap.
pub fn build_tile_index(tilesets: &[TileSource]) -> Vec<Option<TileCoord>> {
    let len = tilesets
        .iter()
        .map(|t| t.first_gid as usize + t.total as usize)
        .max()
        .unwrap_or(0);
    let mut tiles = vec![None; len];

    for (source, set) in tilesets.iter().enumerate() {
        for (gid, (x, y)) in (set.first_gid as usize..).zip(set.layout()) {
            tiles[gid] = Some(TileCoord { x, y, source });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(first_gid: u32, w: u32, h: u32) -> TileSource {
        let mut ts = TileSource::new("sheet", first_gid, 32, 32, 0, 0);
        ts.update_tile_data(w, h, None).unwrap();
        ts
    }

    #[test]
    fn grid_from_image_size() {
        let ts = sheet(1, 128, 96);
        assert_eq!((ts.columns, ts.rows, ts.total), (4, 3, 12));
    }

    #[test]
    fn margin_and_spacing_shrink_the_grid() {
        let mut ts = TileSource::new("spaced", 1, 16, 16, 1, 2);
        // 1 + 16 + 2 + 16 + 2 + 16 + 1 = 54
        ts.update_tile_data(54, 37, None).unwrap();
        assert_eq!((ts.columns, ts.rows), (3, 2));

        let coords: Vec<_> = ts.layout().collect();
        assert_eq!(coords[0], (1, 1));
        assert_eq!(coords[1], (19, 1));
        assert_eq!(coords[3], (1, 19));
    }

    #[test]
    fn fifth_tile_starts_second_row() {
        let coords: Vec<_> = tile_layout(0, 0, 32, 32, 4, 3, 12).collect();
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[4], (0, 32));
        assert_eq!(coords[11], (96, 64));
    }

    #[test]
    fn declared_count_clamps_total() {
        let mut ts = TileSource::new("partial", 1, 32, 32, 0, 0);
        ts.update_tile_data(128, 96, Some(10)).unwrap();
        assert_eq!(ts.total, 10);
        assert_eq!(ts.layout().count(), 10);
        assert!(ts.contains_gid(10));
        assert!(!ts.contains_gid(11));
    }

    #[test]
    fn uneven_image_is_reported_and_rounded_down() {
        crate::test_log::install();
        let mut ts = TileSource::new("ragged_sheet", 1, 32, 32, 0, 0);
        ts.update_tile_data(100, 70, None).unwrap();

        assert_eq!((ts.columns, ts.rows, ts.total), (3, 2, 6));
        let warnings = crate::test_log::warnings_about("ragged_sheet");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not an even multiple"));
    }

    #[test]
    fn grid_past_the_gid_space_is_an_error() {
        let mut ts = TileSource::new("huge", 1, 1, 1, 0, 0);
        let err = ts.update_tile_data(70_000, 70_000, None).unwrap_err();
        assert!(matches!(err, MapError::SizeOverflow { ref what } if what.contains("huge")));

        let mut ts = TileSource::new("edge", u32::MAX, 1, 1, 0, 0);
        ts.update_tile_data(1, 1, None).unwrap();
        assert_eq!(ts.total, 1);
        assert!(ts.update_tile_data(2, 1, None).is_err());
    }

    #[test]
    fn layout_saturates_instead_of_wrapping() {
        let coords: Vec<_> = tile_layout(0, 5, u32::MAX, 1, 2, 1, 2).collect();
        assert_eq!(coords, vec![(0, 0), (u32::MAX, 0)]);
    }

    #[test]
    fn tiny_image_yields_no_cells() {
        let ts = sheet(1, 16, 16);
        assert_eq!(ts.total, 0);
        assert!(build_tile_index(&[ts]).iter().all(Option::is_none));
    }

    #[test]
    fn index_maps_gids_to_source_pixels() {
        let a = sheet(1, 64, 32); // 2 tiles
        let b = sheet(3, 32, 64); // 2 tiles
        let tiles = build_tile_index(&[a, b]);

        assert_eq!(tiles.len(), 5);
        assert_eq!(tiles[0], None);
        assert_eq!(tiles[2], Some(TileCoord { x: 32, y: 0, source: 0 }));
        assert_eq!(tiles[4], Some(TileCoord { x: 0, y: 32, source: 1 }));
    }

    #[test]
    fn image_collection_ranges() {
        let mut coll = ImageCollection::new("props", 10, 64, 64, 0, 0);
        coll.add_image(CollectionImage {
            gid: 10,
            image: "tree.png".into(),
            width: Some(64),
            height: Some(48),
        });
        coll.add_image(CollectionImage {
            gid: 11,
            image: "rock.png".into(),
            width: None,
            height: None,
        });

        assert_eq!(coll.total(), 2);
        assert!(coll.contains_gid(11));
        assert!(!coll.contains_gid(12));
        assert_eq!(coll.image_for_gid(11).map(|i| i.image.as_str()), Some("rock.png"));
    }
}
