use crate::gid::{FlipCode, Rotation};
use crate::object::MapObject;
use crate::properties::Properties;
use crate::tileset::{ImageCollection, TileCoord, TileSource};
use std::collections::HashMap;
use std::rc::Rc;

/// Which decoder produced a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Comma separated grid.
    Csv,
    /// Tiled JSON document.
    TiledJson,
}

/// One slot of a tile layer grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Position of the owning layer in [`TilemapData::layers`].
    pub layer: usize,
    /// Global id with flags removed, `-1` when the slot is empty.
    pub index: i64,
    /// Column in cells.
    pub x: u32,
    /// Row in cells.
    pub y: u32,
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
    /// Clockwise rotation decoded from the flag bits.
    pub rotation: Rotation,
    /// Mirrored after rotation.
    pub flipped: bool,
    /// The original flag bits, kept only when at least one was set.
    pub flip_code: Option<FlipCode>,
    /// Per-tile properties stamped from the owning tileset.
    pub properties: Properties,
}

impl Cell {
    /// Unrotated, unflipped cell.
    pub fn new(layer: usize, index: i64, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            layer,
            index,
            x,
            y,
            width,
            height,
            rotation: Rotation::None,
            flipped: false,
            flip_code: None,
            properties: Properties::new(),
        }
    }

    /// Sentinel for an empty slot.
    pub fn empty(layer: usize, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(layer, -1, x, y, width, height)
    }

    /// Whether this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.index < 0
    }

    /// Left edge in pixels.
    pub fn world_x(&self) -> u64 {
        span(self.x, self.width)
    }

    /// Top edge in pixels.
    pub fn world_y(&self) -> u64 {
        span(self.y, self.height)
    }
}

/// A tile layer. `data` is row-major: `data.len() == height` and each row
/// holds `width` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer name, empty when the document gives none.
    pub name: String,
    /// Horizontal position in cells.
    pub x: i32,
    /// Vertical position in cells.
    pub y: i32,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// `width` times the map's tile width.
    pub width_in_pixels: u64,
    /// `height` times the map's tile height.
    pub height_in_pixels: u64,
    /// Opacity, 1.0 when not given.
    pub alpha: f32,
    /// Horizontal pixel offset, including enclosing groups.
    pub offset_x: f32,
    /// Vertical pixel offset, including enclosing groups.
    pub offset_y: f32,
    /// Whether the layer is shown.
    pub visible: bool,
    /// Layer properties.
    pub properties: Properties,
    /// Rows of slots. `None` marks an empty slot decoded with [`EmptyCells::Absent`].
    ///
    /// [`EmptyCells::Absent`]: crate::EmptyCells::Absent
    pub data: Vec<Vec<Option<Cell>>>,
}

impl Layer {
    /// Empty layer named `name` with no rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            width_in_pixels: 0,
            height_in_pixels: 0,
            alpha: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            visible: true,
            properties: Properties::new(),
            data: Vec::new(),
        }
    }

    /// Slot at column `x`, row `y`. `None` when out of bounds or absent.
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.data.get(y)?.get(x)?.as_ref()
    }

    /// Mutable slot access.
    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.data.get_mut(y)?.get_mut(x)?.as_mut()
    }

    /// Cells carrying a tile, in row-major order.
    pub fn placed_cells(&self) -> impl Iterator<Item = &Cell> {
        self.data
            .iter()
            .flatten()
            .filter_map(Option::as_ref)
            .filter(|cell| !cell.is_empty())
    }
}

/// An image layer, copied field by field from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    /// Layer name, empty when the document gives none.
    pub name: String,
    /// Image path as written in the document.
    pub image: String,
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
    /// Horizontal pixel offset, including enclosing groups.
    pub offset_x: f32,
    /// Vertical pixel offset, including enclosing groups.
    pub offset_y: f32,
    /// Opacity, 1.0 when not given.
    pub alpha: f32,
    /// Whether the layer is shown.
    pub visible: bool,
    /// Layer properties.
    pub properties: Properties,
}

/// Pixel length of `cells` cells of `size` pixels each.
pub(crate) fn span(cells: u32, size: u32) -> u64 {
    u64::from(cells) * u64::from(size)
}

/// Object group output keyed by group name.
pub type ObjectCollection = HashMap<String, Vec<Rc<MapObject>>>;

/// Engine-neutral decoded map.
#[derive(Debug, Clone, PartialEq)]
pub struct TilemapData {
    /// Cache key for CSV maps.
    pub name: Option<String>,
    /// Decoder that produced the map.
    pub format: MapFormat,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// `width * tile_width`, widened so large documents cannot overflow.
    pub width_in_pixels: u64,
    /// `height * tile_height`.
    pub height_in_pixels: u64,
    /// Always `orthogonal` for a decoded map.
    pub orientation: String,
    /// Document format version, numbers rendered as text.
    pub version: Option<String>,
    /// Map level properties.
    pub properties: Properties,
    /// Tile layers in declaration order.
    pub layers: Vec<Layer>,
    /// Image layers in declaration order.
    pub images: Vec<ImageLayer>,
    /// Grid tilesets in declaration order.
    pub tilesets: Vec<TileSource>,
    /// Image collection tilesets in declaration order.
    pub image_collections: Vec<ImageCollection>,
    /// Every object by group name.
    pub objects: ObjectCollection,
    /// Polylines and polygons by group name, shared with `objects`.
    pub collision: ObjectCollection,
    /// `tiles[gid]` is the source cell of a gid, `None` outside every tileset.
    pub tiles: Vec<Option<TileCoord>>,
}

impl TilemapData {
    /// A map with a single layer of `width` x `height` empty sentinel cells
    /// and no tilesets.
    pub fn empty(tile_width: u32, tile_height: u32, width: u32, height: u32) -> Self {
        let mut layer = Layer::new("layer");
        layer.width = width;
        layer.height = height;
        layer.width_in_pixels = span(width, tile_width);
        layer.height_in_pixels = span(height, tile_height);
        layer.data = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| Some(Cell::empty(0, x, y, tile_width, tile_height)))
                    .collect()
            })
            .collect();

        Self {
            name: None,
            format: MapFormat::TiledJson,
            width,
            height,
            tile_width,
            tile_height,
            width_in_pixels: span(width, tile_width),
            height_in_pixels: span(height, tile_height),
            orientation: "orthogonal".to_owned(),
            version: Some("1".to_owned()),
            properties: Properties::new(),
            layers: vec![layer],
            images: Vec::new(),
            tilesets: Vec::new(),
            image_collections: Vec::new(),
            objects: ObjectCollection::new(),
            collision: ObjectCollection::new(),
            tiles: Vec::new(),
        }
    }

    /// Tileset owning `gid` (flags removed), with the gid's local index.
    pub fn tile_source_for(&self, gid: u32) -> Option<(&TileSource, u32)> {
        let coord = self.tiles.get(gid as usize)?.as_ref()?;
        let source = self.tilesets.get(coord.source)?;
        Some((source, gid - source.first_gid))
    }

    /// Tile layer by name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_has_one_uniform_layer() {
        let map = TilemapData::empty(16, 8, 3, 2);
        assert_eq!(map.width_in_pixels, 48);
        assert_eq!(map.height_in_pixels, 16);
        assert_eq!(map.layers.len(), 1);

        let layer = &map.layers[0];
        assert_eq!(layer.data.len(), 2);
        assert!(layer.data.iter().all(|row| row.len() == 3));
        assert!(layer.data.iter().flatten().flatten().all(Cell::is_empty));
        assert_eq!(layer.placed_cells().count(), 0);
    }

    #[test]
    fn cell_lookup_is_bounds_checked() {
        let map = TilemapData::empty(16, 16, 2, 2);
        let layer = &map.layers[0];
        let cell = layer.cell(1, 1).unwrap();
        assert_eq!((cell.x, cell.y), (1, 1));
        assert_eq!((cell.world_x(), cell.world_y()), (16, 16));
        assert!(layer.cell(2, 0).is_none());
        assert!(layer.cell(0, 5).is_none());
    }

    #[test]
    fn pixel_sizes_do_not_wrap_at_32_bits() {
        let map = TilemapData::empty(70_000, 70_000, 70_000, 0);
        assert_eq!(map.width_in_pixels, 4_900_000_000);
        assert_eq!(map.layers[0].width_in_pixels, 4_900_000_000);

        let cell = Cell::new(0, 1, u32::MAX, u32::MAX, u32::MAX, 2);
        assert_eq!(cell.world_x(), u64::from(u32::MAX) * u64::from(u32::MAX));
        assert_eq!(cell.world_y(), u64::from(u32::MAX) * 2);
    }
}
