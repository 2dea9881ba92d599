#![warn(missing_docs)]
//! Tiled JSON & CSV tilemap decoder.
//!
//! Turns an editor-authored map into a [`TilemapData`] that rendering,
//! physics and gameplay code can consume without knowing the source format.
//! Decoding is a pure function of the raw document and [`DecodeOptions`];
//! fetching the document is left to the caller or to [`MapCache`].

mod cache;
mod error;
pub mod gid;
mod loader;
mod map;
mod object;
mod options;
mod properties;
mod tileset;

#[cfg(test)]
mod test_log;

pub use cache::{MapCache, MapSource};
pub use error::{MapError, Result};
pub use gid::{FlipCode, Rotation, TileGid};
pub use loader::{
    decode_base64_gids, gids_from_bytes, parse_csv, parse_tiled_json, parse_tiled_value,
};
pub use map::{Cell, ImageLayer, Layer, MapFormat, ObjectCollection, TilemapData};
pub use object::{MapObject, ObjectShape};
pub use options::{DecodeOptions, EmptyCells};
pub use properties::{Properties, PropertyValue};
pub use tileset::{
    build_tile_index, tile_layout, CollectionImage, ImageCollection, TileCoord, TileSource,
};
