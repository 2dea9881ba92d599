//! Format decoders.

mod csv_loader;
mod json_loader;
mod objects;
pub(crate) mod raw;
mod tile_stream;
mod tilesets;

pub use csv_loader::parse_csv;
pub(crate) use json_loader::parse_tiled_ref;
pub use json_loader::{parse_tiled_json, parse_tiled_value};
pub use tile_stream::{decode_base64_gids, gids_from_bytes};
