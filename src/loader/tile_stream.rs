//! Tile layer payloads: plain gid arrays and base64 packed little-endian
//! `u32` streams, turned into rows of cells.

use crate::error::{MapError, Result};
use crate::gid::TileGid;
use crate::loader::raw::JsonLayerData;
use crate::map::Cell;
use crate::options::EmptyCells;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Geometry shared by every cell of one layer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellShape {
    pub layer: usize,
    pub width: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

/// Raw gids of a tile layer, in stream order.
pub(crate) fn read_gids(
    layer: &str,
    data: Option<JsonLayerData>,
    encoding: Option<&str>,
) -> Result<Vec<u32>> {
    match (data, encoding) {
        (None, _) => Ok(Vec::new()),
        (Some(JsonLayerData::Gids(gids)), None | Some("csv") | Some("base64")) => Ok(gids),
        (Some(JsonLayerData::Encoded(payload)), Some("base64")) => decode_base64_gids(&payload)
            .map_err(|source| MapError::InvalidBase64 {
                layer: layer.to_owned(),
                source,
            }),
        (Some(_), other) => Err(MapError::UnsupportedEncoding {
            layer: layer.to_owned(),
            encoding: other.unwrap_or("none").to_owned(),
        }),
    }
}

/// Decodes a base64 payload into little-endian `u32` values. Whitespace in
/// the payload is ignored.
pub fn decode_base64_gids(payload: &str) -> std::result::Result<Vec<u32>, base64::DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(gids_from_bytes(&bytes))
}

/// Packs every 4 bytes into one unsigned little-endian value. A short
/// trailing group is zero-padded.
pub fn gids_from_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect()
}

/// Builds the slot for one raw gid at column `x`, row `y`.
pub(crate) fn decode_cell(raw: u32, x: u32, y: u32, shape: CellShape, empty: EmptyCells) -> Option<Cell> {
    let (gid, code) = TileGid(raw).split();

    if gid > 0 {
        let mut cell = Cell::new(shape.layer, i64::from(gid), x, y, shape.tile_width, shape.tile_height);
        let (rotation, flipped) = code.transform();
        cell.rotation = rotation;
        cell.flipped = flipped;
        if !code.is_none() {
            cell.flip_code = Some(code);
        }
        return Some(cell);
    }

    match empty {
        EmptyCells::Sentinel => Some(Cell::empty(shape.layer, x, y, shape.tile_width, shape.tile_height)),
        EmptyCells::Absent => None,
    }
}

/// Packs gids into rows of exactly `shape.width` slots. A trailing partial
/// row is dropped.
pub(crate) fn build_rows(gids: &[u32], shape: CellShape, empty: EmptyCells) -> Vec<Vec<Option<Cell>>> {
    if shape.width == 0 {
        return Vec::new();
    }
    gids.chunks_exact(shape.width as usize)
        .enumerate()
        .map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(|(x, &raw)| decode_cell(raw, x as u32, y as u32, shape, empty))
                .collect()
        })
        .collect()
}
