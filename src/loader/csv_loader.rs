use crate::error::{MapError, Result};
use crate::map::{span, Cell, MapFormat, TilemapData};

/// Decodes a comma separated grid into a single-layer map.
///
/// Rows are split on line breaks and cells on commas. The map width is the
/// first row's length; later rows keep whatever length they have.
pub fn parse_csv(key: &str, text: &str, tile_width: u32, tile_height: u32) -> Result<TilemapData> {
    let mut map = TilemapData::empty(tile_width, tile_height, 0, 0);

    let mut data = Vec::new();
    for (y, line) in text.trim().lines().enumerate() {
        let row = line
            .split(',')
            .enumerate()
            .map(|(x, token)| -> Result<Option<Cell>> {
                let index = token.trim().parse::<i64>().map_err(|_| MapError::InvalidCsvCell {
                    row: y,
                    column: x,
                    token: token.to_owned(),
                })?;
                Ok(Some(Cell::new(0, index, x as u32, y as u32, tile_width, tile_height)))
            })
            .collect::<Result<Vec<_>>>()?;
        data.push(row);
    }

    let height = data.len() as u32;
    let width = data.first().map_or(0, |row| row.len() as u32);

    map.name = Some(key.to_owned());
    map.format = MapFormat::Csv;
    map.width = width;
    map.height = height;
    map.width_in_pixels = span(width, tile_width);
    map.height_in_pixels = span(height, tile_height);

    let layer = &mut map.layers[0];
    layer.width = width;
    layer.height = height;
    layer.width_in_pixels = span(width, tile_width);
    layer.height_in_pixels = span(height, tile_height);
    layer.data = data;

    log::debug!("csv map '{key}': {width}x{height} cells");
    Ok(map)
}
