use crate::error::Result;
use crate::loader::{parse_csv, parse_tiled_ref};
use crate::map::TilemapData;
use crate::options::DecodeOptions;
use anyhow::Context;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

/// Raw map content as handed over by an asset loader.
#[derive(Debug, Clone, PartialEq)]
pub enum MapSource {
    /// Comma separated grid text.
    Csv(String),
    /// Parsed Tiled JSON document.
    TiledJson(JsonValue),
}

/// Named raw map content. Decoding never touches the filesystem; only
/// [`MapCache::load_file`] does.
#[derive(Debug, Default)]
pub struct MapCache {
    entries: HashMap<String, MapSource>,
}

impl MapCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores CSV text under `key`.
    pub fn insert_csv(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), MapSource::Csv(text.into()));
    }

    /// Stores a parsed Tiled JSON document under `key`.
    pub fn insert_json(&mut self, key: impl Into<String>, doc: JsonValue) {
        self.entries.insert(key.into(), MapSource::TiledJson(doc));
    }

    /// Reads a `.json` or `.csv` file into the cache.
    pub fn load_file(&mut self, key: impl Into<String>, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("Reading map file {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let doc: JsonValue = serde_json::from_str(&txt)
                    .with_context(|| format!("Parsing map file {}", path.display()))?;
                self.insert_json(key, doc);
            }
            Some("csv") => self.insert_csv(key, txt),
            _ => anyhow::bail!("Map file must be a JSON or CSV file: {}", path.display()),
        }
        Ok(())
    }

    /// Raw content stored under `key`.
    pub fn get(&self, key: &str) -> Option<&MapSource> {
        self.entries.get(key)
    }

    /// Whether anything is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Decodes the entry stored under `key`.
    ///
    /// `Ok(None)` means nothing is stored under that key; a warning is
    /// logged. CSV entries use `tile_width` x `tile_height` cells, JSON
    /// entries carry their own sizes.
    pub fn parse(
        &self,
        key: &str,
        tile_width: u32,
        tile_height: u32,
        options: DecodeOptions,
    ) -> Result<Option<TilemapData>> {
        let Some(source) = self.entries.get(key) else {
            log::warn!("no map data found for key '{key}'");
            return Ok(None);
        };

        let map = match source {
            MapSource::Csv(text) => parse_csv(key, text, tile_width, tile_height)?,
            MapSource::TiledJson(doc) => parse_tiled_ref(doc, options)?,
        };
        Ok(Some(map))
    }
}
