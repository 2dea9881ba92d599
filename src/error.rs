use thiserror::Error;

/// Failure that aborts a whole decode.
///
/// Recoverable conditions (a compressed layer, a missing object group name)
/// never show up here; they are logged and decoding continues.
#[derive(Debug, Error)]
pub enum MapError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("failed to parse map JSON: {source}")]
    Json {
        /// Underlying parser error.
        #[from]
        source: serde_json::Error,
    },

    /// Only orthogonal maps are supported.
    #[error("unsupported map orientation '{0}', only 'orthogonal' maps can be decoded")]
    UnsupportedOrientation(String),

    /// The tileset lives in another file, which this decoder never reads.
    #[error("tileset at firstgid {firstgid} references external file '{source_file}', only embedded tilesets are supported")]
    ExternalTileset {
        /// First global id declared for the tileset.
        firstgid: u32,
        /// The referenced file.
        source_file: String,
    },

    /// The tileset has neither a single image nor an enumerated tile list.
    #[error("tileset '{name}' has neither an image nor a tile image list")]
    InvalidTileset {
        /// Tileset name.
        name: String,
    },

    /// The map declares no usable tileset.
    #[error("map declares no tilesets")]
    NoTilesets,

    /// A CSV token is not a base 10 integer.
    #[error("invalid tile id '{token}' in CSV map at row {row}, column {column}")]
    InvalidCsvCell {
        /// Zero based row.
        row: usize,
        /// Zero based column.
        column: usize,
        /// The offending token.
        token: String,
    },

    /// A base64 encoded tile layer could not be decoded.
    #[error("layer '{layer}' has malformed base64 tile data: {source}")]
    InvalidBase64 {
        /// Layer name.
        layer: String,
        /// Underlying decoder error.
        source: base64::DecodeError,
    },

    /// A tile layer uses an encoding other than csv or base64.
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'")]
    UnsupportedEncoding {
        /// Layer name.
        layer: String,
        /// Declared encoding.
        encoding: String,
    },

    /// A size or gid derived from the document does not fit in 32 bits.
    #[error("{what} does not fit in 32 bits")]
    SizeOverflow {
        /// What was being computed.
        what: String,
    },

    /// A property declares a type this decoder does not know.
    #[error("property '{name}' has unsupported type '{kind}'")]
    UnsupportedPropertyType {
        /// Property name.
        name: String,
        /// Declared type.
        kind: String,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MapError>;
