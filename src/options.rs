use serde::Deserialize;

/// How an empty slot of a tile layer is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCells {
    /// A [`Cell`](crate::Cell) with index `-1`. Keeps every slot addressable.
    #[default]
    Sentinel,
    /// No cell at all. Cheaper for sparse maps.
    Absent,
}

/// Knobs for a single decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Representation of empty tile slots.
    pub empty_cells: EmptyCells,
}

impl DecodeOptions {
    /// Options with empty slots left absent.
    pub fn absent_empty_cells() -> Self {
        Self {
            empty_cells: EmptyCells::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_sentinel_cells() {
        assert_eq!(DecodeOptions::default().empty_cells, EmptyCells::Sentinel);
    }

    #[test]
    fn reads_from_config_json() {
        let opts: DecodeOptions = serde_json::from_str(r#"{"empty_cells":"absent"}"#).unwrap();
        assert_eq!(opts, DecodeOptions::absent_empty_cells());

        let opts: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.empty_cells, EmptyCells::Sentinel);
    }
}
