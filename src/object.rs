use crate::gid::TileGid;
use crate::properties::Properties;
use macroquad::prelude::Vec2;

/// Geometry of an object-group entry. Computed once when the entry is
/// classified.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    /// A tile placed as a free object. `gid` is raw, flip flags included.
    Tile {
        /// Raw gid of the placed tile.
        gid: u32,
    },
    /// Open line strip, points relative to the object position.
    Polyline(Vec<Vec2>),
    /// Closed outline, points relative to the object position.
    Polygon(Vec<Vec2>),
    /// Ellipse inscribed in the object's bounding box.
    Ellipse,
    /// Axis aligned box. Also covers point objects.
    Rectangle,
}

impl ObjectShape {
    /// Polylines and polygons are the shapes used for collision.
    pub fn is_collision(&self) -> bool {
        matches!(self, ObjectShape::Polyline(_) | ObjectShape::Polygon(_))
    }
}

/// An object-group entry, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    /// Editor assigned id, 0 when absent.
    pub id: u32,
    /// Object name, empty when absent.
    pub name: String,
    /// `type` (or `class` in newer Tiled versions).
    pub class_name: String,
    /// Position with the owning group's offset already applied.
    pub x: f32,
    /// Vertical counterpart of `x`.
    pub y: f32,
    /// Bounding box width in pixels.
    pub width: f32,
    /// Bounding box height in pixels.
    pub height: f32,
    /// Clockwise rotation in degrees, when the document gives one.
    pub rotation: Option<f32>,
    /// Whether the object is shown.
    pub visible: bool,
    /// Classified geometry.
    pub shape: ObjectShape,
    /// Object properties.
    pub properties: Properties,
}

impl MapObject {
    /// Decoded gid of a tile object.
    pub fn tile_gid(&self) -> Option<TileGid> {
        match self.shape {
            ObjectShape::Tile { gid } => Some(TileGid(gid)),
            _ => None,
        }
    }

    /// Points of a polyline or polygon translated to map space.
    pub fn world_points(&self) -> Option<Vec<Vec2>> {
        match &self.shape {
            ObjectShape::Polyline(points) | ObjectShape::Polygon(points) => {
                let origin = Vec2::new(self.x, self.y);
                Some(points.iter().map(|p| *p + origin).collect())
            }
            _ => None,
        }
    }
}
