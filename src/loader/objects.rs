use crate::error::Result;
use crate::loader::raw::{JsonObject, JsonObjectPoint, ShapeKeys};
use crate::map::ObjectCollection;
use crate::object::{MapObject, ObjectShape};
use macroquad::prelude::{vec2, Vec2};
use std::rc::Rc;

fn points(raw: Vec<JsonObjectPoint>) -> Vec<Vec2> {
    raw.into_iter().map(|p| vec2(p.x, p.y)).collect()
}

/// First match wins: tile reference, polyline, polygon, ellipse, then
/// rectangle.
fn classify(keys: ShapeKeys) -> ObjectShape {
    if let Some(gid) = keys.gid.filter(|&gid| gid != 0) {
        return ObjectShape::Tile { gid };
    }
    match (keys.polyline, keys.polygon) {
        (Some(line), _) => ObjectShape::Polyline(points(line)),
        (None, Some(poly)) => ObjectShape::Polygon(points(poly)),
        (None, None) if keys.ellipse => ObjectShape::Ellipse,
        (None, None) => ObjectShape::Rectangle,
    }
}

/// Classifies one object and moves it by `offset`.
pub(crate) fn object_to_map_object(obj: JsonObject, offset: Vec2) -> Result<MapObject> {
    let class_name = if obj.class.is_empty() {
        obj.legacy_class
    } else {
        obj.class
    };
    let bounds = obj.bounds;

    Ok(MapObject {
        id: obj.id,
        name: obj.name,
        class_name,
        x: bounds.x + offset.x,
        y: bounds.y + offset.y,
        width: bounds.width,
        height: bounds.height,
        rotation: obj.rotation,
        visible: obj.visible,
        shape: classify(obj.shape),
        properties: obj.properties.into_properties()?,
    })
}

/// Classifies a whole object group into the `objects` and `collision`
/// buckets named `key`. Both buckets exist afterwards, even when empty.
pub(crate) fn parse_object_group(
    raw: Vec<JsonObject>,
    key: &str,
    offset: Vec2,
    objects: &mut ObjectCollection,
    collision: &mut ObjectCollection,
) -> Result<()> {
    let collision_bucket = collision.entry(key.to_owned()).or_default();
    let object_bucket = objects.entry(key.to_owned()).or_default();

    for obj in raw {
        let obj = Rc::new(object_to_map_object(obj, offset)?);
        if obj.shape.is_collision() {
            collision_bucket.push(Rc::clone(&obj));
        }
        object_bucket.push(obj);
    }
    Ok(())
}
