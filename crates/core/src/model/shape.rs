use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise translation by `vector`.
    #[must_use]
    pub fn translated(self, vector: Point) -> Self {
        Self {
            x: self.x + vector.x,
            y: self.y + vector.y,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Abstract draw instruction for an external renderer.
///
/// All dimensions are in problem units; the renderer decides scale, layout
/// and labelling. The engine never interprets these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeDescriptor {
    Rectangle {
        width: u32,
        height: u32,
    },
    RightTriangle {
        base: u32,
        height: u32,
        /// Present when the hypotenuse should be labelled.
        hypotenuse: Option<u32>,
    },
    Circle {
        radius: u32,
    },
    Trapezoid {
        base_bottom: u32,
        base_top: u32,
        height: u32,
    },
    Translation {
        point: Point,
        vector: Point,
        image: Point,
    },
    CompositeL {
        outer_width: u32,
        outer_height: u32,
        cut_width: u32,
        cut_height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_display_matches_label_format() {
        assert_eq!(Point::new(-2, 7).to_string(), "(-2, 7)");
    }

    #[test]
    fn point_translation_adds_components() {
        let image = Point::new(1, -4).translated(Point::new(-3, 2));
        assert_eq!(image, Point::new(-2, -2));
    }

    #[test]
    fn descriptor_serializes_with_kind_tag() {
        let shape = ShapeDescriptor::Rectangle {
            width: 6,
            height: 4,
        };
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"kind\":\"rectangle\""));
        assert!(json.contains("\"width\":6"));
    }
}
