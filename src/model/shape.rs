//! Shape names offered when committing a polygon.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name given to a committed polygon.
///
/// The fixed vocabulary covers the shapes offered in the naming prompt;
/// anything else is kept verbatim as [`ShapeName::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeName {
    Rectangle,
    Triangle,
    Circle,
    Hexagon,
    Star,
    Arrow,
    Custom(String),
}

impl ShapeName {
    /// Display name for this shape.
    pub fn as_str(&self) -> &str {
        match self {
            ShapeName::Rectangle => "Rectangle",
            ShapeName::Triangle => "Triangle",
            ShapeName::Circle => "Circle",
            ShapeName::Hexagon => "Hexagon",
            ShapeName::Star => "Star",
            ShapeName::Arrow => "Arrow",
            ShapeName::Custom(name) => name,
        }
    }

    /// The fixed shape vocabulary, in prompt order.
    pub fn all() -> &'static [ShapeName] {
        &[
            ShapeName::Rectangle,
            ShapeName::Triangle,
            ShapeName::Circle,
            ShapeName::Hexagon,
            ShapeName::Star,
            ShapeName::Arrow,
        ]
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ShapeName::Custom(_))
    }
}

impl From<&str> for ShapeName {
    fn from(name: &str) -> Self {
        let trimmed = name.trim();
        ShapeName::all()
            .iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| ShapeName::Custom(trimmed.to_string()))
    }
}

impl From<String> for ShapeName {
    fn from(name: String) -> Self {
        ShapeName::from(name.as_str())
    }
}

impl From<ShapeName> for String {
    fn from(shape: ShapeName) -> Self {
        match shape {
            ShapeName::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ShapeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
