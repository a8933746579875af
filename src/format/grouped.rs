//! Grouped annotation document.
//!
//! The per-image JSON document written by the editor and by the external
//! segmentation model:
//!
//! ```json
//! {
//!   "imageName": "frame_000002.jpg",
//!   "classes": [
//!     {
//!       "className": "1",
//!       "instances": [
//!         { "instanceId": "Star-1", "name": "Star", "coordinates": [[10, 10], [50, 10], [30, 40]] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Classes are polygon groups. Within a class, instances are numbered per
//! name starting at 1. Coordinates are whole image pixels.

use serde::{Deserialize, Deserializer, Serialize};

use crate::format::error::FormatError;
use crate::geometry::Point;
use crate::model::{Group, Polygon, PolygonSeed, ShapeName};

/// Annotations for one image, grouped by class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotations {
    pub image_name: String,
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
}

/// All instances of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntry {
    pub class_name: String,
    #[serde(default)]
    pub instances: Vec<InstanceEntry>,
}

/// One polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceEntry {
    /// `<name>-<n>`, numbered per name within the class.
    pub instance_id: String,
    pub name: String,
    #[serde(deserialize_with = "round_coordinates")]
    pub coordinates: Vec<[i32; 2]>,
}

impl InstanceEntry {
    /// The running number part of the instance id.
    pub fn ordinal(&self) -> &str {
        self.instance_id
            .rsplit_once('-')
            .map(|(_, n)| n)
            .unwrap_or(&self.instance_id)
    }
}

/// Accept integer or fractional coordinates and round them to whole pixels.
fn round_coordinates<'de, D>(deserializer: D) -> Result<Vec<[i32; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<[f64; 2]>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|[x, y]| Ok([round_component(x)?, round_component(y)?]))
        .collect()
}

fn round_component<E: serde::de::Error>(value: f64) -> Result<i32, E> {
    let rounded = value.round();
    if rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Ok(rounded as i32)
    } else {
        Err(E::custom(format!("coordinate {} out of range", value)))
    }
}

fn round_point(point: &Point) -> [i32; 2] {
    [point.x.round() as i32, point.y.round() as i32]
}

impl ImageAnnotations {
    /// Empty document for an image.
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            classes: Vec::new(),
        }
    }

    /// Group polygons into classes and numbered instances.
    ///
    /// Classes appear in order of their first polygon. Within a class,
    /// instances are listed name by name (in order of first appearance) and
    /// numbered from 1 per name.
    pub fn from_polygons<'a>(
        image_name: impl Into<String>,
        polygons: impl IntoIterator<Item = &'a Polygon>,
    ) -> Self {
        // class -> [(name, [outline])]
        let mut grouped: Vec<(&Group, Vec<(&ShapeName, Vec<&[Point]>)>)> = Vec::new();
        for polygon in polygons {
            let index = match grouped.iter().position(|(g, _)| *g == &polygon.group) {
                Some(i) => i,
                None => {
                    grouped.push((&polygon.group, Vec::new()));
                    grouped.len() - 1
                }
            };
            let class = &mut grouped[index].1;
            match class.iter_mut().find(|(n, _)| *n == &polygon.name) {
                Some((_, outlines)) => outlines.push(polygon.points.as_slice()),
                None => class.push((&polygon.name, vec![polygon.points.as_slice()])),
            }
        }

        let classes = grouped
            .into_iter()
            .map(|(group, names)| ClassEntry {
                class_name: group.to_string(),
                instances: names
                    .into_iter()
                    .flat_map(|(name, outlines)| {
                        outlines
                            .into_iter()
                            .enumerate()
                            .map(move |(i, points)| InstanceEntry {
                                instance_id: format!("{}-{}", name, i + 1),
                                name: name.to_string(),
                                coordinates: points.iter().map(round_point).collect(),
                            })
                    })
                    .collect(),
            })
            .collect();

        Self {
            image_name: image_name.into(),
            classes,
        }
    }

    /// Number of instances across all classes.
    pub fn instance_count(&self) -> usize {
        self.classes.iter().map(|c| c.instances.len()).sum()
    }

    /// Convert back into store seeds, one per instance, in document order.
    pub fn to_seeds(&self) -> Vec<PolygonSeed> {
        self.classes
            .iter()
            .flat_map(|class| {
                class.instances.iter().map(|instance| PolygonSeed {
                    name: ShapeName::from(instance.name.as_str()),
                    group: Group::new(class.class_name.as_str()),
                    points: instance
                        .coordinates
                        .iter()
                        .map(|[x, y]| Point::new(*x as f32, *y as f32))
                        .collect(),
                })
            })
            .collect()
    }

    /// Human-readable listing of the document.
    pub fn to_text(&self) -> String {
        let mut output = format!("Image name: {}\n\n", self.image_name);
        for class in &self.classes {
            output.push_str(&format!("Class name: {}\n", class.class_name));
            for instance in &class.instances {
                output.push_str(&format!(
                    "- instance {} ({})\n",
                    instance.ordinal(),
                    instance.name
                ));
                output.push_str("      Point coordinates:\n");
                for [x, y] in &instance.coordinates {
                    output.push_str(&format!("      [{}, {}]\n", x, y));
                }
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }

    /// Serialize with pretty printing.
    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a document.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let document: Self = serde_json::from_str(json)?;
        if document.image_name.trim().is_empty() {
            return Err(FormatError::invalid_format("imageName is empty"));
        }
        if let Some(class) = document
            .classes
            .iter()
            .find(|c| c.class_name.trim().is_empty())
        {
            return Err(FormatError::invalid_format(format!(
                "class with {} instances has no className",
                class.instances.len()
            )));
        }
        Ok(document)
    }
}
