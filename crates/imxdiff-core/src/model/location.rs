//! Geographic location attached to an object record.

use crate::model::Record;
use serde::{Deserialize, Serialize};

pub const GEOGRAPHIC_LOCATION_TAG: &str = "GeographicLocation";
pub const OBSERVED_LOCATION_TAG: &str = "ObservedLocation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Point" => Some(GeometryKind::Point),
            "LineString" => Some(GeometryKind::LineString),
            "Polygon" => Some(GeometryKind::Polygon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicLocation {
    pub kind: GeometryKind,
    /// Raw coordinate text, `"x,y[,z] x,y[,z] ..."`
    pub coordinates: String,
    pub srs_name: Option<String>,
    pub accuracy: Option<f64>,
    pub azimuth: Option<f64>,
    pub data_acquisition_method: Option<String>,
}

impl GeographicLocation {
    /// Locate the first geographic location belonging to `record`.
    ///
    /// An `ObservedLocation` record is its own location. Otherwise the
    /// subtree is searched in pre-order, skipping any descendant that carries
    /// `identifier_attribute` (those are separate objects).
    pub fn find(record: &Record, identifier_attribute: &str) -> Option<Self> {
        if record.tag == OBSERVED_LOCATION_TAG {
            return Self::from_location_record(record);
        }
        let mut stack: Vec<&Record> = record.children.iter().rev().collect();
        while let Some(next) = stack.pop() {
            if next.has_attr(identifier_attribute) {
                continue;
            }
            if next.tag == GEOGRAPHIC_LOCATION_TAG {
                return Self::from_location_record(next);
            }
            stack.extend(next.children.iter().rev());
        }
        None
    }

    fn from_location_record(location: &Record) -> Option<Self> {
        let shape = location
            .descendants()
            .find(|r| GeometryKind::from_tag(&r.tag).is_some())?;
        let kind = GeometryKind::from_tag(&shape.tag)?;
        let coordinates = shape
            .find_first("coordinates")
            .and_then(Record::non_blank_text)?
            .trim()
            .to_string();
        let srs_name = std::iter::once(location)
            .chain(location.descendants())
            .find_map(|r| r.attr("srsName"))
            .map(str::to_string);

        Some(Self {
            kind,
            coordinates,
            srs_name,
            accuracy: location.attr("accuracy").and_then(|v| v.parse().ok()),
            azimuth: location.attr("azimuth").and_then(|v| v.parse().ok()),
            data_acquisition_method: location
                .attr("dataAcquisitionMethod")
                .map(str::to_string),
        })
    }
}
