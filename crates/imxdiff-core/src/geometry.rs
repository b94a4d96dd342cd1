//! Geometry collaborator.
//!
//! The core only needs a handful of operations: build shapes from
//! coordinate text, merge line fragments, measure distance and reverse a
//! line. [`GeometryProvider`] abstracts those; [`PlanarGeometry`] is a plain
//! Euclidean implementation.

use crate::model::{GeographicLocation, GeometryKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    fn same_xy(&self, other: &Coord) -> bool {
        (self.x - other.x).abs() <= COORD_EPSILON && (self.y - other.y).abs() <= COORD_EPSILON
    }
}

const COORD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Vec<Coord>),
    /// Result of a merge that did not yield one connected path
    MultiLineString(Vec<Vec<Coord>>),
}

impl Geometry {
    /// First vertex, if any.
    pub fn first_coord(&self) -> Option<Coord> {
        match self {
            Geometry::Point(c) => Some(*c),
            Geometry::LineString(cs) | Geometry::Polygon(cs) => cs.first().copied(),
            Geometry::MultiLineString(parts) => parts.first().and_then(|p| p.first()).copied(),
        }
    }

    /// All vertices in order.
    pub fn coords(&self) -> Vec<Coord> {
        match self {
            Geometry::Point(c) => vec![*c],
            Geometry::LineString(cs) | Geometry::Polygon(cs) => cs.clone(),
            Geometry::MultiLineString(parts) => parts.iter().flatten().copied().collect(),
        }
    }

    fn segments(&self) -> Vec<(Coord, Coord)> {
        match self {
            Geometry::Point(c) => vec![(*c, *c)],
            Geometry::LineString(cs) | Geometry::Polygon(cs) => pairs(cs),
            Geometry::MultiLineString(parts) => parts.iter().flat_map(|p| pairs(p)).collect(),
        }
    }
}

fn pairs(cs: &[Coord]) -> Vec<(Coord, Coord)> {
    match cs {
        [] => Vec::new(),
        [only] => vec![(*only, *only)],
        _ => cs.windows(2).map(|w| (w[0], w[1])).collect(),
    }
}

/// Parse GML coordinate text: tuples separated by whitespace, ordinates by
/// commas.
pub fn parse_coordinates(text: &str) -> Option<Vec<Coord>> {
    text.split_whitespace()
        .map(|tuple| {
            let mut ordinates = tuple.split(',').map(|o| o.trim().parse::<f64>());
            let x = ordinates.next()?.ok()?;
            let y = ordinates.next()?.ok()?;
            let z = match ordinates.next() {
                Some(z) => Some(z.ok()?),
                None => None,
            };
            Some(Coord { x, y, z })
        })
        .collect()
}

/// Geometry operations needed by ingestion.
pub trait GeometryProvider {
    fn point(&self, coordinates: &str) -> Option<Geometry>;
    fn line(&self, coordinates: &str) -> Option<Geometry>;
    fn polygon(&self, coordinates: &str) -> Option<Geometry>;
    /// Merge line fragments. Returns a `LineString` when they form one path,
    /// a `MultiLineString` otherwise.
    fn merge_lines(&self, parts: &[Geometry]) -> Option<Geometry>;
    fn distance(&self, a: &Geometry, b: &Geometry) -> f64;
    fn reverse(&self, geometry: &Geometry) -> Geometry;

    /// Shape described by a geographic location.
    fn from_location(&self, location: &GeographicLocation) -> Option<Geometry> {
        match location.kind {
            GeometryKind::Point => self.point(&location.coordinates),
            GeometryKind::LineString => self.line(&location.coordinates),
            GeometryKind::Polygon => self.polygon(&location.coordinates),
        }
    }
}

/// Euclidean geometry in the plane of the first two ordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanarGeometry;

impl GeometryProvider for PlanarGeometry {
    fn point(&self, coordinates: &str) -> Option<Geometry> {
        let coords = parse_coordinates(coordinates)?;
        match coords.as_slice() {
            [single] => Some(Geometry::Point(*single)),
            _ => None,
        }
    }

    fn line(&self, coordinates: &str) -> Option<Geometry> {
        let coords = parse_coordinates(coordinates)?;
        (coords.len() >= 2).then_some(Geometry::LineString(coords))
    }

    fn polygon(&self, coordinates: &str) -> Option<Geometry> {
        let coords = parse_coordinates(coordinates)?;
        (coords.len() >= 3).then_some(Geometry::Polygon(coords))
    }

    fn merge_lines(&self, parts: &[Geometry]) -> Option<Geometry> {
        let mut pending: Vec<Vec<Coord>> = parts
            .iter()
            .flat_map(|g| match g {
                Geometry::LineString(cs) => vec![cs.clone()],
                Geometry::MultiLineString(ps) => ps.clone(),
                Geometry::Point(_) | Geometry::Polygon(_) => Vec::new(),
            })
            .filter(|cs| !cs.is_empty())
            .collect();
        if pending.is_empty() {
            return None;
        }

        let mut chains: Vec<Vec<Coord>> = Vec::new();
        while !pending.is_empty() {
            let mut chain = pending.remove(0);
            loop {
                let Some(pos) = pending.iter().position(|p| joins(&chain, p)) else {
                    break;
                };
                let part = pending.remove(pos);
                attach(&mut chain, part);
            }
            chains.push(chain);
        }

        if chains.len() == 1 {
            chains.pop().map(Geometry::LineString)
        } else {
            Some(Geometry::MultiLineString(chains))
        }
    }

    fn distance(&self, a: &Geometry, b: &Geometry) -> f64 {
        let a_to_b = a
            .coords()
            .iter()
            .flat_map(|p| b.segments().into_iter().map(move |s| point_segment(p, &s)))
            .fold(f64::INFINITY, f64::min);
        let b_to_a = b
            .coords()
            .iter()
            .flat_map(|p| a.segments().into_iter().map(move |s| point_segment(p, &s)))
            .fold(f64::INFINITY, f64::min);
        a_to_b.min(b_to_a)
    }

    fn reverse(&self, geometry: &Geometry) -> Geometry {
        match geometry {
            Geometry::Point(c) => Geometry::Point(*c),
            Geometry::LineString(cs) => Geometry::LineString(cs.iter().rev().copied().collect()),
            Geometry::Polygon(cs) => Geometry::Polygon(cs.iter().rev().copied().collect()),
            Geometry::MultiLineString(parts) => Geometry::MultiLineString(
                parts
                    .iter()
                    .rev()
                    .map(|p| p.iter().rev().copied().collect())
                    .collect(),
            ),
        }
    }
}

fn endpoints(cs: &[Coord]) -> Option<(Coord, Coord)> {
    Some((*cs.first()?, *cs.last()?))
}

fn joins(chain: &[Coord], part: &[Coord]) -> bool {
    match (endpoints(chain), endpoints(part)) {
        (Some((cs, ce)), Some((ps, pe))) => {
            ce.same_xy(&ps) || ce.same_xy(&pe) || cs.same_xy(&pe) || cs.same_xy(&ps)
        }
        _ => false,
    }
}

fn attach(chain: &mut Vec<Coord>, mut part: Vec<Coord>) {
    let (Some((cs, ce)), Some((ps, pe))) = (endpoints(chain), endpoints(&part)) else {
        return;
    };
    if ce.same_xy(&ps) {
        chain.extend(part.into_iter().skip(1));
    } else if ce.same_xy(&pe) {
        part.reverse();
        chain.extend(part.into_iter().skip(1));
    } else if cs.same_xy(&pe) {
        part.extend(chain.iter().skip(1).copied());
        *chain = part;
    } else if cs.same_xy(&ps) {
        part.reverse();
        part.extend(chain.iter().skip(1).copied());
        *chain = part;
    }
}

fn point_segment(p: &Coord, (a, b): &(Coord, Coord)) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
