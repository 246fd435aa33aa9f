//! A minimal Well-Known Text writer.

use std::fmt::{self, Display, Write};

use crate::geom::{Coordinate, Geometry, GeometryKind, LineString, Point, Polygon};

/// Renders the given coordinates as a `LINESTRING`, or `LINESTRING EMPTY`.
pub fn line_string(coords: &[Coordinate]) -> String {
    let mut out = String::from("LINESTRING ");
    write_coordinates(&mut out, coords).ok();
    out
}

/// Renders a single segment as a two point `LINESTRING`.
pub fn segment(p0: &Coordinate, p1: &Coordinate) -> String {
    line_string(&[*p0, *p1])
}

/// Renders a single location as a `POINT`.
pub fn point(p: &Coordinate) -> String {
    format!("POINT ({p})")
}

fn write_coordinates(out: &mut impl Write, coords: &[Coordinate]) -> fmt::Result {
    if coords.is_empty() {
        return out.write_str("EMPTY");
    }

    out.write_char('(')?;
    for (index, coord) in coords.iter().enumerate() {
        if index > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{coord}")?;
    }
    out.write_char(')')
}

fn write_point(out: &mut impl Write, point: &Point) -> fmt::Result {
    match point.coordinate() {
        Some(c) => write!(out, "({c})"),
        None => out.write_str("EMPTY"),
    }
}

fn write_line(out: &mut impl Write, line: &LineString) -> fmt::Result {
    write_coordinates(out, line.coords().as_slice())
}

fn write_polygon(out: &mut impl Write, polygon: &Polygon) -> fmt::Result {
    if polygon.is_empty() {
        return out.write_str("EMPTY");
    }

    out.write_char('(')?;
    for (index, ring) in polygon.rings().enumerate() {
        if index > 0 {
            out.write_str(", ")?;
        }
        write_coordinates(out, ring.coords().as_slice())?;
    }
    out.write_char(')')
}

fn write_list<T>(
    out: &mut impl Write,
    items: &[T],
    mut each: impl FnMut(&mut dyn Write, &T) -> fmt::Result,
) -> fmt::Result {
    if items.is_empty() {
        return out.write_str("EMPTY");
    }

    out.write_char('(')?;
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.write_str(", ")?;
        }
        let mut buffer = String::new();
        each(&mut buffer, item)?;
        out.write_str(&buffer)?;
    }
    out.write_char(')')
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            GeometryKind::Point(p) => {
                f.write_str("POINT ")?;
                write_point(f, p)
            }
            GeometryKind::LineString(l) => {
                f.write_str("LINESTRING ")?;
                write_line(f, l)
            }
            GeometryKind::LinearRing(r) => {
                f.write_str("LINEARRING ")?;
                write_coordinates(f, r.coords().as_slice())
            }
            GeometryKind::Polygon(p) => {
                f.write_str("POLYGON ")?;
                write_polygon(f, p)
            }
            GeometryKind::MultiPoint(ps) => {
                f.write_str("MULTIPOINT ")?;
                write_list(f, ps, |out, p| {
                    let mut s = String::new();
                    write_point(&mut s, p)?;
                    out.write_str(&s)
                })
            }
            GeometryKind::MultiLineString(ls) => {
                f.write_str("MULTILINESTRING ")?;
                write_list(f, ls, |out, l| {
                    let mut s = String::new();
                    write_line(&mut s, l)?;
                    out.write_str(&s)
                })
            }
            GeometryKind::MultiPolygon(ps) => {
                f.write_str("MULTIPOLYGON ")?;
                write_list(f, ps, |out, p| {
                    let mut s = String::new();
                    write_polygon(&mut s, p)?;
                    out.write_str(&s)
                })
            }
            GeometryKind::GeometryCollection(gs) => {
                f.write_str("GEOMETRYCOLLECTION ")?;
                write_list(f, gs, |out, g| write!(out, "{g}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::GeometryFactory};

    #[test]
    fn writes_line_strings() {
        assert_eq!(line_string(&[]), "LINESTRING EMPTY");
        assert_eq!(
            segment(&coord!(0, 0), &coord!(1.5, -2)),
            "LINESTRING (0 0, 1.5 -2)"
        );
    }

    #[test]
    fn writes_geometries() {
        let factory = GeometryFactory::floating();
        let polygon = factory
            .polygon(
                vec![coord!(0, 0), coord!(4, 0), coord!(4, 4), coord!(0, 0)],
                vec![],
            )
            .unwrap();
        assert_eq!(polygon.to_string(), "POLYGON ((0 0, 4 0, 4 4, 0 0))");

        let collection = factory.collection(vec![factory.point(coord!(1, 2)), polygon]);
        assert_eq!(
            collection.to_string(),
            "GEOMETRYCOLLECTION (POINT (1 2), POLYGON ((0 0, 4 0, 4 4, 0 0)))"
        );
        assert_eq!(factory.empty_point().to_string(), "POINT EMPTY");
    }
}
