//! Vertex extraction from geometry records.
//!
//! Every supported geometry family is unrolled into a flat, ordered list of
//! vertices. Closed rings contribute their closing coordinate only once.
//! Extraction never fails: malformed tuples are skipped and unsupported
//! geometries produce nothing.

use crate::model::{Coord, GeometryRecord, Vertex};

pub fn extract(record: &GeometryRecord) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    match record {
        GeometryRecord::Point(coord) => push_coord(&mut vertices, coord),
        GeometryRecord::LineString(coords) => push_line(&mut vertices, coords),
        GeometryRecord::MultiLineString(lines) => {
            for line in lines {
                push_line(&mut vertices, line);
            }
        }
        GeometryRecord::Polygon(rings) => push_rings(&mut vertices, rings),
        GeometryRecord::MultiPolygon(polygons) => {
            for rings in polygons {
                push_rings(&mut vertices, rings);
            }
        }
        GeometryRecord::Unsupported(_) => {}
    }
    vertices
}

/// Accepts `[x, y]` and `[x, y, z]` tuples only.
fn vertex_from(coord: &[f64]) -> Option<Vertex> {
    match coord {
        [x, y] => Some(Vertex::new(*x, *y, 0.0)),
        [x, y, z] => Some(Vertex::new(*x, *y, *z)),
        _ => None,
    }
}

fn push_coord(out: &mut Vec<Vertex>, coord: &[f64]) {
    if let Some(vertex) = vertex_from(coord) {
        out.push(vertex);
    }
}

fn push_line(out: &mut Vec<Vertex>, coords: &[Coord]) {
    for coord in coords {
        push_coord(out, coord);
    }
}

fn push_rings(out: &mut Vec<Vertex>, rings: &[Vec<Coord>]) {
    for ring in rings {
        push_line(out, open_ring(ring));
    }
}

/// Drops the closing coordinate when it repeats the first one.
fn open_ring(ring: &[Coord]) -> &[Coord] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeometryKind;

    fn c(x: f64, y: f64) -> Coord {
        vec![x, y]
    }

    #[test]
    fn test_empty_payloads_yield_nothing() {
        let records = vec![
            GeometryRecord::Point(vec![]),
            GeometryRecord::LineString(vec![]),
            GeometryRecord::MultiLineString(vec![]),
            GeometryRecord::Polygon(vec![]),
            GeometryRecord::MultiPolygon(vec![]),
            GeometryRecord::Unsupported(GeometryKind::MultiPoint),
        ];
        for record in records {
            assert!(extract(&record).is_empty(), "{:?}", record);
        }
    }

    #[test]
    fn test_point_with_elevation() {
        let vertices = extract(&GeometryRecord::Point(vec![100.0, 200.0, 5.0]));
        assert_eq!(vertices, vec![Vertex::new(100.0, 200.0, 5.0)]);
    }

    #[test]
    fn test_point_defaults_elevation() {
        let vertices = extract(&GeometryRecord::Point(c(1.0, 2.0)));
        assert_eq!(vertices, vec![Vertex::new(1.0, 2.0, 0.0)]);
    }

    #[test]
    fn test_malformed_tuples_are_skipped() {
        let line = GeometryRecord::LineString(vec![
            c(0.0, 0.0),
            vec![1.0],
            vec![1.0, 2.0, 3.0, 4.0],
            c(2.0, 2.0),
        ]);
        assert_eq!(
            extract(&line),
            vec![Vertex::new(0.0, 0.0, 0.0), Vertex::new(2.0, 2.0, 0.0)]
        );
    }

    #[test]
    fn test_linestring_keeps_closing_vertex() {
        let line = GeometryRecord::LineString(vec![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]);
        assert_eq!(extract(&line).len(), 3);
    }

    #[test]
    fn test_polygon_ring_drops_closing_duplicate() {
        let polygon = GeometryRecord::Polygon(vec![vec![
            c(0.0, 0.0),
            c(1.0, 0.0),
            c(1.0, 1.0),
            c(0.0, 0.0),
        ]]);
        assert_eq!(
            extract(&polygon),
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(1.0, 1.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_unclosed_ring_is_kept_whole() {
        let polygon = GeometryRecord::Polygon(vec![vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)]]);
        assert_eq!(extract(&polygon).len(), 3);
    }

    #[test]
    fn test_polygon_holes_follow_exterior() {
        let exterior = vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 0.0)];
        let hole = vec![c(2.0, 2.0), c(3.0, 2.0), c(3.0, 3.0), c(2.0, 2.0)];
        let vertices = extract(&GeometryRecord::Polygon(vec![exterior, hole]));
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[3], Vertex::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_multi_geometries_flatten_in_order() {
        let lines = GeometryRecord::MultiLineString(vec![
            vec![c(0.0, 0.0), c(1.0, 1.0)],
            vec![c(5.0, 5.0)],
        ]);
        let vertices = extract(&lines);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2], Vertex::new(5.0, 5.0, 0.0));

        let square = |o: f64| {
            vec![vec![
                vec![o, o, 1.0],
                vec![o + 1.0, o, 1.0],
                vec![o + 1.0, o + 1.0, 1.0],
                vec![o, o, 1.0],
            ]]
        };
        let polygons = GeometryRecord::MultiPolygon(vec![square(0.0), square(10.0)]);
        let vertices = extract(&polygons);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[3], Vertex::new(10.0, 10.0, 1.0));
    }
}
