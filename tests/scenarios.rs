use std::sync::Arc;

use topolygon::{
    BufferParameters, Geometry, GeometryFactory, GeometryKind, ValidationErrorKind,
    algorithm::{LineIntersector, orientation_index},
    coord,
    geom::{Coordinate, CoordinateSequence},
};

fn square(factory: &Arc<GeometryFactory>, x: f64, y: f64, side: f64) -> Geometry {
    factory
        .polygon(
            vec![
                coord!(x, y),
                coord!(x + side, y),
                coord!(x + side, y + side),
                coord!(x, y + side),
                coord!(x, y),
            ],
            vec![],
        )
        .unwrap()
}

fn ring(coords: &[(f64, f64)]) -> CoordinateSequence {
    coords
        .iter()
        .map(|&(x, y)| Coordinate::new(x, y))
        .collect::<Vec<_>>()
        .into()
}

#[test]
fn orientation_of_triangles() {
    struct Test {
        name: &'static str,
        q: Coordinate,
        want: i32,
    }

    vec![
        Test {
            name: "point on the left",
            q: coord!(0.5, 1),
            want: 1,
        },
        Test {
            name: "point on the right",
            q: coord!(0.5, -1),
            want: -1,
        },
        Test {
            name: "collinear point",
            q: coord!(0.5, 0),
            want: 0,
        },
    ]
    .into_iter()
    .for_each(|test| {
        let got = orientation_index(&coord!(0, 0), &coord!(1, 0), &test.q).unwrap();
        assert_eq!(got, test.want, "{}", test.name);
    });
}

#[test]
fn crossing_segments_intersect_properly() {
    let mut li = LineIntersector::new();
    li.compute_intersection(&coord!(0, 0), &coord!(2, 2), &coord!(0, 2), &coord!(2, 0));

    assert!(li.has_intersection());
    assert_eq!(li.intersection_num(), 1);
    assert_eq!(li.intersection_at(0), coord!(1, 1));
    assert!(li.is_proper());
}

#[test]
fn polygon_validity() {
    struct Test {
        name: &'static str,
        hole: CoordinateSequence,
        want: Option<ValidationErrorKind>,
    }

    let factory = GeometryFactory::floating();
    let shell = ring(&[(0., 0.), (4., 0.), (4., 4.), (0., 4.), (0., 0.)]);

    vec![
        Test {
            name: "hole inside the shell",
            hole: ring(&[(1., 1.), (1., 2.), (2., 2.), (2., 1.), (1., 1.)]),
            want: None,
        },
        Test {
            name: "hole exceeding the shell",
            hole: ring(&[(1., 1.), (1., 5.), (5., 5.), (5., 1.), (1., 1.)]),
            want: Some(ValidationErrorKind::HoleOutsideShell),
        },
    ]
    .into_iter()
    .for_each(|test| {
        let polygon = factory.polygon(shell.clone(), vec![test.hole]).unwrap();
        let got = polygon.validation_error().unwrap().map(|error| error.kind);
        assert_eq!(got, test.want, "{}", test.name);
        assert_eq!(polygon.is_valid().unwrap(), test.want.is_none(), "{}", test.name);
    });
}

#[test]
fn point_buffer_approximates_unit_circle() {
    let factory = GeometryFactory::floating();
    let point = factory.point(coord!(0, 0));
    let params = BufferParameters::default().with_quadrant_segments(8);

    let buffer = point.buffer_with(1.0, params).unwrap();
    let GeometryKind::Polygon(polygon) = buffer.kind() else {
        panic!("expected a polygon, got {}", buffer.geometry_type());
    };

    assert_eq!(polygon.shell().len() - 1, 32);
    let area = buffer.area();
    assert!((area - std::f64::consts::PI).abs() / std::f64::consts::PI < 0.02);
    assert!(buffer.is_valid().unwrap());
}

#[test]
fn overlapping_squares() {
    struct Test {
        name: &'static str,
        op: fn(&Geometry, &Geometry) -> topolygon::Result<Geometry>,
        geometry_type: &'static str,
        area: f64,
    }

    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let factory = GeometryFactory::floating();
    let a = square(&factory, 0., 0., 2.);
    let b = square(&factory, 1., 1., 2.);

    vec![
        Test {
            name: "union",
            op: Geometry::union,
            geometry_type: "Polygon",
            area: 7.,
        },
        Test {
            name: "intersection",
            op: Geometry::intersection,
            geometry_type: "Polygon",
            area: 1.,
        },
        Test {
            name: "difference",
            op: Geometry::difference,
            geometry_type: "Polygon",
            area: 3.,
        },
        Test {
            name: "symmetric difference",
            op: Geometry::sym_difference,
            geometry_type: "MultiPolygon",
            area: 6.,
        },
    ]
    .into_iter()
    .for_each(|test| {
        let result = (test.op)(&a, &b).unwrap();
        assert_eq!(result.geometry_type(), test.geometry_type, "{}", test.name);
        assert!((result.area() - test.area).abs() < 1e-9, "{}: got {}", test.name, result.area());
        assert!(result.is_valid().unwrap(), "{}", test.name);
    });
}

#[test]
fn union_of_overlapping_squares_is_a_hexagon() {
    let factory = GeometryFactory::floating();
    let union = square(&factory, 0., 0., 2.)
        .union(&square(&factory, 1., 1., 2.))
        .unwrap();

    let GeometryKind::Polygon(polygon) = union.kind() else {
        panic!("expected a polygon, got {}", union.geometry_type());
    };
    assert!(polygon.holes().is_empty());

    let mut vertices: Vec<Coordinate> = polygon.shell().coords().to_vec();
    vertices.pop();
    vertices.sort();
    assert_eq!(
        vertices,
        vec![
            coord!(0, 0),
            coord!(0, 2),
            coord!(1, 2),
            coord!(1, 3),
            coord!(2, 0),
            coord!(2, 1),
            coord!(3, 1),
            coord!(3, 3),
        ]
    );
}

#[test]
fn disjoint_squares_union_into_a_multipolygon() {
    let factory = GeometryFactory::floating();
    let union = square(&factory, 0., 0., 1.)
        .union(&square(&factory, 5., 5., 1.))
        .unwrap();

    assert_eq!(union.geometry_type(), "MultiPolygon");
    assert_eq!(union.num_geometries(), 2);
    assert!((union.area() - 2.).abs() < 1e-12);
}

#[test]
fn relate_and_predicates() {
    let factory = GeometryFactory::floating();
    let outer = square(&factory, 0., 0., 10.);
    let inner = square(&factory, 2., 2., 2.);
    let neighbour = square(&factory, 10., 0., 5.);

    assert_eq!(outer.relate(&inner).unwrap().to_string(), "212FF1FF2");
    assert!(outer.contains(&inner).unwrap());
    assert!(inner.within(&outer).unwrap());
    assert!(outer.covers(&inner).unwrap());
    assert!(!outer.overlaps(&inner).unwrap());

    assert!(outer.touches(&neighbour).unwrap());
    assert!(outer.intersects(&neighbour).unwrap());
    assert!(!outer.disjoint(&neighbour).unwrap());
    assert!(outer.relate_pattern(&neighbour, "F***1****").unwrap());

    let line = factory.line_string(vec![coord!(-5, 5), coord!(5, 5)]).unwrap();
    assert!(line.crosses(&outer).unwrap());
    assert!(outer.equals_topo(&outer.normalized()).unwrap());
}

#[test]
fn buffer_of_union_covers_both_operands() {
    let factory = GeometryFactory::floating();
    let a = square(&factory, 0., 0., 2.);
    let b = square(&factory, 1., 1., 2.);

    let grown = a.union(&b).unwrap().buffer(0.5).unwrap();
    assert!(grown.covers(&a).unwrap());
    assert!(grown.covers(&b).unwrap());
    assert!(grown.area() > 7.);
}
