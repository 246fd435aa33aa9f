use std::f64::consts::TAU;

use proptest::prelude::*;
use topolygon::{
    Envelope, Geometry, GeometryFactory, IntersectionMatrix, PrecisionModel,
    algorithm::orientation_index,
    geom::Coordinate,
    index::StrTree,
    noding::{
        FastNodingValidator, IntersectionAdder, MCIndexNoder, NodedSegmentString, Noder,
        SnapRoundingNoder,
    },
};

/// Integral ordinates, exactly representable so every predicate is decidable.
fn ordinate() -> impl Strategy<Value = f64> {
    (-1_000_000i64..1_000_000).prop_map(|v| v as f64)
}

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (ordinate(), ordinate()).prop_map(|(x, y)| Coordinate::new(x, y))
}

fn envelope() -> impl Strategy<Value = Envelope> {
    (ordinate(), ordinate(), 0..1000i64, 0..1000i64)
        .prop_map(|(x, y, w, h)| Envelope::new(x, x + w as f64, y, y + h as f64))
}

fn dimension_string() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['F', '0', '1', '2']), 9)
        .prop_map(|cells| cells.into_iter().collect())
}

/// Horizontal strings on odd rows, vertical strings on odd columns, all spanning even
/// ordinates, so every crossing is an exact lattice point.
fn axis_parallel_strings() -> impl Strategy<Value = Vec<NodedSegmentString<usize>>> {
    let span = (0..20i64, 1..20i64).prop_map(|(from, len)| (2 * from, 2 * (from + len)));
    (
        prop::collection::vec(span.clone(), 1..8),
        prop::collection::vec(span, 1..8),
    )
        .prop_map(|(rows, columns)| {
            let horizontal = rows.into_iter().enumerate().map(|(i, (from, to))| {
                let y = (2 * i + 1) as f64;
                vec![Coordinate::new(from as f64, y), Coordinate::new(to as f64, y)]
            });
            let vertical = columns.into_iter().enumerate().map(|(j, (from, to))| {
                let x = (2 * j + 1) as f64;
                vec![Coordinate::new(x, from as f64), Coordinate::new(x, to as f64)]
            });

            horizontal
                .chain(vertical)
                .enumerate()
                .map(|(id, coords)| NodedSegmentString::new(coords, id))
                .collect()
        })
}

/// Short strings with arbitrary float vertices in a small window, so they cross often.
fn float_strings() -> impl Strategy<Value = Vec<NodedSegmentString<usize>>> {
    let vertex = (-20.0..20.0f64, -20.0..20.0f64).prop_map(|(x, y)| Coordinate::new(x, y));
    prop::collection::vec(prop::collection::vec(vertex, 2..5), 1..6).prop_map(|strings| {
        strings
            .into_iter()
            .enumerate()
            .map(|(id, coords)| NodedSegmentString::new(coords, id))
            .collect()
    })
}

/// Returns a star shaped polygon around the given centre, one vertex per radius.
fn star(centre: (f64, f64), radii: &[f64]) -> Geometry {
    let mut shell: Vec<_> = radii
        .iter()
        .enumerate()
        .map(|(i, radius)| {
            let angle = TAU * i as f64 / radii.len() as f64;
            Coordinate::new(centre.0 + radius * angle.cos(), centre.1 + radius * angle.sin())
        })
        .collect();
    shell.push(shell[0]);

    GeometryFactory::floating().polygon(shell, vec![]).unwrap()
}

fn radii() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(50.0..100.0f64, 8..24)
}

fn snap_round(strings: Vec<NodedSegmentString<usize>>) -> Vec<NodedSegmentString<usize>> {
    SnapRoundingNoder::new(PrecisionModel::fixed(1.))
        .compute_nodes(strings)
        .unwrap()
}

fn node(strings: Vec<NodedSegmentString<usize>>) -> Vec<NodedSegmentString<usize>> {
    MCIndexNoder::new(IntersectionAdder::default())
        .compute_nodes(strings)
        .unwrap()
}

proptest! {
    #[test]
    fn orientation_is_antisymmetric(p in coordinate(), q in coordinate(), r in coordinate()) {
        let forward = orientation_index(&p, &q, &r).unwrap();
        prop_assert_eq!(orientation_index(&q, &p, &r).unwrap(), -forward);
        prop_assert_eq!(orientation_index(&q, &r, &p).unwrap(), forward);
    }

    #[test]
    fn envelope_grows_monotonically(
        coords in prop::collection::vec(coordinate(), 1..32),
        extra in coordinate(),
    ) {
        let before = Envelope::of_coordinates(&coords);
        let mut after = before;
        after.expand_to_include(&extra);

        prop_assert!(after.covers(&before));
        prop_assert!(after.covers_point(&extra));
        prop_assert!(coords.iter().all(|c| before.covers_point(c)));
    }

    #[test]
    fn strtree_query_has_no_false_negatives(
        envelopes in prop::collection::vec(envelope(), 1..200),
        query in envelope(),
    ) {
        let mut tree = StrTree::new();
        for (id, env) in envelopes.iter().enumerate() {
            tree.insert(*env, id).unwrap();
        }

        let found: Vec<usize> = tree.query(&query).into_iter().copied().collect();
        for (id, env) in envelopes.iter().enumerate() {
            if env.intersects(&query) {
                prop_assert!(found.contains(&id), "missing item {} for {:?}", id, env);
            }
        }
    }

    #[test]
    fn intersection_matrix_parses_what_it_prints(cells in dimension_string()) {
        let im: IntersectionMatrix = cells.parse().unwrap();
        prop_assert_eq!(im.to_string(), cells.clone());
        prop_assert!(im.matches(&cells).unwrap());
    }

    #[test]
    fn noding_is_idempotent(strings in axis_parallel_strings()) {
        let mut noded = node(strings);
        prop_assert!(FastNodingValidator::check_valid(&mut noded).is_ok());

        let count = noded.len();
        let renoded = node(noded);
        prop_assert_eq!(renoded.len(), count);
    }

    #[test]
    fn snap_rounding_is_noded_and_stable(strings in float_strings()) {
        let mut rounded = snap_round(strings);
        prop_assert!(
            rounded
                .iter()
                .flat_map(|string| string.coords())
                .all(|c| c.x == c.x.round() && c.y == c.y.round()),
            "vertex off the grid"
        );
        prop_assert!(FastNodingValidator::check_valid(&mut rounded).is_ok());

        let count = rounded.len();
        let rerounded = snap_round(rounded);
        prop_assert_eq!(rerounded.len(), count);
    }

    #[test]
    fn larger_buffers_cover_smaller_ones(
        radii in radii(),
        distance in 1.0..5.0f64,
        growth in 1.0..5.0f64,
    ) {
        let polygon = star((0., 0.), &radii);
        let small = polygon.buffer(distance).unwrap();
        let large = polygon.buffer(distance + growth).unwrap();

        prop_assert!(large.covers(&small).unwrap());
        prop_assert!(large.area() > small.area());
    }

    #[test]
    fn union_is_idempotent(a in radii(), b in radii(), dx in -60.0..60.0f64) {
        let a = star((0., 0.), &a);
        let b = star((dx, 20.), &b);

        let union = a.union(&b).unwrap();
        let again = union.union(&b).unwrap();
        let error = (again.area() - union.area()).abs();
        prop_assert!(error <= 1e-6 * union.area(), "area drifted by {}", error);
    }

    #[test]
    fn disjoint_envelopes_have_empty_intersection(
        a in radii(),
        b in radii(),
        gap in 1.0..100.0f64,
    ) {
        let a = star((0., 0.), &a);
        let b = star((200. + gap, 0.), &b);
        prop_assert!(!a.envelope().intersects(&b.envelope()));

        prop_assert!(a.intersection(&b).unwrap().is_empty());
        prop_assert!(b.intersection(&a).unwrap().is_empty());
    }
}
