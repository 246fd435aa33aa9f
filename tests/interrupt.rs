//! The interrupt flag is global to the process, so these checks live in their own test
//! binary where no other operation can consume the request.

use topolygon::{Geometry, GeometryError, GeometryFactory, coord, interrupt};

#[test]
fn interrupted_operations_abort_once() {
    struct Test {
        name: &'static str,
        op: Box<dyn Fn(&Geometry, &Geometry) -> topolygon::Result<Geometry>>,
    }

    let factory = GeometryFactory::floating();
    let square = |x: f64, y: f64| {
        factory
            .polygon(
                vec![
                    coord!(x, y),
                    coord!(x + 2., y),
                    coord!(x + 2., y + 2.),
                    coord!(x, y + 2.),
                    coord!(x, y),
                ],
                vec![],
            )
            .unwrap()
    };
    let a = square(0., 0.);
    let b = square(1., 1.);

    vec![
        Test {
            name: "union",
            op: Box::new(|a, b| a.union(b)),
        },
        Test {
            name: "intersection",
            op: Box::new(|a, b| a.intersection(b)),
        },
        Test {
            name: "buffer",
            op: Box::new(|a, _| a.buffer(0.5)),
        },
    ]
    .into_iter()
    .for_each(|test| {
        interrupt::request();
        let got = (test.op)(&a, &b);
        assert!(
            matches!(got, Err(GeometryError::Interrupted)),
            "{}: got {got:?}",
            test.name
        );

        let got = (test.op)(&a, &b);
        assert!(got.is_ok(), "{}: request was not consumed, got {got:?}", test.name);
    });

    interrupt::request();
    interrupt::clear();
    assert!(a.union(&b).is_ok(), "cleared request still aborted");
}
