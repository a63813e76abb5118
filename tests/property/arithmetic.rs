// Property tests for compiled arithmetic.
//
// Checks integer division contracts and the double path against Rust.

use crate::common::*;
use proptest::prelude::*;

fn int_value(nodes: Vec<qlogo_compiler::DatumP>) -> i64 {
    let (mut ev, _) = setup();
    value(&mut ev, nodes).parse().unwrap()
}

fn nonzero() -> impl Strategy<Value = i64> {
    prop_oneof![-50i64..=-1, 1i64..=50]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn sum_matches_native(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
        let (mut ev, _) = setup();
        let got: f64 = value(&mut ev, vec![p("sum", vec![n(a), n(b)])]).parse().unwrap();
        prop_assert_eq!(got, a + b);
    }

    #[test]
    fn sum_commutative(a in -10000i64..10000, b in -10000i64..10000) {
        let ab = int_value(vec![p("sum", vec![n(a as f64), n(b as f64)])]);
        let ba = int_value(vec![p("sum", vec![n(b as f64), n(a as f64)])]);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn remainder_sign_follows_dividend(a in -1000i64..1000, b in nonzero()) {
        let r = int_value(vec![p("remainder", vec![n(a as f64), n(b as f64)])]);
        prop_assert_eq!(r, a % b);
        prop_assert!(r == 0 || (r < 0) == (a < 0));
    }

    #[test]
    fn modulo_sign_follows_divisor(a in -1000i64..1000, b in nonzero()) {
        let m = int_value(vec![p("modulo", vec![n(a as f64), n(b as f64)])]);
        prop_assert!(m == 0 || (m < 0) == (b < 0), "{} modulo {} = {}", a, b, m);
        prop_assert!(m.abs() < b.abs());
        prop_assert_eq!((a - m) % b, 0);
    }

    #[test]
    fn difference_inverts_sum(a in -10000i64..10000, b in -10000i64..10000) {
        let sum = p("sum", vec![n(a as f64), n(b as f64)]);
        let back = int_value(vec![p("difference", vec![sum, n(b as f64)])]);
        prop_assert_eq!(back, a);
    }

    #[test]
    fn quotient_times_divisor(a in -1000i64..1000, b in nonzero()) {
        let (mut ev, _) = setup();
        let q = p("quotient", vec![n(a as f64), n(b as f64)]);
        let got: f64 = value(&mut ev, vec![p("product", vec![q, n(b as f64)])]).parse().unwrap();
        prop_assert!((got - a as f64).abs() < 1e-9);
    }

    #[test]
    fn comparison_agrees(a in -100i64..100, b in -100i64..100) {
        let (mut ev, _) = setup();
        let less = value(&mut ev, vec![p("lessp", vec![n(a as f64), n(b as f64)])]);
        prop_assert_eq!(less, (a < b).to_string());
    }
}
