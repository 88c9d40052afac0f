// Property tests: evaluation never panics, arithmetic agrees with Rust,
// and inspected strings read back as the same text

mod common;

use common::*;
#[allow(unused_imports)]
use common::{assert_eq, assert_ne};
use garnet_runtime::Value;
use proptest::prelude::*;

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn eval_never_panics(source in "\\PC{0,40}") {
        let mut state = state();
        let _ = state.eval_string(&source);
    }

    #[test]
    fn integer_arithmetic_matches(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        let mut state = state();
        let sum = state.eval_string(&format!("({}) + ({})", a, b)).unwrap();
        prop_assert_eq!(sum, Value::Integer(a + b));
        let product = state.eval_string(&format!("({}) * ({})", a, b)).unwrap();
        prop_assert_eq!(product, Value::Integer(a * b));
    }

    #[test]
    fn integer_division_floors(a in -10_000i64..10_000, b in -100i64..100) {
        prop_assume!(b != 0);
        let mut state = state();
        let quotient = state.eval_string(&format!("({}) / ({})", a, b)).unwrap();
        prop_assert_eq!(quotient, Value::Integer(floor_div(a, b)));
    }

    #[test]
    fn inspect_reads_back(text in "[ -~]{0,24}") {
        let mut state = state();
        let original = state.new_string(text.clone()).unwrap();
        let literal = state.inspect(original).unwrap();
        let read_back = state.eval_string(&literal).unwrap();
        prop_assert_eq!(state.as_text(read_back).unwrap(), text.as_str());
    }
}
