// End-to-end evaluation of the language subset and core library

mod common;

use common::*;
#[allow(unused_imports)]
use common::{assert_eq, assert_ne};
use garnet_runtime::RuntimeError;
use rstest::rstest;

#[rstest]
#[case("1 + 2 * 3", "7")]
#[case("(1 + 2) * 3", "9")]
#[case("2 ** 3 ** 2", "512")]
#[case("-2 ** 2", "-4")]
#[case("-7 / 2", "-4")]
#[case("-7 % 3", "2")]
#[case("7.0 / 2", "3.5")]
#[case("2 ** -1", "0.5")]
#[case("1_000 + 1", "1001")]
#[case("9223372036854775807 + 1", "9.223372036854776e+18")]
#[case("-9223372036854775808", "-9223372036854775808")]
#[case("-9223372036854775808 - 1", "-9.223372036854776e+18")]
#[case("1 <=> 2", "-1")]
#[case("1 == 1.0", "true")]
#[case("1 != 2", "true")]
fn test_arithmetic(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval_inspect(source), expected);
}

#[rstest]
#[case("nil || 'fallback'", "\"fallback\"")]
#[case("false && boom", "false")]
#[case("0 && 'truthy'", "\"truthy\"")]
#[case("!nil", "true")]
#[case("not 1", "false")]
#[case("true & nil", "false")]
#[case("false ^ true", "true")]
fn test_truthiness(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval_inspect(source), expected);
}

#[rstest]
#[case("'mrb_p'.upcase", "\"MRB_P\"")]
#[case("'Hello'.swapcase", "\"hELLO\"")]
#[case("'garnet'.capitalize", "\"Garnet\"")]
#[case("'  pad  '.strip", "\"pad\"")]
#[case("\"line\\n\".chomp", "\"line\"")]
#[case("'abc'.reverse", "\"cba\"")]
#[case("'ab' * 3", "\"ababab\"")]
#[case("'a' + 'b'", "\"ab\"")]
#[case("'abc' <=> 'abd'", "-1")]
#[case("'12abc'.to_i", "12")]
#[case("'3.5kg'.to_f", "3.5")]
#[case("'name'.to_sym", ":name")]
#[case(":name.length", "4")]
#[case("'hola'.include?('ol')", "true")]
#[case("\"2 * 21 = #{2 * 21}\"", "\"2 * 21 = 42\"")]
#[case("\"tab\\there\"", "\"tab\\there\"")]
fn test_strings(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval_inspect(source), expected);
}

#[rstest]
#[case("s = 'abc'\ns.upcase!\ns", "\"ABC\"")]
#[case("s = 'ABC'\ns.upcase!", "nil")]
#[case("s = 'a'\ns << 'b'\ns << 'c'\ns", "\"abc\"")]
#[case("s = 'a'\nt = s\nt.concat('z')\ns", "\"az\"")]
#[case("s = 'a'\nt = s.dup\nt << 'z'\ns", "\"a\"")]
fn test_in_place_mutation(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval_inspect(source), expected);
}

#[test]
fn test_frozen_strings() {
    let err = eval_runtime_error("s = 'x'.freeze\ns << 'y'");
    assert_eq!(err.class_name(), "FrozenError");
    assert!(matches!(
        eval_runtime_error("GARNET_ENGINE.upcase!"),
        RuntimeError::Frozen(_)
    ));
    assert_eq!(eval_inspect("GARNET_ENGINE.upcase"), "\"GARNET\"");
}

#[test]
fn test_control_flow() {
    let source = "\
total = 0
i = 0
while i < 10
  i += 1
  next if i.even?
  break if i > 7
  total += i
end
total";
    // 1 + 3 + 5 + 7
    assert_eq!(eval_inspect(source), "16");

    assert_eq!(eval_inspect("n = 0\nn += 1 until n == 5\nn"), "5");
    assert_eq!(eval_inspect("while true\n  break 42\nend"), "42");
    assert_eq!(
        eval_inspect("x = 5\nif x < 3\n  :low\nelsif x < 10\n  :mid\nelse\n  :high\nend"),
        ":mid"
    );
    assert_eq!(eval_inspect("unless nil\n  'ran'\nend"), "\"ran\"");
    assert_eq!(eval_inspect("'skipped' if false"), "nil");
}

#[test]
fn test_methods() {
    let source = "\
def fact(n)
  return 1 if n <= 1
  n * fact(n - 1)
end
fact(10)";
    assert_eq!(eval_inspect(source), "3628800");

    assert_eq!(eval_inspect("def noop\nend"), ":noop");
    assert_eq!(eval_inspect("def two\n  2\nend\n5.two"), "2");
    assert_eq!(eval_inspect("def id(x)\n  x\nend\nsend(:id, 'sent')"), "\"sent\"");
}

#[rstest]
#[case("puts 1, 'two', :three", "1\ntwo\nthree\n")]
#[case("puts", "\n")]
#[case("puts nil", "\n")]
#[case("puts \"ends\\n\"", "ends\n")]
#[case("print 'a', 'b'", "ab")]
#[case("p 'q'", "\"q\"\n")]
#[case("p 1.0e20, 0.1 + 0.2", "1.0e+20\n0.30000000000000004\n")]
#[case("puts 255.to_s(16)", "ff\n")]
fn test_output(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval_output(source), expected);
}

#[rstest]
#[case("1 / 0", "ZeroDivisionError", "divided by 0")]
#[case("nil.upcase", "NoMethodError", "undefined method 'upcase' for nil")]
#[case("1.puts", "NoMethodError", "private method 'puts' called for an instance of Integer")]
#[case("nope", "NameError", "undefined local variable or method 'nope' for main:Object")]
#[case("Nope", "NameError", "uninitialized constant Nope")]
#[case("1 + 'a'", "TypeError", "String can't be coerced into Integer")]
#[case("'a' + 1", "TypeError", "no implicit conversion of Integer into String")]
#[case("1 < 'a'", "ArgumentError", "comparison of Integer with String failed")]
#[case("'x'.upcase(1)", "ArgumentError", "wrong number of arguments (given 1, expected 0)")]
#[case("break", "LocalJumpError", "break used outside of a loop")]
#[case("raise", "RuntimeError", "unhandled exception")]
fn test_runtime_errors(#[case] source: &str, #[case] class: &str, #[case] message: &str) {
    let err = eval_runtime_error(source);
    assert_eq!(err.class_name(), class);
    assert_eq!(err.to_string(), message);
}
