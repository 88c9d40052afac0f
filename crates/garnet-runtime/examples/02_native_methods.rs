//! Host-defined methods example
//!
//! Registers Rust closures that scripts can call like any other method.
//!
//! Run with: cargo run --example 02_native_methods -p garnet-runtime

use garnet_runtime::{Arity, NativeMethodBuilder, RuntimeConfig, State, TypeTag, Value};

fn main() {
    let mut state = State::open_with(RuntimeConfig::buffered()).expect("Failed to open runtime");

    // Integer#double
    state.define_method(TypeTag::Integer, "double", Arity::Exact(0), |_, recv, _| {
        match recv {
            Value::Integer(n) => Ok(Value::Integer(n * 2)),
            _ => Ok(Value::Nil),
        }
    });

    // A private Kernel-style function taking one or two strings
    NativeMethodBuilder::new("greet")
        .with_arity_range(1, 2)
        .private()
        .with_implementation(|state, _recv, args| {
            let name = state.as_text(args[0])?.to_string();
            let greeting = match args.get(1) {
                Some(&g) => state.as_text(g)?.to_string(),
                None => "hello".to_string(),
            };
            state.new_string(format!("{}, {}!", greeting, name))
        })
        .register(&mut state)
        .expect("Failed to register greet");

    let doubled = state.eval_string("21.double").expect("Failed");
    println!("21.double = {:?}", doubled);
    // Output: 21.double = Integer(42)

    let greeting = state.eval_string("greet('garnet', 'hola')").expect("Failed");
    println!("{}", state.as_text(greeting).expect("Not a string"));
    // Output: hola, garnet!

    match state.eval_string("1.greet('x')") {
        Err(e) => println!("error: {}", e),
        Ok(v) => println!("unexpected: {:?}", v),
    }
    // Output: error: private method 'greet' called for an instance of Integer
}
