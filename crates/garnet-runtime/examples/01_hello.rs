//! Minimal embedding example
//!
//! Opens a state, runs a snippet and reads the result back.
//!
//! Run with: cargo run --example 01_hello -p garnet-runtime

use garnet_runtime::State;

fn main() {
    // Default configuration writes script output to stdout
    let mut state = State::open().expect("Failed to open runtime");

    state.print_banner();

    let answer = state.eval_string("(2*21).to_s").expect("Failed to evaluate");
    println!("result: {}", state.as_text(answer).expect("Not a string"));
    // Output: result: 42

    state
        .eval_string("puts 'hola, mundo!'")
        .expect("Failed to evaluate");

    state.close();
}
