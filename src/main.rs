#![allow(non_snake_case)]
use RustedCollo::Examples::scaling_examples::scaling_examples;

fn main() {
    // 0 - hypersensitive problem over two mesh iterations
    // 1 - quadrature tables
    // 2 - settings from TOML
    let example = 0;
    if let Err(e) = scaling_examples(example) {
        eprintln!("example {} failed: {}", example, e);
        std::process::exit(1);
    }
}
