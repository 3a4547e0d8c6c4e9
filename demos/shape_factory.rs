//! Shape factory example for singleton-factory.
//!
//! Demonstrates:
//! - Declaring a process-wide factory with built-in entries
//! - Extending it at runtime with `register`
//! - Handling unknown keys as typed errors
//!
//! Run with: `cargo run --example shape_factory`

use singleton_factory::{define_factory, FactoryError, TypeRegistry};

pub trait Shape: Send {
    fn draw(&self) -> String;
}

pub struct Circle;
impl Shape for Circle {
    fn draw(&self) -> String {
        "( )".to_string()
    }
}

pub struct Rectangle;
impl Shape for Rectangle {
    fn draw(&self) -> String {
        "[ ]".to_string()
    }
}

pub struct Triangle;
impl Shape for Triangle {
    fn draw(&self) -> String {
        "/_\\".to_string()
    }
}

fn builtins(registry: &TypeRegistry<String, Box<dyn Shape>>) {
    registry.register("circle".to_string(), || Box::new(Circle) as Box<dyn Shape>);
    registry.register("rectangle".to_string(), || Box::new(Rectangle) as Box<dyn Shape>);
}

// Create the shared factory for this example
define_factory!(shapes: String => Box<dyn Shape>, builtins);

fn draw(name: &str) {
    match shapes::create(name) {
        Ok(shape) => println!("   {name:<10} {}", shape.draw()),
        Err(FactoryError::UnknownKey { key }) => println!("   {key:<10} (not registered)"),
        Err(err) => println!("   {name:<10} failed: {err}"),
    }
}

fn main() {
    println!("=== singleton-factory: Shape Factory ===\n");

    // -------------------------------------------------------------------------
    // 1. Built-in shapes
    // -------------------------------------------------------------------------
    println!("1. Creating built-in shapes...");

    draw("circle");
    draw("rectangle");
    draw("triangle");

    // -------------------------------------------------------------------------
    // 2. Extend at runtime
    // -------------------------------------------------------------------------
    println!("\n2. Registering triangle...");

    if let Err(err) = shapes::register("triangle".to_string(), || {
        Box::new(Triangle) as Box<dyn Shape>
    }) {
        eprintln!("   could not reach the shape factory: {err}");
        return;
    }

    draw("triangle");

    println!("\n=== Example completed successfully ===");
}
