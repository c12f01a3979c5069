//! Walkthrough of the heap operations with the diagnostic dump after each step
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=trace cargo run --example driver
//! ```

use fibonacci_forest::fibonacci::FibonacciHeap;
use log::info;
use rand::Rng;

fn generate(heap: &mut FibonacciHeap<(), i32>, count: usize) {
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        heap.insert(rng.gen_range(0..100), ());
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut heap = FibonacciHeap::new();
    generate(&mut heap, 10);
    info!("heap initialized with 10 random keys");
    println!("{}\n", heap.key_dump());

    let mut other = FibonacciHeap::new();
    generate(&mut other, 3);
    info!("second heap initialized with 3 random keys");
    println!("{}", other.key_dump());
    heap.union(other);
    info!("union of the first and second heap");
    println!("{}\n", heap.key_dump());

    let handle = heap.insert(100, ());
    info!("inserted key 100 to decrease later");
    heap.extract_min();
    info!("extracted the minimum");
    println!("{}\n", heap.key_dump());

    info!("full node view");
    println!("{heap:?}");
    match heap.decrease_key(&handle, -2) {
        Ok(()) => info!("decreased key 100 to -2"),
        Err(e) => info!("decrease_key failed: {e}"),
    }
    println!("{heap:?}\n");

    match heap.delete(&handle) {
        Ok((key, ())) => info!("deleted the node with key {key}"),
        Err(e) => info!("delete failed: {e}"),
    }
    println!("{}", heap.key_dump());
    assert!(heap.verify_internal_structure());
}
