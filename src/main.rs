//! # Voxel Viewer Entry Point
//!
//! Calls into the library's `run()` function, which runs a headless session.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- viewer.json
//! ```

fn main() {
    voxel_viewer::run();
}
