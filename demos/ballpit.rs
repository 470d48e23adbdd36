//! # Ballpit Demo
//!
//! Opens a window with an interactive ball pit. Move the pointer over the
//! window to push the spheres around.
//!
//! Controls:
//! - Space: pause/resume the physics
//! - Up/Down: double/halve the number of spheres
//! - Escape: quit
//!
//! Run with: `cargo run --example ballpit -- [config.json]`

use ballpit::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match BallpitConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("could not read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => BallpitConfig::default()
            .with_count(150)
            .with_colors(vec![0xff6b6b, 0x4ecdc4, 0xffe66d, 0x1a535c]),
    };

    if let Err(e) = ballpit::run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
