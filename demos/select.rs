//! Picks a terminal font the way a program would at startup, falling back
//! to SimSun, and prints its metrics
//!
//! Run with:
//!   cargo run --example select -- "Noto Sans Mono" 16

use rust_fontchain::{open_font, system_resolver};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| String::from("Consolas"));
    let point_size = args.next().and_then(|s| s.parse().ok()).unwrap_or(16.0);

    let result = system_resolver().and_then(|resolver| open_font(&resolver, &name, point_size));
    let font = match result {
        Ok(font) => font,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    println!("font:        {}", font.face.path().display());
    println!("fixed width: {}", font.face.is_fixed_width());
    println!("line height: {}px", font.line_height());
    println!("\"Hello, 世界\": {}px", font.measure("Hello, 世界"));
}
