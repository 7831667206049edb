//! Prints the fallback chain for a family and language
//!
//! Run with:
//!   cargo run --example resolve -- Helvetica zh-cn

use rust_fontchain::{FcFallbackResolver, FontDescriptor};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let family = args.next().unwrap_or_else(|| String::from("Helvetica"));
    let language = args.next().unwrap_or_else(|| String::from("zh-cn"));

    let resolver = match FcFallbackResolver::new() {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let start = std::time::Instant::now();
    let chain = resolver.resolve(&FontDescriptor::family(&family).with_language(&language));
    let end = std::time::Instant::now();

    println!("{family} ({language}): {} fonts in {:?}", chain.len(), end - start);
    for (rank, path) in chain.iter().enumerate() {
        println!("  {rank:>3}  {}", path.display());
    }
}
