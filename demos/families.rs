//! Lists installed families by their name in a language
//!
//! Run with:
//!   cargo run --example families -- zh-cn

use rust_fontchain::FcFallbackResolver;

fn main() {
    env_logger::init();

    let language = std::env::args().nth(1).unwrap_or_else(|| String::from("zh-cn"));

    let resolver = match FcFallbackResolver::new() {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let families = resolver.list_families(&language);
    println!("{} families support {language}:", families.len());
    for family in families {
        println!("  {family}");
    }
}
