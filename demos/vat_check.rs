//! Look up VAT numbers against the live services.
//!
//! ```text
//! RUST_LOG=vatcheck=debug cargo run --example vat_check -- DE123456789 CHE-116.281.710
//! ```

use tracing_subscriber::EnvFilter;
use vatcheck::vat::{VatChecker, validate};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ids: Vec<String> = std::env::args().skip(1).collect();
    if ids.is_empty() {
        eprintln!("usage: vat_check <VAT number>...");
        std::process::exit(2);
    }

    // Format validation (no network required)
    println!("=== Format ===\n");
    for id in &ids {
        match validate(id) {
            Ok(q) => println!("  {id} => {} ({})", q.normalized(), q.country().name),
            Err(e) => println!("  {id} => INVALID: {e}"),
        }
    }

    println!("\n=== Lookup ===\n");
    let mut checker = match VatChecker::from_env() {
        Ok(checker) => checker,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    for id in &ids {
        let record = checker.check(id);
        println!("  {}", record.summary());
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{json}\n"),
            Err(e) => eprintln!("  could not serialize result: {e}"),
        }
    }
}
