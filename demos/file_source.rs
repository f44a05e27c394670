//! Example: Summarizing a bulk statistics file
//!
//! This example loads a JSON array of arrivals with `FileSource` and prints
//! the top routes, instances and status codes of the resulting view.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example file_source -- path/to/lastDayStatistics.json
//! ```

use std::env;

use routewatch::{App, ChartLimits, FileSource};

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example file_source -- <path-to-statistics.json>");
        eprintln!();
        eprintln!("The file should contain a JSON array of arrivals in the format:");
        eprintln!(
            r#"  [{{"createdAt": "2024-01-01T00:00:00Z", "instances": [{{"instance": "web-1", "routers": [{{"url": "GET /", "200": 3}}], "cloudApi": []}}]}}]"#
        );
        std::process::exit(1);
    });

    let mut app = App::new(Box::new(FileSource::new(&path)), ChartLimits::default());
    app.reload_data();

    if let Some(err) = &app.load_error {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    let view = app.view();
    println!("{} requests in {}\n", view.total_requests, path);

    println!("Top routes:");
    for route in &view.top_routes {
        println!("  {:>8}  {}", route.count, route.name);
    }

    println!("\nTop instances:");
    for instance in &view.top_instances {
        println!("  {:>8}  {}", instance.count, instance.name);
    }

    println!("\nStatus codes:");
    for code in &view.top_status_codes {
        println!("  {:>8}  {}", code.count, code.name);
    }

    println!("\n{} rows after merging instances", view.routers.len());
}
