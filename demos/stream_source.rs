//! Example: Following a live event stream over TCP
//!
//! This example uses `StreamSource` to receive instance buckets over a TCP
//! connection, as newline-delimited JSON or Server-Sent Events.
//!
//! # Usage
//!
//! First, start a server that sends JSON buckets (one per line):
//!
//! ```bash
//! echo '{"instance":"web-1","routers":[{"url":"GET /","totalResponseTime":30,"200":3}],"cloudApi":[]}' | nc -l 9090
//! ```
//!
//! Then run this example:
//!
//! ```bash
//! cargo run --example stream_source -- localhost:9090
//! ```

use std::env;
use std::time::Duration;

use tokio::net::TcpStream;

use routewatch::{App, ChartLimits, SourceError, StreamSource};

#[tokio::main]
async fn main() {
    let addr = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example stream_source -- <host:port>");
        eprintln!();
        eprintln!("Example: cargo run --example stream_source -- localhost:9090");
        std::process::exit(1);
    });

    println!("Connecting to {}...", addr);

    let stream = match TcpStream::connect(&addr).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("Connected! Waiting for events...\n");

    let source = StreamSource::spawn(stream, &addr);
    let mut app = App::new(Box::new(source), ChartLimits::default());

    loop {
        if app.reload_data() {
            let view = app.view();
            println!("{} requests so far", view.total_requests);
            for instance in &view.top_instances {
                println!("  - {}: {} requests", instance.name, instance.count);
            }
            println!();
        }

        if app.is_finished() {
            match &app.load_error {
                Some(SourceError::Closed) | None => println!("Stream closed"),
                Some(err) => eprintln!("Error: {}", err),
            }
            break;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
