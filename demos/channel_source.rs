//! Example: Feeding the pipeline through a channel
//!
//! This example shows how to embed routewatch in your own application by
//! sending instance buckets through a channel.
//!
//! This is useful when you want to:
//! - Receive request logs from a message queue
//! - Generate synthetic data for testing
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_source
//! ```

use std::thread;
use std::time::Duration;

use routewatch::{
    App, ChannelSource, ChartLimits, Delivery, IngestMode, InstanceBucket, RouteUrlEntry,
};

fn main() {
    println!("Channel source example");
    println!("Generating synthetic request logs...\n");

    let (tx, source) = ChannelSource::create(IngestMode::Realtime, "synthetic-data");
    let mut app = App::new(Box::new(source), ChartLimits::default());

    // Two instances alternate, so consecutive events merge into one row
    thread::spawn(move || {
        for tick in 0u64..10 {
            let instance = if tick % 2 == 0 { "web-1" } else { "web-2" };
            let bucket = InstanceBucket {
                instance: instance.to_string(),
                routers: vec![
                    RouteUrlEntry::new("GET /")
                        .with_status(200, 10 + tick)
                        .with_total_response_time(25.0 * (10 + tick) as f64),
                    RouteUrlEntry::new("POST /login")
                        .with_status(200, 3)
                        .with_status(401, tick % 3)
                        .with_total_response_time(120.0),
                ],
                cloud_api: vec![],
            };

            if tx.blocking_send(Delivery::Event(bucket)).is_err() {
                break; // Receiver dropped
            }
            thread::sleep(Duration::from_millis(200));
        }
    });

    while !app.is_finished() {
        if app.reload_data() {
            let view = app.view();
            let latest = view.routers.last();
            println!(
                "{} requests, {} rows, latest row average {:.1}ms",
                view.total_requests,
                view.routers.len(),
                latest.and_then(|r| r.response_time).unwrap_or(f64::NAN)
            );
        }
        thread::sleep(Duration::from_millis(100));
    }

    println!("\nSender finished. Final top routes:");
    for route in app.view().top_routes {
        println!("  {:>6}  {}", route.count, route.name);
    }
}
