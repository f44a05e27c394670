use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::net::TcpStream;
use tracing::info;

use routewatch::{logging, App, ChartKind, FileSource, Settings, SourceError, StreamSource};

#[derive(Parser, Debug)]
#[command(name = "routewatch")]
#[command(about = "Aggregate request-log snapshots into route, instance and status metrics")]
struct Args {
    /// Path to a bulk statistics file (JSON array of arrivals)
    #[arg(short, long, default_value = "lastDayStatistics.json", conflicts_with = "connect")]
    file: PathBuf,

    /// Connect to a TCP endpoint for live events (host:port)
    #[arg(short, long, conflicts_with = "file")]
    connect: Option<String>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only show this route
    #[arg(long)]
    route: Option<String>,

    /// Only show this instance
    #[arg(long)]
    instance: Option<String>,

    /// Only count this status code
    #[arg(long)]
    status_code: Option<String>,

    /// Chart style, which decides how many top items are listed
    #[arg(long, value_enum)]
    chart: Option<ChartKind>,

    /// Poll interval in milliseconds (only used with --connect)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Write the view to this file instead of stdout
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init("info");

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ms) = args.refresh {
        settings.refresh_ms = ms;
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, &args, &settings);
    }

    // Default: bulk file mode
    run_with_file(&args.file, &args, &settings)
}

/// Create the app and apply the initial selection, CLI flags winning.
fn build_app(source: Box<dyn routewatch::DataSource>, args: &Args, settings: &Settings) -> App {
    let mut app = App::new(source, settings.chart_limits.clone());
    app.selection = settings.filter.selection();
    if let Some(ref route) = args.route {
        app.set_route_filter(Some(route.as_str()));
    }
    if let Some(ref instance) = args.instance {
        app.set_instance_filter(Some(instance.as_str()));
    }
    if let Some(ref code) = args.status_code {
        app.set_status_code_filter(Some(code.as_str()));
    }
    app.chart = args.chart.unwrap_or_default();
    app
}

/// Load a bulk file once, write the view and exit.
fn run_with_file(path: &Path, args: &Args, settings: &Settings) -> Result<()> {
    let mut app = build_app(Box::new(FileSource::new(path)), args, settings);
    app.reload_data();

    if let Some(ref e) = app.load_error {
        bail!("Failed to load {}: {}", path.display(), e);
    }

    emit(&app, args.export.as_deref(), true)
}

/// Follow a TCP event stream until it closes or the user interrupts.
fn run_with_tcp(addr: &str, args: &Args, settings: &Settings) -> Result<()> {
    // Build a tokio runtime for the TCP connection
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        info!(addr, "Connecting");
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))
            .with_context(|| format!("Failed to connect to {}", addr))?;
        info!(addr, "Connected");

        let source = StreamSource::spawn(stream, addr);
        let mut app = build_app(Box::new(source), args, settings);

        follow(&mut app, args.export.as_deref(), settings.refresh_interval()).await
    })
}

async fn follow(app: &mut App, export: Option<&Path>, refresh: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(refresh);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }

        if app.reload_data() {
            emit(app, export, false)?;
        }

        if app.is_finished() {
            info!(source = app.source_description(), "Source finished");
            break;
        }
    }

    Ok(())
}

/// Write the current view to the export file, or to stdout.
///
/// Stdout gets one compact JSON document per line when following a stream.
fn emit(app: &App, export: Option<&Path>, pretty: bool) -> Result<()> {
    if let Some(path) = export {
        app.export_state(path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        info!(path = %path.display(), "Exported view");
        return Ok(());
    }

    let view = app.view();
    let json = if pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{}", json);
    Ok(())
}
