use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachewarm::config::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "cachewarm",
    version,
    about = "Read every file under a directory to warm the OS page cache"
)]
struct Cli {
    /// Directory to warm (pre-fills the prompt; overrides CACHEWARM_DIR)
    path: Option<PathBuf>,

    /// Maximum concurrent directory reads while scanning
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Scan and read without the TUI, logging progress to stderr
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let interactive = !cli.headless;

    // Initialize tracing (logs to stderr). Quiet by default under the TUI.
    let default_filter = if interactive { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Build settings
    let mut settings = Settings::from_env();
    if let Some(conc) = cli.concurrency {
        settings.max_concurrent_io = conc.max(1);
    }
    settings.follow_symlinks = cli.follow_symlinks;
    if let Some(path) = cli.path {
        settings.default_path = Some(path);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async move {
        if interactive {
            let mut app = cachewarm::app::App::new(settings);
            app.run().await
        } else {
            cachewarm::headless::run(settings).await
        }
    });

    // A quit during a scan may leave directory reads blocked on the
    // filesystem; exit without waiting for them.
    runtime.shutdown_background();
    result
}
