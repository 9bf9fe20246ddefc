//! pgportal - prints every row of a query fetched through a server-side cursor.

use pgportal::cli::Cli;
use pgportal::config::Config;
use pgportal::error::Result;
use pgportal::logging;
use pgportal::sequence::run_cursor;
use pgportal::session::{MockSession, PgSession};
use std::io::Write;
use tracing::{debug, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A local .env may carry PG* variables for the default descriptor.
    let dotenv = dotenvy::dotenv();

    logging::init_stderr_logging();

    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run(Cli::parse_args()).await {
        debug!("{}", e.category());
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;
    let plan = cli.cursor_plan(&config);

    let output = if cli.mock_db {
        info!("Using mock database");
        run_cursor(MockSession::sample(), &plan).await?
    } else {
        let descriptor = cli.resolve_conninfo(&config)?;
        run_cursor(PgSession::open(&descriptor).await, &plan).await?
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
