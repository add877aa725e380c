use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orthodesk::{api, db, notify, reminder, scheduling::WorkingWindow};

#[derive(Parser)]
#[command(name = "orthodesk")]
#[command(about = "Appointment scheduling for the workshop back office")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API and the reminder sweeper
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Database file; defaults to the per-user data directory
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Run a single reminder sweep and exit
    Sweep {
        /// Database file; defaults to the per-user data directory
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "orthodesk=debug,tower_http=debug".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<db::Database> {
    let db = match path {
        Some(p) => db::Database::open(p)?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(port: u16, db: db::Database) -> anyhow::Result<()> {
    let notifier: Arc<dyn notify::Notifier> = Arc::new(notify::LogNotifier);

    tokio::spawn(reminder::run(db.clone(), notifier.clone()));

    let state = api::AppState {
        db,
        notifier,
        window: WorkingWindow::default(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("orthodesk listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, db: path }) => {
            tracing::info!("Starting orthodesk server on port {}", port);
            serve(port, open_database(path)?).await?;
        }
        Some(Commands::Sweep { db: path }) => {
            let db = open_database(path)?;
            let now = chrono::Local::now().naive_local();
            let sent = reminder::sweep(&db, &notify::LogNotifier, now)?;
            println!("dispatched {} reminders", sent);
        }
        None => {
            tracing::info!("Starting orthodesk server on port 3000");
            serve(3000, open_database(None)?).await?;
        }
    }

    Ok(())
}
