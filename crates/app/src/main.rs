use std::fmt;

use quiz_core::model::TOP_LEADERBOARD_SIZE;
use services::{AppServices, Clock, Identity};
use tracing_subscriber::EnvFilter;

mod args;
mod play;
mod render;

use args::{Args, Command, Defaults, prepare_sqlite_file, print_usage};

#[derive(Debug)]
enum CliError {
    UnknownUser(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownUser(name) => {
                write!(f, "no account named {name:?}; run `quiz register {name}` first")
            }
        }
    }
}

impl std::error::Error for CliError {}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn resolve_identity(
    app: &AppServices,
    user: Option<&str>,
) -> Result<Option<Identity>, Box<dyn std::error::Error>> {
    let Some(name) = user else {
        return Ok(None);
    };
    match app.accounts().identify(name).await? {
        Some(identity) => Ok(Some(identity)),
        None => Err(CliError::UnknownUser(name.trim().to_string()).into()),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), Defaults::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::debug!(db_url = %parsed.db_url, "storage ready");

    match parsed.command {
        Command::Play { difficulty, user } => {
            let identity = resolve_identity(&app, user.as_deref()).await?;
            play::run(&app, difficulty, identity).await
        }
        Command::Leaderboard { all, user } => {
            let identity = resolve_identity(&app, user.as_deref()).await?;
            let leaderboard = app.leaderboard();
            let rows = match (&identity, all) {
                (Some(identity), true) => leaderboard.for_player(identity, u32::MAX).await?,
                (Some(identity), false) => {
                    leaderboard.for_player(identity, TOP_LEADERBOARD_SIZE).await?
                }
                (None, true) => leaderboard.all().await?,
                (None, false) => leaderboard.top().await?,
            };
            if let Some(identity) = &identity {
                println!("Scores for {}:", identity.username);
            }
            for line in render::leaderboard(&rows) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Register { username } => {
            let identity = app.accounts().register(&username).await?;
            println!("Registered {} (id {}).", identity.username, identity.user_id);
            Ok(())
        }
        Command::Reset => {
            let removed = app.leaderboard().reset().await?;
            println!("Removed {removed} leaderboard entries.");
            Ok(())
        }
        Command::Help => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
