use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "Follow fixtures and submit score predictions, online or offline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local cache database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Backend API base URL (falls back to MATCHDAY_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List upcoming fixtures (works offline)
    Matches {
        /// Show completed fixtures instead
        #[arg(long)]
        past: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Submit a score prediction for a fixture
    Predict {
        /// Fixture id
        match_id: i64,
        /// Predicted home score
        home: u32,
        /// Predicted away score
        away: u32,
        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// List your predictions
    Predictions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Push locally saved predictions to the server
    Sync,
    /// Show the contest leaderboard
    Leaderboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show connectivity, sign-in, and pending sync state
    Status,
    /// Wipe cached fixtures and predictions (keeps your sign-in)
    ClearCache,
    /// Manage the signed-in session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create a new account
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Sign in and store the session locally
    Login { username: String, password: String },
    /// Sign out and clear the stored session
    Logout,
    /// Show the stored session and whether the backend still accepts it
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
