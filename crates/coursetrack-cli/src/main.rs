use clap::{ArgAction, Parser, Subcommand};
use commands::{complete, config, daemon, open, reconcile, repair, show};
use learn_sync_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "coursetrack")]
#[command(about = "coursetrack - keep learner watchlists and quiz progress consistent")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record that a learner opened a course
    #[command(long_about = "Add the course to the learner's watchlist, or bump last-accessed if it is already there. Course metadata comes from a JSON snapshot file or from inline flags.")]
    Open {
        /// Learner id
        #[arg(long)]
        user: String,

        /// JSON file holding a course snapshot (courseId, title, description, instructorDisplayName, thumbnail, totalVideos)
        #[arg(long, value_name = "FILE", conflicts_with_all = ["course_id", "title", "description", "instructor", "thumbnail", "total_videos"])]
        course_file: Option<PathBuf>,

        /// Course id (required unless --course-file is given)
        #[arg(long, required_unless_present = "course_file", requires = "total_videos")]
        course_id: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        instructor: Option<String>,

        #[arg(long)]
        thumbnail: Option<String>,

        /// Number of videos in the course
        #[arg(long, allow_negative_numbers = true)]
        total_videos: Option<i64>,
    },
    /// Record a finished quiz for one video
    Complete {
        #[arg(long)]
        user: String,

        #[arg(long)]
        course: String,

        #[arg(long)]
        video: String,

        #[arg(long)]
        score: f64,

        /// Completion time (RFC 3339), defaults to now
        #[arg(long, value_name = "TIMESTAMP")]
        completed_at: Option<String>,
    },
    /// Deduplicate and recompute stored watchlists
    #[command(long_about = "Reconcile a learner's stored watchlist against their quiz completions. Duplicate course entries collapse to the most recently accessed one and progress is recomputed. The record is only written back when something changed.")]
    Reconcile {
        /// Learner id
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        user: Option<String>,

        /// Reconcile every learner in the store
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Show what would change without writing
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Show a learner's watchlist
    Show {
        #[arg(long)]
        user: String,
    },
    /// Reconcile exported JSON files offline, without touching the store
    #[command(long_about = "Read a raw watchlist array and a completion-record array from JSON files, reconcile them, and print (or write) the repaired watchlist.")]
    Repair {
        /// JSON array of watchlist entries
        #[arg(long, value_name = "FILE")]
        watchlist: PathBuf,

        /// JSON array of quiz completion records
        #[arg(long, value_name = "FILE")]
        completions: Option<PathBuf>,

        /// Write the repaired watchlist here instead of printing it
        #[arg(long, value_name = "FILE")]
        write: Option<PathBuf>,
    },
    /// Run as daemon with internal scheduler
    #[command(long_about = "Periodically reconcile every learner's watchlist according to the configured cron schedule. Runs in the foreground until interrupted.")]
    Daemon {
        /// Cron schedule expression with seconds field (e.g., '0 0 */6 * * *' for every 6 hours)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the reconciliation pass on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,

        /// Write logs to the rolling daemon log file instead of stderr
        #[arg(long, action = ArgAction::SetTrue)]
        log_to_file: bool,
    },
    /// Inspect or initialise configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default config file if none exists
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Daemon { log_to_file: true, .. } => Some(PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Open {
            user,
            course_file,
            course_id,
            title,
            description,
            instructor,
            thumbnail,
            total_videos,
        } => {
            let snapshot = open::snapshot_from_args(course_file, course_id, title, description, instructor, thumbnail, total_videos)?;
            open::run_open(&user, snapshot, &output).await
        }
        Commands::Complete {
            user,
            course,
            video,
            score,
            completed_at,
        } => complete::run_complete(&user, course, video, score, completed_at, &output).await,
        Commands::Reconcile { user, all, dry_run } => reconcile::run_reconcile(user, all, dry_run, &output).await,
        Commands::Show { user } => show::run_show(&user, &output).await,
        Commands::Repair {
            watchlist,
            completions,
            write,
        } => repair::run_repair(&watchlist, completions.as_deref(), write.as_deref(), &output),
        Commands::Daemon {
            schedule,
            no_startup_run,
            ..
        } => daemon::run_daemon(schedule, no_startup_run, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
