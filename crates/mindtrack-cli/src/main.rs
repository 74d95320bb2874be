use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mindtrack_cli::commands;
use mindtrack_cli::config::{self, MindtrackConfig};
use mindtrack_model::backend::ArtifactLoader;
use mindtrack_model::classifier::Classifier;
use mindtrack_storage::local::LocalStore;

#[derive(Parser)]
#[command(name = "mindtrack", version, about = "Self-report assessment scoring and risk screening")]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available instruments.
    Instruments {
        #[arg(long)]
        json: bool,
    },
    /// Score a JSON answers file and print the result.
    Score {
        #[arg(short, long)]
        instrument: String,
        #[arg(short, long)]
        answers: PathBuf,
    },
    /// Fill in an instrument interactively and save the submission.
    Run {
        instrument: String,
        /// Overrides the configured user.
        #[arg(long)]
        user: Option<String>,
    },
    /// Print the effective config; `--save` writes it back, applying any
    /// pending migration.
    Config {
        #[arg(long)]
        save: bool,
    },
    /// Show recent submissions.
    History {
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load(path: Option<&PathBuf>) -> eyre::Result<MindtrackConfig> {
    match path {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let cfg = load(cli.config.as_ref())?;
    mindtrack_instruments::validate_all()?;

    Classifier::install_global(
        Classifier::new(ArtifactLoader::new(cfg.effective_model_path()))
            .with_thresholds(cfg.thresholds),
    )?;
    let classifier = Classifier::global();

    match cli.command {
        Command::Instruments { json } => commands::print_instruments(json)?,
        Command::Score {
            instrument,
            answers,
        } => commands::score_file(&instrument, &answers, &classifier).await?,
        Command::Run { instrument, user } => {
            let user = user.or_else(|| cfg.user_id.clone());
            let deps = commands::local_collaborators(&cfg, user, classifier);
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            commands::run_session(&instrument, deps, &mut input, &mut out).await?;
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            if save {
                let path = match &cli.config {
                    Some(path) => {
                        config::save_config_to(path, &cfg)?;
                        path.clone()
                    }
                    None => config::save_config(&cfg)?,
                };
                eprintln!("saved {}", path.display());
            }
        }
        Command::History { user, limit } => {
            let user = user
                .or_else(|| cfg.user_id.clone())
                .ok_or_else(|| eyre::eyre!("no user given and none configured"))?;
            let store = LocalStore::new(cfg.store_dir());
            commands::print_history(&store, &user, limit).await?;
        }
    }

    Ok(())
}
