use cipherforge::config::Config;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file; explicit command-line flags override it.
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the key space for the most plausible decryptions.
    Crack(cmd::crack::CrackArgs),
    /// Estimate the key length (Kasiski examination + coincidence).
    Analyze(cmd::analyze::AnalyzeArgs),
    Encrypt(cmd::transform::EncryptArgs),
    Decrypt(cmd::transform::DecryptArgs),
    /// Show every plausibility metric for a text.
    Score(cmd::score::ScoreArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // Logs go to stderr so command output can be piped.
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Crack(args) => {
            // Only explicit CLI flags may override values from the config file.
            let config = match &cli.config {
                Some(path) => {
                    info!("⚖️  Loading config from: {}", path);
                    let mut file_config = Config::load_from_file(path).unwrap_or_else(|e| {
                        error!("❌ {}", e);
                        process::exit(1);
                    });
                    if let Some(sub) = matches.subcommand_matches("crack") {
                        file_config.merge_from_cli(&args.config, sub);
                    }
                    file_config
                }
                None => args.config.clone(),
            };
            cmd::crack::run(args, config)
        }
        Commands::Analyze(args) => cmd::analyze::run(args),
        Commands::Encrypt(args) => cmd::transform::run_encrypt(args),
        Commands::Decrypt(args) => cmd::transform::run_decrypt(args),
        Commands::Score(args) => cmd::score::run(args),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
