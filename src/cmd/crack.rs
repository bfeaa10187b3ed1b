use super::TextSource;
use crate::reports;
use cipherforge::api;
use cipherforge::config::Config;
use cipherforge::error::CfResult;
use cipherforge::scorer::loader;
use cipherforge::search::progress::{format_duration, format_rate};
use cipherforge::search::{ProgressCallback, ScoredCandidate, SearchProgress};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct CrackArgs {
    #[command(flatten)]
    pub source: TextSource,

    /// Defaults to the language's alphabet.
    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    /// Known plaintext fragment.
    #[arg(short = 'f', long, default_value = "")]
    pub fragment: String,

    /// Quadgram counts as `<QUADGRAM>\t<count>` lines.
    #[arg(long)]
    pub quadgrams: Option<PathBuf>,

    /// Reference word list, one per line.
    #[arg(long)]
    pub words: Option<PathBuf>,

    /// Write the session record as JSON.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: Config,
}

struct CliReporter;

impl ProgressCallback for CliReporter {
    fn on_progress(&self, p: &SearchProgress, best: Option<&ScoredCandidate>) -> bool {
        let eta = p
            .eta()
            .map(format_duration)
            .unwrap_or_else(|| "--".to_string());
        match best {
            Some(b) => info!(
                "{:5.1}% | {} keys/s | ETA {} | workers {} | best {} ({:.4})",
                p.percent(),
                format_rate(p.keys_per_second),
                eta,
                p.active_workers,
                b.key,
                b.score
            ),
            None => info!(
                "{:5.1}% | {} keys/s | ETA {} | workers {}",
                p.percent(),
                format_rate(p.keys_per_second),
                eta,
                p.active_workers
            ),
        }
        true
    }
}

pub fn run(args: CrackArgs, config: Config) -> CfResult<()> {
    let ciphertext = args.source.read()?;
    let alphabet = api::resolve_alphabet(args.alphabet.as_deref(), config.search.language);

    let mut request = api::request_from_config(&config, &ciphertext, alphabet, &args.fragment)?;
    if let Some(path) = &args.quadgrams {
        request.quadgrams = Some(loader::load_quadgrams_from_file(path)?);
    }
    if let Some(path) = &args.words {
        request.words = Some(loader::load_word_list_from_file(path)?);
    }

    let interval = Duration::from_millis(config.search.report_interval_ms);
    let record = api::crack(request, interval, &CliReporter)?;

    reports::print_session_summary(&record);
    reports::print_candidates(&record.results);

    if let Some(path) = &args.output {
        record.save_to_file(path)?;
        info!("💾 Session written to {:?}", path);
    }
    Ok(())
}
