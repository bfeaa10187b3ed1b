use super::TextSource;
use crate::reports;
use cipherforge::api;
use cipherforge::error::CfResult;
use cipherforge::scorer::profiles::Language;
use clap::Args;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: TextSource,

    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    #[arg(long, default_value_t = 20)]
    pub max_length: usize,

    #[arg(long, default_value_t = Language::English)]
    pub language: Language,

    /// Rows shown in the ranking.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

pub fn run(args: AnalyzeArgs) -> CfResult<()> {
    let ciphertext = args.source.read()?;
    let alphabet = api::resolve_alphabet(args.alphabet.as_deref(), args.language);
    let analysis = api::analyze_key_length(&ciphertext, alphabet, args.max_length, args.language)?;

    info!("🔎 {} repeated sequences found", analysis.repeats_found);
    reports::print_key_lengths(&analysis, args.top);
    Ok(())
}
