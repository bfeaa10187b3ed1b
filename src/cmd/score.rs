use super::TextSource;
use crate::reports;
use cipherforge::api;
use cipherforge::config::ScoringWeights;
use cipherforge::error::CfResult;
use cipherforge::scorer::profiles::Language;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub source: TextSource,

    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    #[arg(long, default_value_t = Language::English)]
    pub language: Language,

    #[arg(short = 'f', long, default_value = "")]
    pub fragment: String,

    #[command(flatten)]
    pub weights: ScoringWeights,
}

pub fn run(args: ScoreArgs) -> CfResult<()> {
    let text = args.source.read()?;
    let alphabet = api::resolve_alphabet(args.alphabet.as_deref(), args.language);
    let breakdown = api::score_text(&text, alphabet, args.language, &args.fragment, args.weights)?;
    reports::print_breakdown(&breakdown);
    Ok(())
}
