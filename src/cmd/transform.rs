use super::TextSource;
use cipherforge::api;
use cipherforge::cipher::CasePolicy;
use cipherforge::error::{CfResult, CipherForgeError};
use cipherforge::scorer::profiles::Language;
use clap::Args;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct EncryptArgs {
    #[command(flatten)]
    pub source: TextSource,

    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    #[arg(short = 'k', long, conflicts_with = "random_key")]
    pub key: Option<String>,

    /// Generate a random key of this length instead.
    #[arg(short = 'r', long)]
    pub random_key: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = CasePolicy::Preserve)]
    pub case: CasePolicy,

    #[arg(long, default_value_t = Language::English)]
    pub language: Language,
}

#[derive(Args, Debug, Clone)]
pub struct DecryptArgs {
    #[command(flatten)]
    pub source: TextSource,

    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    #[arg(short = 'k', long)]
    pub key: String,

    #[arg(long, default_value_t = CasePolicy::Preserve)]
    pub case: CasePolicy,

    #[arg(long, default_value_t = Language::English)]
    pub language: Language,
}

pub fn run_encrypt(args: EncryptArgs) -> CfResult<()> {
    let text = args.source.read()?;
    let alphabet = api::resolve_alphabet(args.alphabet.as_deref(), args.language);

    let key = match (args.key, args.random_key) {
        (Some(k), _) => k,
        (None, Some(len)) => {
            let k = api::random_key(alphabet, len, args.seed)?;
            info!("🎲 Random key: {}", k);
            k
        }
        (None, None) => {
            return Err(CipherForgeError::InvalidParameters(
                "either --key or --random-key is required".into(),
            ))
        }
    };

    println!("{}", api::encrypt(&text, &key, alphabet, args.case)?);
    Ok(())
}

pub fn run_decrypt(args: DecryptArgs) -> CfResult<()> {
    let text = args.source.read()?;
    let alphabet = api::resolve_alphabet(args.alphabet.as_deref(), args.language);
    println!("{}", api::decrypt(&text, &args.key, alphabet, args.case)?);
    Ok(())
}
