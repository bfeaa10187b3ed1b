pub mod analyze;
pub mod crack;
pub mod score;
pub mod transform;

use cipherforge::error::CfResult;
use clap::Args;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Inline text, a file, or stdin when neither is given.
#[derive(Args, Debug, Clone)]
pub struct TextSource {
    #[arg(short = 't', long, conflicts_with = "input")]
    pub text: Option<String>,

    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,
}

impl TextSource {
    pub fn read(&self) -> CfResult<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        let raw = match &self.input {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        Ok(raw.trim_end_matches(['\n', '\r']).to_string())
    }
}
