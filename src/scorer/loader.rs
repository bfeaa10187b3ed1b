use super::ngrams::QuadgramTable;
use crate::error::{CfResult, CipherForgeError};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads `<QUADGRAM><TAB or SPACE><count>` lines. Counts are normalised by
/// their own sum.
pub fn load_quadgrams<R: Read>(reader: R) -> CfResult<QuadgramTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut total = 0.0;
    let mut skipped = 0;

    for result in rdr.records() {
        let rec = result?;
        let (gram, count) = match rec.len() {
            0 => continue,
            1 => {
                let mut parts = rec[0].split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(g), Some(c)) => (g.to_string(), c.to_string()),
                    _ => {
                        skipped += 1;
                        continue;
                    }
                }
            }
            _ => (rec[0].trim().to_string(), rec[1].trim().to_string()),
        };

        if gram.chars().count() != 4 {
            skipped += 1;
            continue;
        }
        let count: f64 = match count.parse() {
            Ok(v) if v > 0.0 => v,
            _ => {
                skipped += 1;
                continue;
            }
        };
        total += count;
        entries.push((gram.to_uppercase(), count));
    }

    if skipped > 0 {
        warn!("Skipped {} malformed quadgram rows", skipped);
    }
    if entries.is_empty() {
        return Err(CipherForgeError::Config(
            "quadgram table contains no usable rows".into(),
        ));
    }
    debug!("Loaded {} quadgrams (total count {})", entries.len(), total);

    Ok(QuadgramTable { entries, total })
}

pub fn load_quadgrams_from_file<P: AsRef<Path>>(path: P) -> CfResult<QuadgramTable> {
    let path = path.as_ref();
    info!("📚 Loading quadgrams from {:?}", path);
    let file = File::open(path)?;
    load_quadgrams(file)
}

/// One word per line; blank lines and `#` comments are ignored.
pub fn load_word_list<R: Read>(reader: R) -> CfResult<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut words = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        if let Some(w) = rec.get(0) {
            let w = w.trim();
            if !w.is_empty() {
                words.push(w.to_uppercase());
            }
        }
    }
    Ok(words)
}

pub fn load_word_list_from_file<P: AsRef<Path>>(path: P) -> CfResult<Vec<String>> {
    let path = path.as_ref();
    info!("📚 Loading word list from {:?}", path);
    let file = File::open(path)?;
    load_word_list(file)
}
