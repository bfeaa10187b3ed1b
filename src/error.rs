use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherForgeError {
    #[error("Invalid Alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("Invalid Parameters: {0}")]
    InvalidParameters(String),

    #[error("Key space too large: alphabet of {alphabet_size} symbols up to length {max_length} overflows u64")]
    KeySpaceTooLarge { alphabet_size: usize, max_length: usize },

    #[error("Key index {index} out of range (total keys: {total})")]
    IndexOutOfRange { index: u64, total: u64 },

    #[error("Worker {worker} failed: {message}")]
    WorkerFailure { worker: usize, message: String },

    #[error("Invalid State: {0}")]
    InvalidState(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Thread Pool Error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Configuration Error: {0}")]
    Config(String),
}

pub type CfResult<T> = Result<T, CipherForgeError>;
