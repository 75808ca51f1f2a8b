//! DTMF tone payloads addressed by digit.

mod file;

pub use file::FileToneSource;

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;

/// Every key on a DTMF keypad that a tone asset can exist for.
pub const DTMF_DIGITS: [char; 12] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '*', '#'];

/// Tone lookup errors. All of them mean the deployment is misconfigured.
#[derive(Debug, Error)]
pub enum ToneError {
    #[error("Not a DTMF digit: {0:?}")]
    InvalidDigit(char),

    #[error("Tone asset for {digit:?} not found at {}", path.display())]
    Missing { digit: char, path: PathBuf },

    #[error("Tone asset for {digit:?} is unusable: {reason}")]
    Corrupt { digit: char, reason: String },

    #[error("Failed to read tone asset for {digit:?}: {source}")]
    Io {
        digit: char,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the raw audio payload for a DTMF digit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToneSource: Send + Sync {
    async fn tone(&self, digit: char) -> Result<Bytes, ToneError>;
}

/// File name stem used for a digit's asset (`star` and `pound` for `*`/`#`).
pub fn asset_name(digit: char) -> Option<String> {
    match digit {
        '0'..='9' => Some(digit.to_string()),
        '*' => Some("star".into()),
        '#' => Some("pound".into()),
        _ => None,
    }
}
