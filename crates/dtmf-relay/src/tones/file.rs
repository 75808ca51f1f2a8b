//! Tone assets loaded from WAV files on disk.

use super::{asset_name, ToneError, ToneSource, DTMF_DIGITS};
use async_trait::async_trait;
use bytes::Bytes;
use hound::{SampleFormat, WavReader};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// File name prefix of the bundled tone set.
const FILE_PREFIX: &str = "audiocheck.net_dtmf_";

/// Reads `<dir>/audiocheck.net_dtmf_<digit>.wav` and hands out the PCM
/// sample data, caching each tone after its first successful load.
pub struct FileToneSource {
    dir: PathBuf,
    cache: RwLock<HashMap<char, Bytes>>,
}

impl FileToneSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the asset for `digit`, if it is a DTMF digit.
    pub fn path_for(&self, digit: char) -> Option<PathBuf> {
        asset_name(digit).map(|name| self.dir.join(format!("{}{}.wav", FILE_PREFIX, name)))
    }

    /// Load every keypad tone, returning the digits whose asset is unusable.
    ///
    /// Only `0`-`9` are required; a missing `*` or `#` is logged at debug.
    pub async fn preload(&self) -> Vec<char> {
        let mut failed = Vec::new();

        for digit in DTMF_DIGITS {
            match self.tone(digit).await {
                Ok(_) => {}
                Err(ToneError::Missing { .. }) if !digit.is_ascii_digit() => {
                    debug!(%digit, "Optional tone asset not present");
                }
                Err(e) => {
                    warn!(%digit, "Tone asset unavailable: {}", e);
                    failed.push(digit);
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            cached = self.cache.read().await.len(),
            "Tone assets loaded"
        );
        failed
    }

    async fn load(&self, digit: char, path: &Path) -> Result<Bytes, ToneError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToneError::Missing {
                    digit,
                    path: path.to_path_buf(),
                }
            } else {
                ToneError::Io { digit, source: e }
            }
        })?;

        decode_pcm(&data).map_err(|reason| ToneError::Corrupt { digit, reason })
    }
}

#[async_trait]
impl ToneSource for FileToneSource {
    async fn tone(&self, digit: char) -> Result<Bytes, ToneError> {
        if let Some(payload) = self.cache.read().await.get(&digit) {
            return Ok(payload.clone());
        }

        let path = self.path_for(digit).ok_or(ToneError::InvalidDigit(digit))?;
        let payload = self.load(digit, &path).await?;
        debug!(%digit, bytes = payload.len(), "Loaded tone asset");

        self.cache.write().await.insert(digit, payload.clone());
        Ok(payload)
    }
}

/// Strip the WAV container, returning the raw PCM samples.
///
/// 8-bit audio comes back unsigned as stored on disk; 16-bit audio as
/// little-endian signed samples.
fn decode_pcm(data: &[u8]) -> Result<Bytes, String> {
    let mut reader = WavReader::new(Cursor::new(data)).map_err(|e| e.to_string())?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int {
        return Err("floating point samples are not supported".into());
    }

    let pcm: Vec<u8> = match spec.bits_per_sample {
        8 => reader
            .samples::<i8>()
            .map(|s| s.map(|s| (s as u8) ^ 0x80))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| e.to_string())?,
        16 => {
            let samples = reader
                .samples::<i16>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            samples.iter().flat_map(|s| s.to_le_bytes()).collect()
        }
        bits => return Err(format!("unsupported sample width: {} bits", bits)),
    };

    if pcm.is_empty() {
        return Err("no audio samples".into());
    }

    Ok(Bytes::from(pcm))
}
