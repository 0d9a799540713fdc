use std::fs;
use std::path::Path;

use crate::errors::ExchangeError;

/// API credentials as both exchanges issue them.
///
/// Loaded from a three-line secret file (key, secret, passphrase).
/// This struct is only ever handed to a [`super::QueryClient`]
/// implementation; nothing else in the pipeline touches it.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub api_passphrase: String,
}

impl Credentials {
    /// Reads a three-line secret file: api key, api secret, passphrase.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExchangeError> {
        let text = fs::read_to_string(&path).map_err(|e| {
            ExchangeError::Authentication(format!(
                "cannot read key file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut lines = text.lines().map(str::trim);
        let mut next_line = |name: &str| {
            lines
                .next()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    ExchangeError::Authentication(format!("key file is missing the {} line", name))
                })
        };
        Ok(Self {
            api_key: next_line("api key")?,
            api_secret: next_line("api secret")?,
            api_passphrase: next_line("api passphrase")?,
        })
    }
}

// Keep key material out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .field("api_passphrase", &"***")
            .finish()
    }
}
