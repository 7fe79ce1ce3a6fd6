//! Exchange sources

use crate::error::{Error, Result};
use crate::exchange::{CapturedExchange, Har};
use async_trait::async_trait;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Stream of exchanges; an `Err` item rejects one entry, not the source
pub type ExchangeStream = Pin<Box<dyn Stream<Item = Result<CapturedExchange>> + Send>>;

/// Producer of captured exchanges
#[async_trait]
pub trait ExchangeSource: Send + Sync {
    /// Name used in logs
    fn name(&self) -> String;

    /// Open the source and stream its exchanges in capture order
    async fn exchanges(&self) -> Result<ExchangeStream>;
}

/// Exchanges from an already parsed HAR log
#[derive(Debug, Clone)]
pub struct HarSource {
    har: Har,
}

impl HarSource {
    pub fn new(har: Har) -> Self {
        Self { har }
    }
}

#[async_trait]
impl ExchangeSource for HarSource {
    fn name(&self) -> String {
        "har".to_string()
    }

    async fn exchanges(&self) -> Result<ExchangeStream> {
        Ok(har_stream(&self.har))
    }
}

/// Exchanges from a HAR file on disk
#[derive(Debug, Clone)]
pub struct HarFileSource {
    path: PathBuf,
}

impl HarFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ExchangeSource for HarFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn exchanges(&self) -> Result<ExchangeStream> {
        if !self.path.exists() {
            return Err(Error::FileNotFound {
                path: self.name(),
            });
        }
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let har = Har::from_json(&contents)?;
        Ok(har_stream(&har))
    }
}

fn har_stream(har: &Har) -> ExchangeStream {
    let items: Vec<Result<CapturedExchange>> = har
        .log
        .entries
        .iter()
        .map(CapturedExchange::from_har_entry)
        .collect();
    Box::pin(futures::stream::iter(items))
}
