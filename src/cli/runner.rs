//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, RecorderConfig};
use crate::error::{Error, Result, ResultExt};
use crate::recorder::{HarFileSource, ImportSummary, Recorder};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.cli.command {
            Commands::Build {
                har,
                output,
                parameterise,
            } => {
                self.build(&config, har, output.as_deref(), parameterise)
                    .await
            }
            Commands::Endpoints { har } => self.endpoints(&config, har).await,
            Commands::Serve { port } => {
                let port = port.unwrap_or(config.server.port);
                crate::cli::serve(config, port).await
            }
        }
    }

    /// Load recorder config, defaults when no file was given
    fn load_config(&self) -> Result<RecorderConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(RecorderConfig::default()),
        }
    }

    /// Record every entry of a HAR file into a fresh recorder
    async fn record_har(
        &self,
        config: &RecorderConfig,
        har: &Path,
    ) -> Result<(Recorder, ImportSummary)> {
        let recorder = Recorder::started(config).await;
        let summary = recorder.import(&HarFileSource::new(har)).await?;
        recorder.stop().await;
        Ok((recorder, summary))
    }

    /// Build and write the document
    async fn build(
        &self,
        config: &RecorderConfig,
        har: &Path,
        output: Option<&Path>,
        parameterise: &[String],
    ) -> Result<()> {
        let (recorder, summary) = self.record_har(config, har).await?;
        tracing::info!(
            recorded = summary.recorded,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "HAR recorded"
        );

        for (host, index, template) in parse_parameterisations(parameterise)? {
            let outcome = recorder.parameterise(index, template, host).await?;
            tracing::info!(
                host = %outcome.host,
                path = %outcome.path,
                merged = outcome.merged,
                "parameterised"
            );
        }

        let document = recorder.document().await;
        let text = self.render(&document)?;
        match output {
            Some(path) => {
                tokio::fs::write(path, format!("{text}\n"))
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(
                    path = %path.display(),
                    operations = document.operation_count(),
                    "document written"
                );
            }
            None => println!("{text}"),
        }
        Ok(())
    }

    /// Print clustered endpoints grouped by host
    ///
    /// Endpoints keep first-seen order so `index` is what `--parameterise` expects.
    async fn endpoints(&self, config: &RecorderConfig, har: &Path) -> Result<()> {
        let (recorder, _) = self.record_har(config, har).await?;

        let hosts: Vec<_> = recorder
            .endpoints_by_host()
            .await
            .into_iter()
            .map(|group| {
                let endpoints: Vec<_> = group
                    .endpoints
                    .iter()
                    .enumerate()
                    .map(|(index, e)| json!({ "index": index, "summary": e.summary() }))
                    .collect();
                json!({ "host": group.host, "endpoints": endpoints })
            })
            .collect();

        println!("{}", self.render(&hosts)?);
        Ok(())
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        Ok(text)
    }
}

/// Split flattened `HOST INDEX TEMPLATE` triples
fn parse_parameterisations(values: &[String]) -> Result<Vec<(&str, usize, &str)>> {
    if values.len() % 3 != 0 {
        return Err(Error::config(
            "--parameterise takes exactly HOST INDEX TEMPLATE",
        ));
    }
    values
        .chunks(3)
        .map(|chunk| {
            let index = chunk[1].parse().map_err(|_| {
                Error::config(format!(
                    "--parameterise index must be a non-negative integer, got '{}'",
                    chunk[1]
                ))
            })?;
            Ok((chunk[0].as_str(), index, chunk[2].as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameterisations() {
        let values: Vec<String> = ["api.example.com", "2", "/users/{id}"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            parse_parameterisations(&values).unwrap(),
            vec![("api.example.com", 2, "/users/{id}")]
        );
    }

    #[test]
    fn test_parse_parameterisations_bad_index() {
        let values: Vec<String> = ["api.example.com", "first", "/users/{id}"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(parse_parameterisations(&values).is_err());
    }
}
