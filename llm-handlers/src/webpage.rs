//! Webpage content extraction.
//!
//! [`CommandExtractor`] runs an external program with the URL as its last argument and returns
//! its trimmed stdout. A non-zero exit code or a timeout is an [`DbotError::Extraction`].

use async_trait::async_trait;
use dbot_core::{DbotError, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Readable text of a web page.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    timeout: Duration,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            dir: None,
            timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    /// Parses a whitespace-separated command line such as `node index.js`.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| DbotError::Config("extractor command is empty".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ContentExtractor for CommandExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(url).kill_on_drop(true);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| DbotError::Extraction(format!("extractor timed out for {}", url)))?
            .map_err(|e| {
                DbotError::Extraction(format!("failed to run '{}': {}", self.program, e))
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!(
                exit_code = code,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Content extractor failed"
            );
            return Err(DbotError::Extraction(format!(
                "extractor exited with code {}",
                code
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(url = %url, chars = text.chars().count(), "Content extracted");
        Ok(text)
    }
}
