//! Playback sinks
//!
//! The player is opaque: it receives a [`PlayRequest`] and nothing is read back.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::PlaybackConfig;
use crate::errors::{AppError, AppResult};
use crate::models::PlayRequest;
use crate::utils::UrlUtils;

#[async_trait]
pub trait PlaybackSink: Send + Sync {
    async fn play(&self, request: &PlayRequest) -> AppResult<()>;
}

/// Launches an external player with the stream URL as its last argument
pub struct CommandPlaybackSink {
    command: String,
    args: Vec<String>,
}

impl CommandPlaybackSink {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }

    fn build_command(&self, request: &PlayRequest) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.arg(&request.stream_url);
        cmd.stdin(Stdio::null());
        cmd
    }
}

#[async_trait]
impl PlaybackSink for CommandPlaybackSink {
    async fn play(&self, request: &PlayRequest) -> AppResult<()> {
        debug!(
            "Starting player {} with args {:?} ({})",
            self.command, self.args, request.content_type
        );
        let child = self.build_command(request).spawn().map_err(|e| {
            AppError::playback(format!("Failed to start player {}: {}", self.command, e))
        })?;

        info!(
            "Playing {} (pid {:?})",
            UrlUtils::obfuscate_credentials(&request.stream_url),
            child.id()
        );
        Ok(())
    }
}

/// Sink used when no player is configured; it only logs the request
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPlaybackSink;

#[async_trait]
impl PlaybackSink for LoggingPlaybackSink {
    async fn play(&self, request: &PlayRequest) -> AppResult<()> {
        info!(
            "Play {} as {}",
            UrlUtils::obfuscate_credentials(&request.stream_url),
            request.content_type
        );
        Ok(())
    }
}

/// Pick the sink matching the playback configuration
pub fn sink_for(config: &PlaybackConfig) -> Box<dyn PlaybackSink> {
    if config.command.trim().is_empty() {
        Box::new(LoggingPlaybackSink)
    } else {
        Box::new(CommandPlaybackSink::new(config))
    }
}
