use std::io;

use thiserror::Error;

/// Rejected publishes. A conforming worker never triggers these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("step {step} is out of range for {max} steps")]
    StepOutOfRange { step: usize, max: usize },

    #[error("step {step} would move progress backwards from {last}")]
    Regressed { step: usize, last: usize },

    #[error("slot for step {step} has already been written")]
    SlotReused { step: usize },

    #[error("step {step} published after the channel was closed")]
    Closed { step: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("label table must contain at least one label")]
    EmptyLabels,

    #[error("max steps must be between 1 and {limit}, got {got}")]
    MaxSteps { got: usize, limit: usize },

    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    #[error("channel holds {channel} steps but the run needs {run}")]
    ChannelSize { channel: usize, run: usize },
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to write progress line: {0}")]
    Write(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(io::Error),

    #[error("worker failed: {0}")]
    Worker(#[from] ChannelError),

    #[error("worker thread panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}
