//! Error types shared across the app.

use thiserror::Error;

/// Failure to load the topology document.
#[derive(Debug, Error)]
pub enum TopologyError {
	#[error("no browser window available")]
	NoWindow,
	#[error("request failed: {0}")]
	Request(String),
	#[error("server responded with HTTP {0}")]
	Status(u16),
	#[error("could not read response body: {0}")]
	Body(String),
	#[error("malformed topology payload: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Why a manually drawn sandbox edge was not turned into a pipe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdgeRejection {
	#[error("edge {0} starts and ends on the same junction")]
	SelfLoop(String),
	#[error("junction {0} is not part of the reservation")]
	UnknownJunction(String),
	#[error("pipe {0} already exists")]
	Duplicate(String),
}

/// Failure to read the embedded app configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("malformed app config: {0}")]
	Parse(#[from] serde_json::Error),
}
