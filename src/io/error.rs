//! Error types and context management for engine operations

use std::fmt;

/// Main error type for all engine operations
#[derive(Debug)]
pub enum LifeError {
    /// Engine parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Requested seed pattern is not registered
    UnknownPattern {
        /// Name that failed to resolve
        name: String,
        /// Names the registry does know about
        available: Vec<&'static str>,
    },

    /// Worker thread pool could not be created
    ThreadPool {
        /// Underlying rayon build error
        source: rayon::ThreadPoolBuildError,
    },

    /// Compute device rejected a command
    ///
    /// Fatal: the accelerator backend never retries a submission.
    DeviceSubmission {
        /// Device operation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
        /// Generation being submitted when the failure occurred
        generation: Option<u32>,
    },

    /// Message passing between ranks failed
    Communication {
        /// Rank that observed the failure
        rank: usize,
        /// Communication operation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
        /// Generation in progress when the failure occurred
        generation: Option<u32>,
    },
}

impl fmt::Display for LifeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::UnknownPattern { name, available } => {
                write!(
                    f,
                    "Unknown pattern '{name}' (available: {})",
                    available.join(", ")
                )
            }
            Self::ThreadPool { source } => {
                write!(f, "Failed to build worker pool: {source}")
            }
            Self::DeviceSubmission {
                operation,
                reason,
                generation,
            } => {
                write!(f, "Device {operation} failed: {reason}")?;
                if let Some(generation) = generation {
                    write!(f, " (generation {generation})")?;
                }
                Ok(())
            }
            Self::Communication {
                rank,
                operation,
                reason,
                generation,
            } => {
                write!(f, "Rank {rank} failed during {operation}: {reason}")?;
                if let Some(generation) = generation {
                    write!(f, " (generation {generation})")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LifeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadPool { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for engine results
pub type Result<T> = std::result::Result<T, LifeError>;

/// Enriches error messages with simulation state information
pub trait WithContext<T> {
    /// Attach the generation that was in progress
    ///
    /// # Errors
    ///
    /// Propagates the original error with the generation applied
    fn with_generation(self, generation: u32) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<LifeError>,
{
    fn with_generation(self, generation: u32) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only failures that happen mid-run carry a generation
            match &mut error {
                LifeError::DeviceSubmission { generation: slot, .. }
                | LifeError::Communication { generation: slot, .. } => {
                    *slot = Some(generation);
                }
                _ => {}
            }
            error
        })
    }
}

impl From<rayon::ThreadPoolBuildError> for LifeError {
    fn from(source: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool { source }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> LifeError {
    LifeError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a device submission error
pub fn device_error(operation: &'static str, reason: &impl ToString) -> LifeError {
    LifeError::DeviceSubmission {
        operation,
        reason: reason.to_string(),
        generation: None,
    }
}

/// Create a communication error observed by `rank`
pub fn communication_error(
    rank: usize,
    operation: &'static str,
    reason: &impl ToString,
) -> LifeError {
    LifeError::Communication {
        rank,
        operation,
        reason: reason.to_string(),
        generation: None,
    }
}
