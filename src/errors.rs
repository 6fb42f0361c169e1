//! Error types for kernel operations.
//!
//! Capacity exhaustion and bad arguments are the only runtime failures the
//! kernel reports. Misuse from interrupt context is a documented precondition
//! and is only checked by debug assertions.

#![allow(clippy::uninlined_format_args)]

use crate::tasks::ButtonLine;
use core::fmt;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Any error a kernel operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KernelError {
    /// Thread creation errors
    Spawn(SpawnError),
    /// Periodic and button task registration errors
    Task(TaskError),
}

/// Errors that can occur while adding a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    /// No kernel has been registered
    NotInitialized,
    /// Every thread slot is in use
    PoolExhausted,
    /// Priority outside 0..=5
    InvalidPriority(u8),
    /// Requested stack exceeds the per-slot capacity (bytes)
    StackTooLarge(usize),
    /// Requested stack cannot hold the initial register frame (bytes)
    StackTooSmall(usize),
}

/// Errors that can occur while registering background tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskError {
    /// No kernel has been registered
    NotInitialized,
    /// Every hardware timer is already bound
    TableFull,
    /// Period of zero microseconds
    InvalidPeriod(u32),
    /// The button line already has a task bound
    LineInUse(ButtonLine),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Spawn(e) => write!(f, "Spawn error: {}", e),
            KernelError::Task(e) => write!(f, "Task error: {}", e),
        }
    }
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::NotInitialized => write!(f, "Kernel not registered"),
            SpawnError::PoolExhausted => write!(f, "No free thread slot"),
            SpawnError::InvalidPriority(prio) => write!(f, "Invalid priority: {}", prio),
            SpawnError::StackTooLarge(size) => write!(f, "Stack too large: {} bytes", size),
            SpawnError::StackTooSmall(size) => write!(f, "Stack too small: {} bytes", size),
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::NotInitialized => write!(f, "Kernel not registered"),
            TaskError::TableFull => write!(f, "No free periodic timer"),
            TaskError::InvalidPeriod(us) => write!(f, "Invalid period: {} us", us),
            TaskError::LineInUse(line) => write!(f, "Button line {:?} already bound", line),
        }
    }
}

impl From<SpawnError> for KernelError {
    fn from(err: SpawnError) -> Self {
        KernelError::Spawn(err)
    }
}

impl From<TaskError> for KernelError {
    fn from(err: TaskError) -> Self {
        KernelError::Task(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_display() {
        assert_eq!(SpawnError::PoolExhausted.to_string(), "No free thread slot");
        assert_eq!(
            SpawnError::StackTooLarge(1024).to_string(),
            "Stack too large: 1024 bytes"
        );
        assert_eq!(
            KernelError::from(TaskError::InvalidPeriod(0)).to_string(),
            "Task error: Invalid period: 0 us"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: KernelError = SpawnError::InvalidPriority(9).into();
        assert_eq!(err, KernelError::Spawn(SpawnError::InvalidPriority(9)));
    }
}
