// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

//! This crate provides the _track_ capabilities for the EPON simulator.
//!
//! _Track_ is the combination of text-based human-readable messages emitted
//! at various levels of verbosity (from `Trace` through to `Error`) and the
//! hierarchy of simulation [`Entities`](crate::entity::Entity) that emit them.
//!
//! Every pipeline stage owns an entity. Whether a message is formatted at all
//! is decided per entity by the [`Tracker`], so stages can log every column
//! they move at `Trace` level without cost when that level is disabled.

// Enable warnings for missing documentation
#![warn(missing_docs)]

use std::fmt;

pub use log;

pub mod builder;
pub mod entity;
pub mod test_helpers;

/// Include the trackers.
pub mod tracker;
pub use tracker::{Track, Tracker};

/// A type alias for objects that receive _log_ events.
pub type Writer = Box<dyn std::io::Write>;

/// Unique identifier given to each [`Entity`](crate::entity::Entity).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id value which indicates where there is no valid entity
pub const NO_ID: Id = Id(0);

/// The root Id from which all other Ids are derived
pub const ROOT: Id = Id(1);

/// Base macro for log messages of all levels.
///
/// The message is only formatted if the entity's [`Tracker`] has the entity
/// enabled at the requested level.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => (
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.log($entity.id, $lvl, format_args!($($arg)+));
        }
    );
}

/// The `trace` macro emits a message at level `log::Level::Trace`
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// The `debug` macro emits a message at level `log::Level::Debug`
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// The `info` macro emits a message at level `log::Level::Info`
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// The `warn` macro emits a message at level `log::Level::Warn`
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// The `error` macro emits a message at level `log::Level::Error`
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
