//! depinfo core library.
//!
//! This library turns a read-only build graph snapshot into the dependency
//! manifests consumed by an implicit-dependency scanner: one
//! `DependInfo.cmake` per buildable target and a project-wide list of them.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod depinfo_gen;
pub mod error;
pub mod graph;
pub mod link_closure;
pub mod output;
pub mod paths;
pub mod properties;
pub mod record;
pub mod runner;
