//! Boundary core library: Rust backend for the interactive map service.
//!
//! Discovers boundary files (GeoJSON, GeoPackage) in a directory, resolves
//! per-file display metadata (embedded block, sidecar, defaults), and builds
//! styled, toggleable overlay layers onto a map surface. With the `python`
//! feature it is compiled as a Python extension module (`_boundary_core`)
//! via PyO3 so the web layer can call it directly.

pub mod assembler;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod geometry;
pub mod layers;
pub mod map;
pub mod metadata;
pub mod models;

#[cfg(feature = "python")]
pub mod python;

pub use assembler::{assemble, AssemblyReport, BoundaryAssembler, FileOutcome};
pub use errors::{BoundaryError, BoundaryResult};
