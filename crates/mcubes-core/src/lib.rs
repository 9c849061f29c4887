//! Marching Cubes isosurface extraction.
//!
//! This crate provides the fundamental pipeline for turning a dense scalar
//! volume into an indexed triangle mesh:
//! - [`volume`] for ingesting a typed-array container into a [`Volume`]
//! - [`tables`] for the canonical topology tables
//! - [`classify`] and [`interpolate`] for per-cell classification and edge
//!   placement
//! - [`extract`] for the double-buffered plane-cache extractor, the core of
//!   this crate
//! - [`mesh`] for the output data model and the [`MeshSink`] trait
//! - [`writer`] for legacy VTK ASCII polydata serialization

#![allow(clippy::must_use_candidate)]

pub mod classify;
pub mod error;
pub mod extract;
pub mod interpolate;
pub mod mesh;
pub mod tables;
pub mod volume;
pub mod writer;

pub use error::{LoadError, LoadResult, WriteError, WriteResult};
pub use extract::{extract, extract_into};
pub use mesh::{BufferedMeshSink, Mesh, MeshSink, Triangle, Vertex};
pub use volume::{load_volume, Volume};
pub use writer::write_mesh;
