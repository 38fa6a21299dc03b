pub mod filesystem;

pub use filesystem::{is_sidecar, list_boundary_files, SIDECAR_SUFFIX};
