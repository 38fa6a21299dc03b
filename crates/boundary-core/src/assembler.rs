//! Per-file boundary assembly with error isolation.
//!
//! Each discovered file goes through read -> resolve -> build -> attach.
//! A failure at any step skips that file only; the run continues and the
//! outcome is recorded in the returned [`AssemblyReport`].

use std::path::Path;

use tracing::{info, warn};

use crate::discovery::list_boundary_files;
use crate::errors::BoundaryResult;
use crate::geometry::GeometrySource;
use crate::layers::{build_layer, OverlayLayer};
use crate::map::MapSurface;
use crate::metadata::resolve;
use crate::models::BoundaryFile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Attached { file: String, title: String },
    Skipped { file: String, reason: String },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Attached { file, .. } | Self::Skipped { file, .. } => file,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached { .. })
    }
}

/// Outcomes of one run, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub outcomes: Vec<FileOutcome>,
}

impl AssemblyReport {
    pub fn attached(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_attached()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.attached()
    }
}

#[derive(Default)]
pub struct BoundaryAssembler {
    source: GeometrySource,
}

impl BoundaryAssembler {
    pub fn new(source: GeometrySource) -> Self {
        Self { source }
    }

    /// Read, resolve and build one file's overlay.
    pub fn build_overlay(&self, file: &BoundaryFile) -> BoundaryResult<OverlayLayer> {
        let collection = self.source.read(file)?;
        let meta = resolve(file, &collection);
        Ok(build_layer(collection, meta))
    }

    fn each_overlay(
        &self,
        dir: &Path,
        mut attach: impl FnMut(OverlayLayer),
    ) -> BoundaryResult<AssemblyReport> {
        let mut report = AssemblyReport::default();
        for file in list_boundary_files(dir)? {
            let name = file.file_name();
            match self.build_overlay(&file) {
                Ok(layer) => {
                    report.outcomes.push(FileOutcome::Attached {
                        file: name,
                        title: layer.name.clone(),
                    });
                    attach(layer);
                }
                Err(e) => {
                    warn!("Skipping {} due to error: {}", name, e);
                    report.outcomes.push(FileOutcome::Skipped {
                        file: name,
                        reason: e.to_string(),
                    });
                }
            }
        }
        info!(
            "Boundary assembly for {}: {} attached, {} skipped",
            dir.display(),
            report.attached(),
            report.skipped()
        );
        Ok(report)
    }

    /// Build overlays for every file in `dir` without attaching them.
    pub fn build_all(&self, dir: &Path) -> BoundaryResult<(Vec<OverlayLayer>, AssemblyReport)> {
        let mut layers = Vec::new();
        let report = self.each_overlay(dir, |layer| layers.push(layer))?;
        Ok((layers, report))
    }

    /// Attach every buildable overlay in `dir` to `surface`, in file-name
    /// order. Only directory-level IO errors are returned.
    pub fn run(&self, dir: &Path, surface: &mut dyn MapSurface) -> BoundaryResult<AssemblyReport> {
        self.each_overlay(dir, |layer| surface.add_overlay(layer))
    }
}

/// Attach boundary overlays from `dir` using every compiled-in backend.
pub fn assemble(dir: &Path, surface: &mut dyn MapSurface) -> BoundaryResult<AssemblyReport> {
    BoundaryAssembler::default().run(dir, surface)
}
