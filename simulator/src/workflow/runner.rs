use crate::generator::phantom::{build_phantom, to_bytes};
use crate::workflow::config::{ElementKind, WorkflowConfig};
use anyhow::Context;
use log::info;
use ndarray::Array2;
use scancore::{RasterDimensions, ScanConverter, ScanSample};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub rows: usize,
    pub cols: usize,
    pub density: f64,
    pub dimensions: RasterDimensions,
    pub neighbors: usize,
    pub near_field: usize,
    pub background: usize,
    /// Mean raster level as a fraction of full scale.
    pub mean_level: f64,
    pub elapsed_ms: f64,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let grid = build_phantom(&self.config.phantom).context("generating phantom")?;
        match self.config.element {
            ElementKind::Float => self.convert(grid, f64::from),
            ElementKind::Byte => self.convert(to_bytes(&grid), |value: u8| {
                f64::from(value) / f64::from(u8::MAX)
            }),
        }
    }

    fn convert<T, F>(&self, source: Array2<T>, level: F) -> anyhow::Result<WorkflowResult>
    where
        T: ScanSample,
        F: Fn(T) -> f64,
    {
        let started = Instant::now();
        let mut converter = ScanConverter::new(source, self.config.to_scan_options());
        converter
            .set_flip(self.config.flip)
            .context("applying flip")?;
        converter
            .initialize(self.config.rows, self.config.cols)
            .context("initializing scan converter")?;
        converter.build().context("building converted image")?;

        let layout = converter
            .layout()
            .context("converter has no layout after initialization")?;
        let image = converter.converted_image();
        let mean_level =
            image.iter().map(|&value| level(value)).sum::<f64>() / image.len().max(1) as f64;
        let stats = converter.table_stats();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            "converted {}x{} source into {}x{} raster in {:.2} ms",
            converter.source().nrows(),
            converter.source().ncols(),
            layout.rows,
            layout.cols,
            elapsed_ms
        );

        Ok(WorkflowResult {
            rows: layout.rows,
            cols: layout.cols,
            density: layout.density,
            dimensions: converter.raster_dimensions(),
            neighbors: stats.neighbors,
            near_field: stats.near_field,
            background: stats.background,
            mean_level,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::ProbeShape;

    #[test]
    fn runner_executes_sector_workflow() {
        let cfg = WorkflowConfig::from_args(ProbeShape::Sector, 32, 128, 6.0);
        let result = Runner::new(cfg).execute().unwrap();
        assert!(result.rows > 0 && result.cols > 0);
        assert!(result.neighbors > 0);
        assert!(result.near_field > 0);
        assert_eq!(
            result.neighbors + result.near_field + result.background,
            result.rows * result.cols
        );
        assert!(result.mean_level > 0.0 && result.mean_level < 1.0);
    }

    #[test]
    fn runner_honours_requested_size_for_bytes() {
        let mut cfg = WorkflowConfig::from_args(ProbeShape::Linear, 32, 128, 10.0);
        cfg.element = ElementKind::Byte;
        cfg.rows = Some(90);
        cfg.cols = Some(60);
        cfg.flip = true;
        let result = Runner::new(cfg).execute().unwrap();
        assert_eq!((result.rows, result.cols), (90, 60));
        assert!((result.dimensions.v_max - 6.0).abs() < 1e-9);
        assert_eq!(result.near_field + result.neighbors + result.background, 90 * 60);
    }
}
