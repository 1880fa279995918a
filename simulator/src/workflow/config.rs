use anyhow::Context;
use clap::ValueEnum;
use scancore::{PhysicalFrameDimensions, ScanOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::phantom::PhantomConfig;

/// Element type the phantom is converted as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Float,
    Byte,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProbeShape {
    Linear,
    Sector,
}

/// Probe frame in workflow units: centimetres and degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "probe", rename_all = "lowercase")]
pub enum FrameConfig {
    Linear {
        width: f64,
        depth: f64,
    },
    Sector {
        trajectory_length: f64,
        depth: f64,
        start_deg: f64,
        end_deg: f64,
    },
}

impl FrameConfig {
    pub fn default_for(shape: ProbeShape) -> Self {
        match shape {
            ProbeShape::Linear => FrameConfig::Linear {
                width: 3.8,
                depth: 6.0,
            },
            ProbeShape::Sector => FrameConfig::Sector {
                trajectory_length: 5.0,
                depth: 12.0,
                start_deg: -30.0,
                end_deg: 30.0,
            },
        }
    }

    pub fn to_frame(&self) -> PhysicalFrameDimensions {
        match *self {
            FrameConfig::Linear { width, depth } => PhysicalFrameDimensions::rectangle(width, depth),
            FrameConfig::Sector {
                trajectory_length,
                depth,
                start_deg,
                end_deg,
            } => PhysicalFrameDimensions::sector(
                trajectory_length,
                depth,
                start_deg.to_radians(),
                end_deg.to_radians(),
            ),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::default_for(ProbeShape::Sector)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub phantom: PhantomConfig,
    pub frame: FrameConfig,
    /// Pixels per centimetre.
    pub density: f64,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub flip: bool,
    /// Grid spacing in centimetres; no grid when absent.
    pub grid_step: Option<f64>,
    pub palette: bool,
    pub element: ElementKind,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            phantom: PhantomConfig::default(),
            frame: FrameConfig::default(),
            density: ScanOptions::default().density,
            rows: None,
            cols: None,
            flip: false,
            grid_step: None,
            palette: false,
            element: ElementKind::Float,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(shape: ProbeShape, rays: usize, samples: usize, density: f64) -> Self {
        Self {
            phantom: PhantomConfig {
                rays,
                samples,
                ..PhantomConfig::default()
            },
            frame: FrameConfig::default_for(shape),
            density,
            ..Self::default()
        }
    }

    pub fn to_scan_options(&self) -> ScanOptions {
        let mut options = ScanOptions::with_frame(self.frame.to_frame()).density(self.density);
        if let Some(step) = self.grid_step {
            options = options.grid(step);
        }
        if self.palette {
            options = options.palette();
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_scan_options() {
        let cfg = WorkflowConfig::from_args(ProbeShape::Linear, 64, 256, 12.0);
        let options = cfg.to_scan_options();
        assert_eq!(options.density, 12.0);
        assert!(options.frame.is_linear());
        assert_eq!(options.frame.trajectory_length(), 3.8);
        assert_eq!(cfg.phantom.rays, 64);
        assert!(!options.draw_grid);
    }

    #[test]
    fn sector_degrees_become_radians() {
        let frame = FrameConfig::default_for(ProbeShape::Sector).to_frame();
        assert!((frame.end_angle() - 30f64.to_radians()).abs() < 1e-12);
        assert!((frame.angle_range() - 60f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"frame:\n  probe: linear\n  width: 4.0\n  depth: 5.0\ndensity: 8.0\ngrid_step: 1.0\nelement: byte\nphantom:\n  rays: 32\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(
            cfg.frame,
            FrameConfig::Linear {
                width: 4.0,
                depth: 5.0
            }
        );
        assert_eq!(cfg.element, ElementKind::Byte);
        assert_eq!(cfg.phantom.rays, 32);
        assert_eq!(cfg.phantom.samples, PhantomConfig::default().samples);
        assert!(cfg.to_scan_options().draw_grid);
    }
}
