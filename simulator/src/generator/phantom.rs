use anyhow::Context;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic ray × sample phantom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhantomConfig {
    pub rays: usize,
    pub samples: usize,
    pub seed: u64,
    /// Relative speckle amplitude.
    pub speckle: f32,
    /// Fraction of echo strength lost between the first and last sample.
    pub attenuation: f32,
    /// Depths, as fractions of the ray length, of point reflectors on the centre ray.
    pub reflectors: Vec<f32>,
    /// Depth fraction of an anechoic cyst centred on the middle ray.
    pub cyst_depth: Option<f32>,
    pub cyst_radius: f32,
}

impl Default for PhantomConfig {
    fn default() -> Self {
        Self {
            rays: 128,
            samples: 512,
            seed: 0,
            speckle: 0.35,
            attenuation: 0.6,
            reflectors: vec![0.25, 0.5, 0.75],
            cyst_depth: Some(0.6),
            cyst_radius: 0.08,
        }
    }
}

impl PhantomConfig {
    fn normalized_rays(&self) -> usize {
        self.rays.max(1)
    }

    fn normalized_samples(&self) -> usize {
        self.samples.max(1)
    }
}

/// Echo levels in `[0, 1]`, indexed `[ray, sample]`.
pub fn build_phantom(config: &PhantomConfig) -> anyhow::Result<Array2<f32>> {
    let rays = config.normalized_rays();
    let samples = config.normalized_samples();
    rays.checked_mul(samples)
        .context("overflow computing phantom size")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let speckle = config.speckle.abs();
    let centre_ray = (rays as f32 - 1.0) / 2.0;
    let depth_scale = (samples - 1).max(1) as f32;
    let reflector_width = 1.5 / depth_scale;

    let grid = Array2::from_shape_fn((rays, samples), |(ray, sample)| {
        let depth = sample as f32 / depth_scale;
        let lateral = (ray as f32 - centre_ray) / rays as f32;
        let envelope = 1.0 - config.attenuation * depth;
        let mut value = 0.4 * envelope * (1.0 + rng.gen_range(-speckle..=speckle));

        if let Some(cyst_depth) = config.cyst_depth {
            if lateral.hypot(depth - cyst_depth) < config.cyst_radius {
                value *= 0.05;
            }
        }
        let on_centre_ray = (ray as f32 - centre_ray).abs() < 1.5;
        if on_centre_ray
            && config
                .reflectors
                .iter()
                .any(|&target| (depth - target).abs() < reflector_width)
        {
            value = 1.0;
        }
        value.clamp(0.0, 1.0)
    });

    Ok(grid)
}

/// Quantizes echo levels to 8 bits.
pub fn to_bytes(grid: &Array2<f32>) -> Array2<u8> {
    grid.mapv(|value| (value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phantom_has_requested_shape_and_range() {
        let config = PhantomConfig {
            rays: 16,
            samples: 64,
            ..Default::default()
        };
        let grid = build_phantom(&config).unwrap();
        assert_eq!(grid.dim(), (16, 64));
        assert!(grid.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn seeded_phantoms_repeat() {
        let config = PhantomConfig {
            rays: 8,
            samples: 32,
            seed: 7,
            ..Default::default()
        };
        assert_eq!(build_phantom(&config).unwrap(), build_phantom(&config).unwrap());
    }

    #[test]
    fn reflectors_and_cyst_shape_the_centre_ray() {
        let config = PhantomConfig {
            rays: 9,
            samples: 101,
            speckle: 0.0,
            reflectors: vec![0.2],
            cyst_depth: Some(0.6),
            cyst_radius: 0.1,
            ..Default::default()
        };
        let grid = build_phantom(&config).unwrap();
        assert_eq!(grid[[4, 20]], 1.0);
        assert!(grid[[4, 60]] < 0.02);
        assert!(grid[[0, 60]] > 0.1);
    }

    #[test]
    fn bytes_span_full_scale() {
        let grid = Array2::from_shape_vec((1, 3), vec![0.0, 0.5, 1.0]).unwrap();
        assert_eq!(to_bytes(&grid).into_raw_vec(), vec![0, 128, 255]);
    }
}
