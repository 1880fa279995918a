use serde::{Deserialize, Serialize};

/// Physical shape of a scan frame.
///
/// Lengths share one linear unit (centimetres throughout this workspace);
/// angles are in radians, measured from the probe axis. A linear probe has
/// `start_angle == end_angle == 0`; a sector probe has `end_angle > start_angle`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalFrameDimensions {
    start_angle: f64,
    end_angle: f64,
    steering_angle: f64,
    trajectory_length: f64,
    depth_range: f64,
}

impl PhysicalFrameDimensions {
    /// Frame of a linear probe: rays spread over `width`, sampled down to `height`.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let mut frame = Self::default();
        frame.set_rectangle(width, height);
        frame
    }

    /// Frame of a curved probe whose first samples lie on an arc of
    /// `trajectory_length` spanning `start_angle..end_angle`.
    pub fn sector(trajectory_length: f64, depth_range: f64, start_angle: f64, end_angle: f64) -> Self {
        let mut frame = Self::default();
        frame.set_sector(trajectory_length, depth_range, start_angle, end_angle);
        frame
    }

    pub fn set_rectangle(&mut self, width: f64, height: f64) {
        *self = Self {
            trajectory_length: width,
            depth_range: height,
            ..Self::default()
        };
    }

    pub fn set_sector(
        &mut self,
        trajectory_length: f64,
        depth_range: f64,
        start_angle: f64,
        end_angle: f64,
    ) {
        *self = Self {
            start_angle,
            end_angle,
            steering_angle: 0.0,
            trajectory_length,
            depth_range,
        };
    }

    /// Records the beam steering angle. It is carried for callers and does
    /// not take part in the conversion.
    pub fn with_steering(mut self, steering_angle: f64) -> Self {
        self.steering_angle = steering_angle;
        self
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    pub fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    pub fn trajectory_length(&self) -> f64 {
        self.trajectory_length
    }

    pub fn depth_range(&self) -> f64 {
        self.depth_range
    }

    pub fn angle_range(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Largest absolute ray angle.
    pub fn max_angle(&self) -> f64 {
        self.start_angle.abs().max(self.end_angle.abs())
    }

    /// Distance from the apex to the first sample. Zero marks a linear probe.
    pub fn r_min(&self) -> f64 {
        let range = self.angle_range();
        if range == 0.0 {
            0.0
        } else {
            self.trajectory_length / range
        }
    }

    pub fn r_max(&self) -> f64 {
        self.r_min() + self.depth_range
    }

    pub fn is_linear(&self) -> bool {
        self.angle_range() == 0.0
    }

    /// True when the frame carries no shape at all.
    pub fn is_degenerate(&self) -> bool {
        self.angle_range() == 0.0 && self.trajectory_length == 0.0 && self.r_max() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn default_frame_is_degenerate() {
        let frame = PhysicalFrameDimensions::default();
        assert!(frame.is_degenerate());
        assert_eq!(frame.r_min(), 0.0);
        assert_eq!(frame.r_max(), 0.0);
    }

    #[test]
    fn rectangle_has_no_apex_offset() {
        let frame = PhysicalFrameDimensions::rectangle(4.0, 6.0);
        assert!(frame.is_linear());
        assert!(!frame.is_degenerate());
        assert_eq!(frame.r_min(), 0.0);
        assert_eq!(frame.r_max(), 6.0);
        assert_eq!(frame.max_angle(), 0.0);
    }

    #[test]
    fn sector_radius_follows_arc_length() {
        let frame = PhysicalFrameDimensions::sector(2.0 * FRAC_PI_4, 10.0, -FRAC_PI_4, FRAC_PI_4);
        assert!(!frame.is_linear());
        assert!((frame.angle_range() - 2.0 * FRAC_PI_4).abs() < 1e-12);
        assert!((frame.r_min() - 1.0).abs() < 1e-12);
        assert!((frame.r_max() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn setting_a_frame_replaces_it_wholesale() {
        let mut frame =
            PhysicalFrameDimensions::sector(3.0, 8.0, -0.5, 0.7).with_steering(0.1);
        frame.set_rectangle(5.0, 5.0);
        assert_eq!(frame, PhysicalFrameDimensions::rectangle(5.0, 5.0));
        assert_eq!(frame.steering_angle(), 0.0);
        assert_eq!(frame.max_angle(), 0.0);
    }
}
