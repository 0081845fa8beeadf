//! Turning the tracked target's position and size into a motion command

use crate::bbox::Bbox;
use crate::config::CommandConfig;
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Bounded steering and forward-speed hint for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionCommand {
    /// Desired heading change in radians. Positive when the target sits right
    /// of the image center.
    pub yaw: f64,
    /// Unitless forward displacement proxy. Positive when the target grew.
    pub forward_offset: f64,
}

impl MotionCommand {
    /// Goal pose in the robot's base frame: forward offset along x, no
    /// lateral or vertical displacement, heading as a rotation about z
    pub fn target_pose(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.forward_offset, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, self.yaw),
        )
    }
}

/// Maps target offsets and area changes to bounded commands
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    config: CommandConfig,
}

impl CommandGenerator {
    pub fn new(config: CommandConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// Build the command for a matched `target`. `previous_area` is the area of
    /// the last matched target and must be `None` right after a cold start.
    pub fn generate(
        &self,
        target: &Bbox,
        frame_width: u32,
        previous_area: Option<f64>,
    ) -> MotionCommand {
        MotionCommand {
            yaw: self.yaw(target, frame_width),
            forward_offset: self.forward_offset(target, previous_area),
        }
    }

    /// Linear in the target's offset from the image center, scaled so the
    /// frame edge maps to `max_yaw_rate`
    pub fn yaw(&self, target: &Bbox, frame_width: u32) -> f64 {
        let half_width = frame_width as f64 / 2.0;
        if half_width <= 0.0 {
            return 0.0;
        }

        let offset = target.center_x() - half_width;
        if offset.abs() <= self.config.deadband_offset {
            return 0.0;
        }

        let max = self.config.max_yaw_rate;
        (max * offset / half_width).clamp(-max, max)
    }

    /// Relative area change since the previous match, scaled by
    /// `max_forward_rate`
    pub fn forward_offset(&self, target: &Bbox, previous_area: Option<f64>) -> f64 {
        let Some(previous_area) = previous_area.filter(|area| *area > 0.0) else {
            return 0.0;
        };

        let delta = target.area() - previous_area;
        if delta.abs() <= self.config.deadband_area {
            return 0.0;
        }

        let max = self.config.max_forward_rate;
        (max * delta / previous_area).clamp(-max, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn generator() -> CommandGenerator {
        CommandGenerator::new(CommandConfig::default())
    }

    /// Box whose center sits `offset` px from the middle of a 640 px frame
    fn offset_box(offset: i64) -> Bbox {
        Bbox::new((320 + offset - 50) as u32, 0, 100, 200)
    }

    #[test]
    fn test_heading_deadband() {
        let g = generator();
        assert_eq!(g.yaw(&offset_box(25), 640), 0.0);
        assert_eq!(g.yaw(&offset_box(-25), 640), 0.0);

        assert_abs_diff_eq!(g.yaw(&offset_box(26), 640), 0.5 * 26.0 / 320.0);
        assert_abs_diff_eq!(g.yaw(&offset_box(-26), 640), -0.5 * 26.0 / 320.0);
    }

    #[test]
    fn test_yaw_bounded_at_frame_edge() {
        let g = generator();
        let at_edge = Bbox::new(620, 0, 40, 40);
        assert_abs_diff_eq!(g.yaw(&at_edge, 640), 0.5);

        let wide = CommandGenerator::new(CommandConfig {
            max_yaw_rate: 0.3,
            ..CommandConfig::default()
        });
        assert_abs_diff_eq!(wide.yaw(&Bbox::new(0, 0, 2, 2), 640), -0.3 * 319.0 / 320.0);
    }

    #[test]
    fn test_forward_suppressed_without_previous_area() {
        let g = generator();
        assert_eq!(g.forward_offset(&Bbox::new(0, 0, 300, 400), None), 0.0);
        assert_eq!(g.forward_offset(&Bbox::new(0, 0, 300, 400), Some(0.0)), 0.0);
    }

    #[test]
    fn test_forward_deadband() {
        let g = generator();
        // 50 x 401 = 20050, exactly the deadband above 20000
        assert_eq!(g.forward_offset(&Bbox::new(0, 0, 50, 401), Some(20000.0)), 0.0);
        // 1 x 20051, one past the deadband
        assert_abs_diff_eq!(
            g.forward_offset(&Bbox::new(0, 0, 1, 20051), Some(20000.0)),
            0.75 * 51.0 / 20000.0
        );
        // Shrinking target backs off
        assert_abs_diff_eq!(
            g.forward_offset(&Bbox::new(0, 0, 100, 150), Some(20000.0)),
            0.75 * -5000.0 / 20000.0
        );
    }

    #[test]
    fn test_forward_clamped() {
        let g = generator();
        // Area tripled: unclamped value would be 1.5
        assert_abs_diff_eq!(
            g.forward_offset(&Bbox::new(0, 0, 300, 200), Some(20000.0)),
            0.75
        );
    }

    #[test]
    fn test_generate() {
        let g = generator();
        let cmd = g.generate(&Bbox::new(280, 0, 120, 210), 640, Some(20000.0));
        assert_eq!(cmd.yaw, 0.0);
        assert_abs_diff_eq!(cmd.forward_offset, 0.75 * 5200.0 / 20000.0);
    }

    #[test]
    fn test_target_pose() {
        let cmd = MotionCommand {
            yaw: FRAC_PI_2,
            forward_offset: 0.2,
        };
        let pose = cmd.target_pose();

        assert_abs_diff_eq!(pose.translation.vector.x, 0.2);
        assert_abs_diff_eq!(pose.translation.vector.y, 0.0);
        assert_abs_diff_eq!(pose.translation.vector.z, 0.0);
        assert_abs_diff_eq!(pose.rotation.euler_angles().2, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.rotation.angle(), FRAC_PI_2, epsilon = 1e-12);
    }
}
