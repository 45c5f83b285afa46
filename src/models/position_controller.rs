use crate::models::common::{Acceleration3D, Position3D, Velocity3D};

/// 外側ループの位置制御器（PD則）
///
/// 積分項を持たないため windup は発生せず、出力は常に `max_acceleration` 以下です。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionController {
    /// 比例ゲイン
    pub kp: f64,
    /// 微分ゲイン
    pub kd: f64,
    /// 最大加速度（m/s²）
    pub max_acceleration: f64,
}

impl PositionController {
    pub fn new(kp: f64, kd: f64, max_acceleration: f64) -> Self {
        Self { kp, kd, max_acceleration }
    }

    /// 要求位置・要求速度から加速度指令を計算
    ///
    /// `acc = kp * (desired_pos - current_pos) + kd * (desired_vel - current_vel)` を
    /// 大きさ `max_acceleration` で一様スケーリングして飽和させます。
    pub fn compute_acceleration(
        &self,
        current_pos: Position3D,
        current_vel: Velocity3D,
        desired_pos: Position3D,
        desired_vel: Velocity3D,
    ) -> Acceleration3D {
        let position_error = desired_pos - current_pos;
        let velocity_error = desired_vel - current_vel;
        let command = position_error * self.kp + velocity_error * self.kd;
        self.saturate(command)
    }

    /// 加速度ベクトル飽和
    pub fn saturate(&self, acceleration: Acceleration3D) -> Acceleration3D {
        acceleration.clamp_magnitude(self.max_acceleration)
    }
}

impl Default for PositionController {
    fn default() -> Self {
        Self::new(2.0, 1.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn test_pd_law_unsaturated() {
        let controller = PositionController::new(1.2, 0.6, 100.0);
        let acc = controller.compute_acceleration(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(3.0, 0.0, 0.0),
            Vector3::ZERO,
        );
        assert_relative_eq!(acc.x, 2.4, epsilon = 1e-12);
        assert_relative_eq!(acc.y, -0.6, epsilon = 1e-12);
        assert_relative_eq!(acc.z, 0.0);
    }

    #[test]
    fn test_output_never_exceeds_limit() {
        let controller = PositionController::new(2.0, 1.0, 3.0);
        for scale in [1e-3, 1.0, 10.0, 1e3, 1e9] {
            let acc = controller.compute_acceleration(
                Vector3::ZERO,
                Vector3::new(-0.3, 0.1, 0.2) * scale,
                Vector3::new(1.0, -2.0, 0.5) * scale,
                Vector3::ZERO,
            );
            assert!(acc.magnitude() <= 3.0 + 1e-12, "scale {} -> {}", scale, acc.magnitude());
        }
    }

    #[test]
    fn test_clipping_preserves_direction() {
        let controller = PositionController::new(2.0, 1.0, 3.0);
        let current_vel = Vector3::new(1.0, 2.0, 0.0);
        let desired_pos = Vector3::new(50.0, -20.0, 10.0);
        let acc = controller.compute_acceleration(Vector3::ZERO, current_vel, desired_pos, Vector3::ZERO);
        let raw = desired_pos * 2.0 - current_vel;

        assert_relative_eq!(acc.magnitude(), 3.0, epsilon = 1e-12);
        let unit_raw = raw.normalize().unwrap();
        let unit_acc = acc.normalize().unwrap();
        assert_relative_eq!(unit_raw.dot(&unit_acc), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_saturate_direct_command() {
        let controller = PositionController::new(2.0, 1.0, 20.0);
        let clipped = controller.saturate(Vector3::new(0.0, 300.0, -400.0));
        assert_relative_eq!(clipped.magnitude(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(clipped.y, 12.0, epsilon = 1e-12);
        assert_relative_eq!(clipped.z, -16.0, epsilon = 1e-12);
    }
}
