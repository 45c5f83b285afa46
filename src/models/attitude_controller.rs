use crate::models::common::Attitude3D;
use serde::{Deserialize, Serialize};

/// 1軸分のPIDゲインと角速度制限
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// 出力角速度の制限（rad/s、対称）
    pub rate_limit: f64,
}

impl AxisGains {
    pub fn new(kp: f64, ki: f64, kd: f64, rate_limit: f64) -> Self {
        Self { kp, ki, kd, rate_limit }
    }
}

/// 3軸分のゲイン
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttitudeGains {
    pub roll: AxisGains,
    pub pitch: AxisGains,
    pub yaw: AxisGains,
}

impl AttitudeGains {
    pub fn uniform(gains: AxisGains) -> Self {
        Self { roll: gains, pitch: gains, yaw: gains }
    }

    fn axes(&self) -> [AxisGains; 3] {
        [self.roll, self.pitch, self.yaw]
    }
}

/// 内側ループの姿勢制御器
///
/// roll/pitch/yaw の各軸で独立したPIDを実行し、機体角速度指令を出力します。
/// 積分値と前回誤差は `reset()` を呼ぶまで保持されます。
#[derive(Debug, Clone)]
pub struct AttitudeController {
    pub gains: AttitudeGains,
    integral: [f64; 3],
    prev_error: [f64; 3],
}

impl AttitudeController {
    pub fn new(gains: AttitudeGains) -> Self {
        Self {
            gains,
            integral: [0.0; 3],
            prev_error: [0.0; 3],
        }
    }

    /// 目標姿勢と現在姿勢から角速度指令（rad/s）を計算
    ///
    /// `dt <= 0` の場合、微分項はゼロとして扱います。
    pub fn compute(&mut self, desired: &Attitude3D, current: &Attitude3D, dt: f64) -> Attitude3D {
        let desired = desired.as_array();
        let current = current.as_array();
        let mut output = [0.0; 3];

        for (axis, gains) in self.gains.axes().iter().enumerate() {
            let error = desired[axis] - current[axis];
            self.integral[axis] += error * dt;
            let derivative = if dt > 0.0 {
                (error - self.prev_error[axis]) / dt
            } else {
                0.0
            };
            let raw = gains.kp * error + gains.ki * self.integral[axis] + gains.kd * derivative;
            output[axis] = raw.clamp(-gains.rate_limit, gains.rate_limit);
            self.prev_error[axis] = error;
        }

        Attitude3D::from_array(output)
    }

    /// 積分値と前回誤差をクリア
    pub fn reset(&mut self) {
        self.integral = [0.0; 3];
        self.prev_error = [0.0; 3];
    }

    pub fn integral(&self) -> Attitude3D {
        Attitude3D::from_array(self.integral)
    }

    pub fn prev_error(&self) -> Attitude3D {
        Attitude3D::from_array(self.prev_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> AttitudeController {
        AttitudeController::new(AttitudeGains {
            roll: AxisGains::new(4.0, 0.5, 0.2, 2.0),
            pitch: AxisGains::new(4.0, 0.5, 0.2, 2.0),
            yaw: AxisGains::new(2.0, 0.1, 0.1, 1.0),
        })
    }

    #[test]
    fn test_zero_dt_is_finite() {
        let mut controller = controller();
        let rates = controller.compute(&Attitude3D::new(0.1, -0.2, 0.3), &Attitude3D::default(), 0.0);
        for rate in rates.as_array() {
            assert!(rate.is_finite());
        }
        // 微分項・積分項ともに寄与しない
        assert_relative_eq!(rates.roll, 0.4, epsilon = 1e-12);
        assert_relative_eq!(rates.yaw, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_per_axis_clipping_is_independent() {
        let mut controller = controller();
        let rates = controller.compute(&Attitude3D::new(10.0, 0.01, -10.0), &Attitude3D::default(), 0.1);
        assert_relative_eq!(rates.roll, 2.0);
        assert_relative_eq!(rates.yaw, -1.0);
        assert!(rates.pitch.abs() < 2.0);
    }

    #[test]
    fn test_state_accumulates_until_reset() {
        let mut controller = controller();
        let desired = Attitude3D::new(0.2, 0.0, 0.0);
        let current = Attitude3D::default();
        controller.compute(&desired, &current, 0.1);
        controller.compute(&desired, &current, 0.1);
        assert_relative_eq!(controller.integral().roll, 0.04, epsilon = 1e-12);
        assert_relative_eq!(controller.prev_error().roll, 0.2, epsilon = 1e-12);

        controller.reset();
        assert_eq!(controller.integral(), Attitude3D::default());
        assert_eq!(controller.prev_error(), Attitude3D::default());
    }

    #[test]
    fn test_derivative_term_uses_previous_error() {
        let gains = AttitudeGains::uniform(AxisGains::new(0.0, 0.0, 1.0, 100.0));
        let mut controller = AttitudeController::new(gains);
        let current = Attitude3D::default();
        let first = controller.compute(&Attitude3D::new(0.5, 0.0, 0.0), &current, 0.1);
        assert_relative_eq!(first.roll, 5.0, epsilon = 1e-12);
        let second = controller.compute(&Attitude3D::new(0.5, 0.0, 0.0), &current, 0.1);
        assert_relative_eq!(second.roll, 0.0, epsilon = 1e-12);
    }
}
