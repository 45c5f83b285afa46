use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 相対距離がこの値未満の場合は幾何的に縮退しているとみなす
pub const SEPARATION_FLOOR: f64 = 1e-6;

/// 重力加速度の大きさ（m/s²）
pub const GRAVITY: f64 = 9.81;

/// 3次元ベクトル
///
/// 位置・速度・加速度のいずれにも使用します。2次元の運動は z = 0 として表現します。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 位置ベクトル（m）
pub type Position3D = Vector3;
/// 速度ベクトル（m/s）
pub type Velocity3D = Vector3;
/// 加速度ベクトル（m/s²）
pub type Acceleration3D = Vector3;

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// XY平面上のベクトル
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.dot(self)
    }

    /// ベクトルの大きさ
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// 2点間の3次元距離
    pub fn distance_3d(&self, other: &Vector3) -> f64 {
        (*self - *other).magnitude()
    }

    /// 単位ベクトル化
    ///
    /// 大きさが `SEPARATION_FLOOR` 未満の場合は `None` を返します。
    pub fn normalize(&self) -> Option<Vector3> {
        let mag = self.magnitude();
        if mag < SEPARATION_FLOOR {
            None
        } else {
            Some(*self * (1.0 / mag))
        }
    }

    /// 大きさの上限クリップ
    ///
    /// 軸ごとのクランプではなく一様スケーリングで方向を保存します。
    pub fn clamp_magnitude(&self, max_magnitude: f64) -> Vector3 {
        let mag = self.magnitude();
        if mag > max_magnitude {
            *self * (max_magnitude / mag)
        } else {
            *self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// 姿勢（オイラー角、ラジアン）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude3D {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Attitude3D {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// (roll, pitch, yaw) の順の配列表現
    pub fn as_array(&self) -> [f64; 3] {
        [self.roll, self.pitch, self.yaw]
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// 要求加速度から目標姿勢を求める小角近似マッピング
    ///
    /// pitch = atan2(ax, az + g), roll = -atan2(ay, az + g), yaw = atan2(ay, ax)
    pub fn from_acceleration(acceleration: &Acceleration3D, gravity: f64) -> Self {
        let vertical = acceleration.z + gravity;
        Self::new(
            -acceleration.y.atan2(vertical),
            acceleration.x.atan2(vertical),
            acceleration.y.atan2(acceleration.x),
        )
    }
}

/// エンティティの運動状態
///
/// 所有者（ターゲットまたは追跡機）だけが更新します。`Copy` なので
/// 取得した値を書き換えても所有者の内部状態には影響しません。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: Position3D,
    pub velocity: Velocity3D,
    pub orientation: Option<Attitude3D>,
}

impl KinematicState {
    pub fn new(position: Position3D, velocity: Velocity3D) -> Self {
        Self { position, velocity, orientation: None }
    }

    pub fn with_orientation(mut self, orientation: Attitude3D) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// 他エンティティとの3次元距離
    pub fn separation(&self, other: &KinematicState) -> f64 {
        self.position.distance_3d(&other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cross_product_right_handed() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_normalize_below_floor_is_none() {
        assert!(Vector3::new(1e-7, 0.0, 0.0).normalize().is_none());
        let unit = Vector3::new(3.0, 4.0, 0.0).normalize().unwrap();
        assert_relative_eq!(unit.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp_magnitude_preserves_direction() {
        let v = Vector3::new(30.0, -40.0, 0.0);
        let clipped = v.clamp_magnitude(5.0);
        assert_relative_eq!(clipped.magnitude(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(clipped.x / clipped.y, v.x / v.y, epsilon = 1e-12);

        let small = Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(small.clamp_magnitude(5.0), small);
    }

    #[test]
    fn test_attitude_from_level_acceleration() {
        let attitude = Attitude3D::from_acceleration(&Vector3::ZERO, GRAVITY);
        assert_relative_eq!(attitude.roll, 0.0);
        assert_relative_eq!(attitude.pitch, 0.0);
        assert_relative_eq!(attitude.yaw, 0.0);

        let forward = Attitude3D::from_acceleration(&Vector3::new(GRAVITY, 0.0, 0.0), GRAVITY);
        assert_relative_eq!(forward.pitch, std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(forward.roll, 0.0);
    }

    #[test]
    fn test_kinematic_state_is_copied_out() {
        let state = KinematicState::new(Vector3::new(1.0, 2.0, 3.0), Vector3::ZERO);
        let mut copy = state;
        copy.position.x = 100.0;
        assert_eq!(state.position.x, 1.0);
    }
}
