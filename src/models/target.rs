use crate::models::{
    common::{KinematicState, Position3D, Vector3, Velocity3D},
    traits::MotionModel,
};
use tracing::trace;

/// 等速直線運動ターゲット
#[derive(Debug, Clone)]
pub struct StraightLineTarget {
    /// 現在位置
    pub position: Position3D,
    /// 一定の速度ベクトル
    pub velocity: Velocity3D,
    /// 経過時間（秒）
    pub elapsed: f64,
}

impl StraightLineTarget {
    pub fn new(position: Position3D, velocity: Velocity3D) -> Self {
        Self { position, velocity, elapsed: 0.0 }
    }

    /// 進行方向ベクトルと速さから作成
    ///
    /// 方向ベクトルがゼロの場合は `None` を返します。
    pub fn from_heading(position: Position3D, heading: Vector3, speed: f64) -> Option<Self> {
        heading
            .normalize()
            .map(|unit| Self::new(position, unit * speed))
    }
}

impl MotionModel for StraightLineTarget {
    fn update(&mut self, dt: f64) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.position += self.velocity * dt;
        self.elapsed += dt;
    }

    fn get_state(&self) -> KinematicState {
        KinematicState::new(self.position, self.velocity)
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// 一定旋回率ターゲット（平面内の円弧運動）
///
/// 毎ステップ、方位を `turn_rate * dt` だけ進めてから新しい方位に沿って
/// `speed * dt` だけ移動します。旋回率 0 の場合は直線運動と一致します。
#[derive(Debug, Clone)]
pub struct ConstantTurnTarget {
    pub position: Position3D,
    /// XY平面での方位（ラジアン、+X軸から反時計回り）
    pub heading: f64,
    /// 速さ（m/s）
    pub speed: f64,
    /// 旋回率（rad/s）
    pub turn_rate: f64,
    pub elapsed: f64,
}

impl ConstantTurnTarget {
    pub fn new(position: Position3D, heading: f64, speed: f64, turn_rate: f64) -> Self {
        Self { position, heading, speed, turn_rate, elapsed: 0.0 }
    }

    /// 方位から決まる現在の速度ベクトル
    pub fn velocity(&self) -> Velocity3D {
        Vector3::planar(self.heading.cos(), self.heading.sin()) * self.speed
    }

    /// 旋回中心（旋回率 0 の場合は `None`）
    ///
    /// 離散更新では中心は初期状態から計算した理想円の中心になります。
    pub fn turn_center(&self) -> Option<Position3D> {
        if self.turn_rate == 0.0 {
            return None;
        }
        let radius = self.speed / self.turn_rate;
        Some(self.position + Vector3::planar(-self.heading.sin(), self.heading.cos()) * radius)
    }
}

impl MotionModel for ConstantTurnTarget {
    fn update(&mut self, dt: f64) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.heading += self.turn_rate * dt;
        self.position += self.velocity() * dt;
        self.elapsed += dt;
    }

    fn get_state(&self) -> KinematicState {
        KinematicState::new(self.position, self.velocity())
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// 一定旋回率＋上昇のターゲット（3次元らせん運動）
///
/// 位相 `phase` が `turn_rate` で単調に進み、位置は旋回中心のまわりの半径
/// `radius` の円周上にあり、高度は `climb_rate` で線形に増加します。
/// 速度は位相から決まる接線方向の速度に上昇率を加えたものです。
#[derive(Debug, Clone)]
pub struct HelixTarget {
    /// 旋回中心（z は初期高度）
    pub center: Position3D,
    pub radius: f64,
    /// 角速度（rad/s）
    pub turn_rate: f64,
    /// 上昇率（m/s）
    pub climb_rate: f64,
    /// 現在の位相（ラジアン）
    pub phase: f64,
    pub elapsed: f64,
}

impl HelixTarget {
    pub fn new(center: Position3D, radius: f64, turn_rate: f64, climb_rate: f64, initial_phase: f64) -> Self {
        Self {
            center,
            radius,
            turn_rate,
            climb_rate,
            phase: initial_phase,
            elapsed: 0.0,
        }
    }

    pub fn position(&self) -> Position3D {
        Vector3::new(
            self.center.x + self.radius * self.phase.cos(),
            self.center.y + self.radius * self.phase.sin(),
            self.center.z + self.climb_rate * self.elapsed,
        )
    }

    pub fn velocity(&self) -> Velocity3D {
        let tangential = self.radius * self.turn_rate;
        Vector3::new(
            -tangential * self.phase.sin(),
            tangential * self.phase.cos(),
            self.climb_rate,
        )
    }
}

impl MotionModel for HelixTarget {
    fn update(&mut self, dt: f64) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.phase += self.turn_rate * dt;
        self.elapsed += dt;
    }

    fn get_state(&self) -> KinematicState {
        KinematicState::new(self.position(), self.velocity())
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// ターゲット運動モデル（閉じた列挙）
#[derive(Debug, Clone)]
pub enum TargetMotion {
    StraightLine(StraightLineTarget),
    ConstantTurn(ConstantTurnTarget),
    Helix(HelixTarget),
}

impl TargetMotion {
    pub fn name(&self) -> &'static str {
        match self {
            TargetMotion::StraightLine(_) => "straight_line",
            TargetMotion::ConstantTurn(_) => "constant_turn",
            TargetMotion::Helix(_) => "helix",
        }
    }
}

impl MotionModel for TargetMotion {
    fn update(&mut self, dt: f64) {
        if dt <= 0.0 || !dt.is_finite() {
            trace!(dt, model = self.name(), "TARGET_UPDATE_SKIPPED: 非正の時間刻みは無視されます");
            return;
        }
        match self {
            TargetMotion::StraightLine(target) => target.update(dt),
            TargetMotion::ConstantTurn(target) => target.update(dt),
            TargetMotion::Helix(target) => target.update(dt),
        }
    }

    fn get_state(&self) -> KinematicState {
        match self {
            TargetMotion::StraightLine(target) => target.get_state(),
            TargetMotion::ConstantTurn(target) => target.get_state(),
            TargetMotion::Helix(target) => target.get_state(),
        }
    }

    fn elapsed(&self) -> f64 {
        match self {
            TargetMotion::StraightLine(target) => target.elapsed(),
            TargetMotion::ConstantTurn(target) => target.elapsed(),
            TargetMotion::Helix(target) => target.elapsed(),
        }
    }
}
