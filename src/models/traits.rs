use crate::models::common::*;

/// ターゲット運動モデルの基本インターフェース
pub trait MotionModel {
    /// 時間刻み `dt` だけ状態を進める（`dt <= 0` は何もしない）
    fn update(&mut self, dt: f64);

    /// 現在の運動状態のコピーを取得
    fn get_state(&self) -> KinematicState;

    /// 生成からの経過時間（秒）
    fn elapsed(&self) -> f64;
}

/// 誘導則が出力するコマンド
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidanceCommand {
    /// 要求速度（位置制御器を経由して加速度に変換）
    DesiredVelocity(Velocity3D),
    /// 直接の加速度指令
    Acceleration(Acceleration3D),
}

impl GuidanceCommand {
    pub fn vector(&self) -> Vector3 {
        match self {
            GuidanceCommand::DesiredVelocity(v) => *v,
            GuidanceCommand::Acceleration(a) => *a,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.vector() == Vector3::ZERO
    }
}

/// 誘導則のインターフェース
///
/// 誘導則は呼び出し間で状態を持たず、調整定数のみを保持します。
pub trait Guidance {
    /// 追跡機とターゲットの運動状態から誘導コマンドを計算
    fn compute_command(&self, pursuer: &KinematicState, target: &KinematicState) -> GuidanceCommand;

    /// ターゲット速度を入力として必要とするか
    fn requires_target_velocity(&self) -> bool;
}
