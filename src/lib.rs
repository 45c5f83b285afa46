//! 追跡機・ターゲット交戦シミュレーション
//!
//! 誘導則（純追尾・比例航法）と位置・姿勢制御ループを組み合わせ、
//! 運動するターゲットへの迎撃を固定時間刻みでシミュレーションします。

pub mod batch;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scenario;
pub mod simulation;
