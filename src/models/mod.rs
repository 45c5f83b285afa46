// 基本的なデータ型と数学ユーティリティ
pub mod common;

// 運動モデル・誘導則の基本インターフェース（trait）定義
pub mod traits;

// 各コンポーネントの実装
pub mod target;
pub mod guidance;
pub mod position_controller;
pub mod attitude_controller;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use target::{TargetMotion, StraightLineTarget, ConstantTurnTarget, HelixTarget};
pub use guidance::{GuidanceLaw, GuidanceKind, PurePursuit, ProportionalNavigation, LOS_RATE_EPSILON};
pub use position_controller::PositionController;
pub use attitude_controller::{AttitudeController, AttitudeGains, AxisGains};
