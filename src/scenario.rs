use crate::models::{
    AttitudeController, AttitudeGains, AxisGains, ConstantTurnTarget, GuidanceKind, GuidanceLaw,
    HelixTarget, PositionController, StraightLineTarget, TargetMotion, Vector3,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub dt_s: f64,
    pub steps: u32,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PositionConfig {
    pub x_m: f64,
    pub y_m: f64,
    #[serde(default)]
    pub z_m: f64,
}

impl PositionConfig {
    pub fn to_vector(&self) -> Vector3 {
        Vector3::new(self.x_m, self.y_m, self.z_m)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct VelocityConfig {
    pub x_mps: f64,
    pub y_mps: f64,
    #[serde(default)]
    pub z_mps: f64,
}

impl VelocityConfig {
    pub fn to_vector(&self) -> Vector3 {
        Vector3::new(self.x_mps, self.y_mps, self.z_mps)
    }
}

/// ターゲット運動モデル設定（`model` で種別を指定）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TargetConfig {
    StraightLine {
        position: PositionConfig,
        heading: VelocityConfig,
        speed_mps: f64,
    },
    ConstantTurn {
        position: PositionConfig,
        heading_rad: f64,
        speed_mps: f64,
        turn_rate_rad_s: f64,
    },
    Helix {
        center: PositionConfig,
        radius_m: f64,
        turn_rate_rad_s: f64,
        climb_rate_mps: f64,
        #[serde(default)]
        initial_phase_rad: f64,
    },
}

impl TargetConfig {
    /// 設定からターゲット運動モデルを生成
    pub fn build_motion(&self) -> Result<TargetMotion, ScenarioError> {
        match self {
            TargetConfig::StraightLine { position, heading, speed_mps } => {
                StraightLineTarget::from_heading(position.to_vector(), heading.to_vector(), *speed_mps)
                    .map(TargetMotion::StraightLine)
                    .ok_or_else(|| ScenarioError::ValidationError("target heading must be non-zero".to_string()))
            }
            TargetConfig::ConstantTurn { position, heading_rad, speed_mps, turn_rate_rad_s } => {
                Ok(TargetMotion::ConstantTurn(ConstantTurnTarget::new(
                    position.to_vector(),
                    *heading_rad,
                    *speed_mps,
                    *turn_rate_rad_s,
                )))
            }
            TargetConfig::Helix { center, radius_m, turn_rate_rad_s, climb_rate_mps, initial_phase_rad } => {
                Ok(TargetMotion::Helix(HelixTarget::new(
                    center.to_vector(),
                    *radius_m,
                    *turn_rate_rad_s,
                    *climb_rate_mps,
                    *initial_phase_rad,
                )))
            }
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            TargetConfig::StraightLine { .. } => "straight_line",
            TargetConfig::ConstantTurn { .. } => "constant_turn",
            TargetConfig::Helix { .. } => "helix",
        }
    }
}

/// 追跡機の初期状態
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PursuerConfig {
    pub position: PositionConfig,
    #[serde(default)]
    pub velocity: VelocityConfig,
}

/// 誘導則設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuidanceConfig {
    pub law: GuidanceKind,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(rename = "N", alias = "nav_constant", default = "default_nav_constant")]
    pub nav_constant: f64,
}

fn default_gain() -> f64 {
    1.0
}

fn default_nav_constant() -> f64 {
    3.0
}

impl GuidanceConfig {
    pub fn build_law(&self) -> GuidanceLaw {
        GuidanceLaw::from_kind(self.law, self.gain, self.nav_constant)
    }
}

/// 位置制御器設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PositionControllerConfig {
    pub kp: f64,
    pub kd: f64,
    pub max_accel_mps2: f64,
}

impl PositionControllerConfig {
    pub fn build_controller(&self) -> PositionController {
        PositionController::new(self.kp, self.kd, self.max_accel_mps2)
    }
}

/// 姿勢制御器設定（省略時は姿勢ループ無効）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttitudeControllerConfig {
    pub roll: AxisGains,
    pub pitch: AxisGains,
    pub yaw: AxisGains,
}

impl AttitudeControllerConfig {
    pub fn build_controller(&self) -> AttitudeController {
        AttitudeController::new(AttitudeGains {
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
        })
    }
}

/// 誘導コマンドから加速度への変換方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// 位置制御器を経由（要求速度は照準点へのPD制御、加速度指令は飽和）
    #[default]
    PositionController,
    /// 制御器を経由しない運動学モード（要求速度をそのまま速度に、加速度指令は飽和なし）
    Direct,
    /// 誘導コマンドを使わず、ターゲット位置へ停止目標のPD制御
    TargetTracking,
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            ControlMode::PositionController => "position_controller",
            ControlMode::Direct => "direct",
            ControlMode::TargetTracking => "target_tracking",
        };
        f.write_str(id)
    }
}

/// 制御ループ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ControlConfig {
    #[serde(default)]
    pub mode: ControlMode,
    /// 終盤フェーズへの切替距離（m）。省略時は終盤フェーズなし
    ///
    /// 終盤ではターゲットの位置・速度を目標に位置制御器で追従します。
    /// `position_controller` モードでのみ有効です。
    #[serde(default)]
    pub endgame_radius_m: Option<f64>,
}

/// センサーノイズ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoiseConfig {
    /// 追跡機位置の計測ノイズ標準偏差（m）
    #[serde(default)]
    pub position_std_m: f64,
    /// 速度の計測ノイズ標準偏差（m/s）
    #[serde(default)]
    pub velocity_std_mps: f64,
    /// ターゲット速度推定値にもノイズを加えるか
    #[serde(default)]
    pub corrupt_target_velocity: bool,
}

/// 外乱設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisturbanceConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 1ステップあたりの発生確率
    #[serde(default = "default_disturbance_probability")]
    pub probability: f64,
    /// 各軸の外乱加速度の最大値（一様分布 [-magnitude, magnitude]）
    #[serde(default = "default_disturbance_magnitude")]
    pub magnitude_mps2: f64,
}

fn default_disturbance_probability() -> f64 {
    0.05
}

fn default_disturbance_magnitude() -> f64 {
    1.0
}

impl Default for DisturbanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: default_disturbance_probability(),
            magnitude_mps2: default_disturbance_magnitude(),
        }
    }
}

/// 評価指標設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_capture_radius")]
    pub capture_radius_m: f64,
}

fn default_capture_radius() -> f64 {
    0.5
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { capture_radius_m: default_capture_radius() }
    }
}

/// パラメータスイープ・モンテカルロ設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    #[serde(default = "default_monte_carlo_runs")]
    pub monte_carlo_runs: u32,
    #[serde(default = "default_kp_values")]
    pub kp_values: Vec<f64>,
    #[serde(default = "default_noise_values")]
    pub noise_std_values_m: Vec<f64>,
    #[serde(default = "default_max_accel_values")]
    pub max_accel_values_mps2: Vec<f64>,
}

fn default_monte_carlo_runs() -> u32 {
    100
}

fn default_kp_values() -> Vec<f64> {
    vec![1.0, 2.0, 4.0]
}

fn default_noise_values() -> Vec<f64> {
    vec![0.0, 0.1, 0.3]
}

fn default_max_accel_values() -> Vec<f64> {
    vec![1.0, 2.0, 3.0]
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            monte_carlo_runs: default_monte_carlo_runs(),
            kp_values: default_kp_values(),
            noise_std_values_m: default_noise_values(),
            max_accel_values_mps2: default_max_accel_values(),
        }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    pub target: TargetConfig,
    pub pursuer: PursuerConfig,
    pub guidance: GuidanceConfig,
    pub position_controller: PositionControllerConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub attitude_controller: Option<AttitudeControllerConfig>,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub disturbance: DisturbanceConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Default for ScenarioConfig {
    /// らせん運動ターゲットに対する純追尾の基準シナリオ
    fn default() -> Self {
        Self {
            meta: ScenarioMeta {
                version: "1.0".to_string(),
                name: "helix_pure_pursuit".to_string(),
                description: "らせん運動ターゲットに対する純追尾迎撃".to_string(),
            },
            sim: SimulationConfig { dt_s: 0.05, steps: 400, seed: 0 },
            target: TargetConfig::Helix {
                center: PositionConfig { x_m: 0.0, y_m: 0.0, z_m: 0.0 },
                radius_m: 5.0,
                turn_rate_rad_s: 1.0,
                climb_rate_mps: 0.2,
                initial_phase_rad: 0.0,
            },
            pursuer: PursuerConfig {
                position: PositionConfig { x_m: -7.0, y_m: -7.0, z_m: 0.0 },
                velocity: VelocityConfig { x_mps: 3.0, y_mps: 3.0, z_mps: 0.0 },
            },
            guidance: GuidanceConfig {
                law: GuidanceKind::PurePursuit,
                gain: 1.2,
                nav_constant: 3.0,
            },
            position_controller: PositionControllerConfig {
                kp: 20.0,
                kd: 2.0,
                max_accel_mps2: 20.0,
            },
            control: ControlConfig {
                mode: ControlMode::PositionController,
                endgame_radius_m: Some(1.0),
            },
            attitude_controller: None,
            noise: NoiseConfig::default(),
            disturbance: DisturbanceConfig::default(),
            metrics: MetricsConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents).map_err(ScenarioError::YamlError)?;
        config.validate()?;
        Ok(config)
    }

    /// 誘導則を識別子で差し替え
    pub fn with_guidance(mut self, law: &str) -> Result<Self, ScenarioError> {
        self.guidance.law = law
            .parse::<GuidanceKind>()
            .map_err(|_| ScenarioError::UnknownGuidanceLaw(law.to_string()))?;
        Ok(self)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        // 時間設定の検証
        if !(self.sim.dt_s.is_finite() && self.sim.dt_s > 0.0) {
            return Err(ScenarioError::ValidationError("dt_s must be positive".to_string()));
        }
        if self.sim.steps == 0 {
            return Err(ScenarioError::ValidationError("steps must be positive".to_string()));
        }

        // ターゲット設定の検証
        match &self.target {
            TargetConfig::StraightLine { speed_mps, .. } | TargetConfig::ConstantTurn { speed_mps, .. } => {
                if !(speed_mps.is_finite() && *speed_mps >= 0.0) {
                    return Err(ScenarioError::ValidationError("target speed_mps must be non-negative".to_string()));
                }
            }
            TargetConfig::Helix { radius_m, .. } => {
                if !(radius_m.is_finite() && *radius_m >= 0.0) {
                    return Err(ScenarioError::ValidationError("target radius_m must be non-negative".to_string()));
                }
            }
        }
        self.target.build_motion()?;

        // 誘導・制御設定の検証
        if !self.guidance.gain.is_finite() || !self.guidance.nav_constant.is_finite() {
            return Err(ScenarioError::ValidationError("guidance constants must be finite".to_string()));
        }
        if self.guidance.nav_constant <= 0.0 {
            return Err(ScenarioError::ValidationError("navigation constant N must be positive".to_string()));
        }
        let pc = &self.position_controller;
        if !(pc.kp.is_finite() && pc.kd.is_finite()) {
            return Err(ScenarioError::ValidationError("controller gains must be finite".to_string()));
        }
        if !(pc.max_accel_mps2.is_finite() && pc.max_accel_mps2 > 0.0) {
            return Err(ScenarioError::ValidationError("max_accel_mps2 must be positive".to_string()));
        }
        if let Some(radius) = self.control.endgame_radius_m {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ScenarioError::ValidationError("endgame_radius_m must be positive".to_string()));
            }
        }
        if let Some(attitude) = &self.attitude_controller {
            for (axis, gains) in [("roll", attitude.roll), ("pitch", attitude.pitch), ("yaw", attitude.yaw)] {
                if !(gains.rate_limit.is_finite() && gains.rate_limit >= 0.0) {
                    return Err(ScenarioError::ValidationError(format!(
                        "attitude {} rate_limit must be non-negative",
                        axis
                    )));
                }
            }
        }

        // ノイズ・外乱設定の検証
        if !(self.noise.position_std_m >= 0.0 && self.noise.position_std_m.is_finite()) {
            return Err(ScenarioError::ValidationError("position_std_m must be non-negative".to_string()));
        }
        if !(self.noise.velocity_std_mps >= 0.0 && self.noise.velocity_std_mps.is_finite()) {
            return Err(ScenarioError::ValidationError("velocity_std_mps must be non-negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.disturbance.probability) {
            return Err(ScenarioError::ValidationError("disturbance probability must be within [0, 1]".to_string()));
        }
        if !(self.disturbance.magnitude_mps2 >= 0.0 && self.disturbance.magnitude_mps2.is_finite()) {
            return Err(ScenarioError::ValidationError("disturbance magnitude_mps2 must be non-negative".to_string()));
        }

        if !(self.metrics.capture_radius_m.is_finite() && self.metrics.capture_radius_m > 0.0) {
            return Err(ScenarioError::ValidationError("capture_radius_m must be positive".to_string()));
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}秒", self.sim.dt_s);
        println!("ステップ数: {} ({:.1}秒)", self.sim.steps, self.sim.steps as f64 * self.sim.dt_s);
        println!("シード値: {}", self.sim.seed);
        println!();

        println!("=== 交戦設定 ===");
        println!("ターゲット運動: {}", self.target.model_name());
        let p = &self.pursuer.position;
        println!("追跡機初期位置: ({:.2}, {:.2}, {:.2})", p.x_m, p.y_m, p.z_m);
        println!("誘導則: {} (gain: {:.2}, N: {:.2})", self.guidance.law, self.guidance.gain, self.guidance.nav_constant);
        println!(
            "位置制御器: kp={:.2}, kd={:.2}, 最大加速度={:.2}m/s²",
            self.position_controller.kp, self.position_controller.kd, self.position_controller.max_accel_mps2
        );
        let endgame = self
            .control
            .endgame_radius_m
            .map_or_else(|| "なし".to_string(), |r| format!("{:.2}m", r));
        println!("制御モード: {} (終盤フェーズ切替距離: {})", self.control.mode, endgame);
        println!("姿勢ループ: {}", if self.attitude_controller.is_some() { "有効" } else { "無効" });
        println!(
            "センサーノイズ: 位置σ={:.3}m, 速度σ={:.3}m/s",
            self.noise.position_std_m, self.noise.velocity_std_mps
        );
        println!(
            "外乱: {} (確率: {:.2}, 最大: {:.2}m/s²)",
            if self.disturbance.enabled { "有効" } else { "無効" },
            self.disturbance.probability,
            self.disturbance.magnitude_mps2
        );
        println!("捕捉半径: {:.2}m", self.metrics.capture_radius_m);
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),
    #[error("YAML解析エラー: {0}")]
    YamlError(#[source] serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    ValidationError(String),
    #[error("無効な誘導則: {0}. 利用可能: pure_pursuit, proportional_navigation")]
    UnknownGuidanceLaw(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELIX_PN_YAML: &str = r#"
meta:
  version: "1.0"
  name: helix_pn
sim:
  dt_s: 0.05
  steps: 400
  seed: 7
target:
  model: helix
  center: { x_m: 0.0, y_m: 0.0 }
  radius_m: 5.0
  turn_rate_rad_s: 1.0
  climb_rate_mps: 0.2
pursuer:
  position: { x_m: -7.0, y_m: -7.0 }
  velocity: { x_mps: 3.0, y_mps: 3.0 }
guidance:
  law: proportional_navigation
  N: 3.0
position_controller:
  kp: 20.0
  kd: 2.0
  max_accel_mps2: 20.0
noise:
  position_std_m: 0.1
disturbance:
  enabled: true
"#;

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = ScenarioConfig::from_yaml_str(HELIX_PN_YAML).unwrap();
        assert_eq!(config.guidance.law, GuidanceKind::ProportionalNavigation);
        assert_eq!(config.guidance.nav_constant, 3.0);
        assert_eq!(config.guidance.gain, 1.0);
        assert_eq!(config.metrics.capture_radius_m, 0.5);
        assert_eq!(config.disturbance.probability, 0.05);
        assert!(config.disturbance.enabled);
        assert!(config.attitude_controller.is_none());
        assert!(!config.noise.corrupt_target_velocity);
        assert_eq!(config.control.mode, ControlMode::PositionController);
        assert!(config.control.endgame_radius_m.is_none());
        assert_eq!(config.batch.monte_carlo_runs, 100);
        assert!(matches!(config.target, TargetConfig::Helix { initial_phase_rad, .. } if initial_phase_rad == 0.0));
    }

    #[test]
    fn test_unknown_guidance_law_is_rejected() {
        let yaml = HELIX_PN_YAML.replace("proportional_navigation", "lead_pursuit");
        assert!(matches!(ScenarioConfig::from_yaml_str(&yaml), Err(ScenarioError::YamlError(_))));

        let err = ScenarioConfig::default().with_guidance("lead_pursuit").unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownGuidanceLaw(ref id) if id == "lead_pursuit"));
    }

    #[test]
    fn test_with_guidance_override() {
        let config = ScenarioConfig::default().with_guidance("proportional_navigation").unwrap();
        assert_eq!(config.guidance.law, GuidanceKind::ProportionalNavigation);
    }

    #[test]
    fn test_parse_control_modes() {
        for (id, mode) in [
            ("position_controller", ControlMode::PositionController),
            ("direct", ControlMode::Direct),
            ("target_tracking", ControlMode::TargetTracking),
        ] {
            let yaml = format!("{}control:\n  mode: {}\n  endgame_radius_m: 1.5\n", HELIX_PN_YAML, id);
            let config = ScenarioConfig::from_yaml_str(&yaml).unwrap();
            assert_eq!(config.control.mode, mode);
            assert_eq!(config.control.mode.to_string(), id);
            assert_eq!(config.control.endgame_radius_m, Some(1.5));
        }

        let yaml = format!("{}control:\n  mode: open_loop\n", HELIX_PN_YAML);
        assert!(matches!(ScenarioConfig::from_yaml_str(&yaml), Err(ScenarioError::YamlError(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ScenarioConfig::default();
        config.sim.dt_s = 0.0;
        assert!(matches!(config.validate(), Err(ScenarioError::ValidationError(_))));

        let mut config = ScenarioConfig::default();
        config.sim.steps = 0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.guidance.nav_constant = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.noise.position_std_m = -0.1;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.disturbance.probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.control.endgame_radius_m = Some(0.0);
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.target = TargetConfig::StraightLine {
            position: PositionConfig { x_m: 0.0, y_m: 0.0, z_m: 0.0 },
            heading: VelocityConfig::default(),
            speed_mps: 1.0,
        };
        assert!(config.validate().is_err());

        assert!(ScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = ScenarioConfig::from_file("scenarios/does_not_exist.yaml").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_bundled_scenarios_load() {
        for path in [
            "scenarios/helix_pure_pursuit.yaml",
            "scenarios/helix_proportional_navigation.yaml",
            "scenarios/arc_target_attitude.yaml",
            "scenarios/monte_carlo_noise.yaml",
        ] {
            let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
            ScenarioConfig::from_file(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        }
    }
}
