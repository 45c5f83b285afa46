//! # Simulation モジュール
//!
//! 追跡機とターゲットの交戦シミュレーションエンジンを提供します。
//!
//! 固定時間刻み（Δt）の陽的オイラー積分で追跡機の運動を進め、各ステップの
//! 運動状態を軌跡として記録します。完了後の軌跡から評価指標を抽出します。
//!
//! ## シミュレーション処理順序
//!
//! 各時間刻みにおいて、以下の順序で処理が実行されます：
//!
//! 1. **ターゲット処理**: 運動モデルを Δt だけ進め、状態を取得
//! 2. **センサー処理**: 追跡機の位置・速度（設定によりターゲット速度も）に計測ノイズを付加
//! 3. **誘導処理**: 計測状態から誘導コマンドを計算
//! 4. **制御**: 制御モードに応じて誘導コマンドを加速度に変換
//!    - `position_controller`: 要求速度は照準点（真の位置 + 要求速度）へのPD制御、
//!      加速度指令は飽和のみ。終盤フェーズではターゲットの位置・速度に追従
//!    - `direct`: 要求速度をそのまま次の速度とし、加速度指令は飽和せずに適用
//!    - `target_tracking`: 誘導コマンドを使わず、ターゲット位置へ停止目標のPD制御
//! 5. **外乱処理**: 確率的に一様分布の外乱加速度を加算
//! 6. **運動更新**: `v += a*dt; p += v*dt`
//! 7. **姿勢制御**: 有効な場合のみ、要求加速度から目標姿勢を求めて角速度指令で姿勢を更新
//! 8. **記録**: 追跡機の状態と加速度を履歴に追加
//!
//! ## 使用例
//!
//! ```no_run
//! use pursuitsim::scenario::ScenarioConfig;
//! use pursuitsim::simulation::SimulationEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/helix_pure_pursuit.yaml")?;
//! let mut engine = SimulationEngine::new(&config, 1)?;
//! let report = engine.run()?;
//! println!("miss distance: {:.3} m", report.metrics.miss_distance);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::metrics::{EngagementMetrics, MetricsError, closest_approach_history};
use crate::models::*;
use crate::scenario::{ControlMode, DisturbanceConfig, NoiseConfig, ScenarioConfig, ScenarioError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;
use tracing::{debug, info, trace};

/// シミュレーション実行エラー
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("シミュレーションは既に完了しています（{steps}ステップ）")]
    AlreadyCompleted { steps: u32 },
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// エンジンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initialized,
    Running,
    Completed,
}

/// 誘導フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidancePhase {
    /// 誘導則による追尾
    Pursuit,
    /// 終盤（ターゲットの位置・速度への追従）
    Endgame,
}

/// 軌跡の1サンプル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// 1始まりのステップ番号
    pub step: u32,
    /// サンプル時刻（秒）
    pub time: f64,
    pub state: KinematicState,
}

/// 運動状態の時系列（追記のみ）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: Vec::with_capacity(capacity) }
    }

    fn push(&mut self, sample: TrajectorySample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn positions(&self) -> Vec<Position3D> {
        self.samples.iter().map(|s| s.state.position).collect()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// 1回の交戦結果
#[derive(Debug, Clone)]
pub struct EngagementReport {
    pub guidance: GuidanceKind,
    pub seed: u64,
    pub pursuer: Trajectory,
    pub target: Trajectory,
    /// 各ステップで追跡機に加えた加速度（外乱を含む）
    pub accelerations: Vec<Acceleration3D>,
    pub metrics: EngagementMetrics,
}

impl EngagementReport {
    /// 各ステップ時点での最接近距離
    pub fn closest_approach_history(&self) -> Result<Vec<f64>, MetricsError> {
        closest_approach_history(&self.pursuer.positions(), &self.target.positions())
    }

    pub fn separations(&self) -> Vec<f64> {
        self.pursuer
            .samples()
            .iter()
            .zip(self.target.samples())
            .map(|(p, t)| p.state.separation(&t.state))
            .collect()
    }
}

pub struct SimulationEngine {
    pub current_time: f64,
    pub dt: f64,
    pub max_steps: u32,
    pub seed: u64,
    pub step_count: u32,

    state: EngineState,
    target: TargetMotion,
    guidance: GuidanceLaw,
    position_controller: PositionController,
    attitude_controller: Option<AttitudeController>,
    control_mode: ControlMode,
    endgame_radius: Option<f64>,
    phase: GuidancePhase,
    pursuer: KinematicState,

    noise: NoiseConfig,
    position_noise: Option<Normal<f64>>,
    velocity_noise: Option<Normal<f64>>,
    disturbance: DisturbanceConfig,
    capture_radius: f64,
    rng: ChaCha8Rng,

    pursuer_trajectory: Trajectory,
    target_trajectory: Trajectory,
    accelerations: Vec<Acceleration3D>,
    captured: bool,

    pub verbose_level: u8,
}

impl SimulationEngine {
    /// シナリオ設定からエンジンを作成
    ///
    /// 設定の検証に失敗した場合は実行前にエラーを返します。
    pub fn new(scenario: &ScenarioConfig, verbose_level: u8) -> Result<Self, SimulationError> {
        scenario.validate()?;

        let target = scenario.target.build_motion()?;
        let guidance = scenario.guidance.build_law();
        let position_controller = scenario.position_controller.build_controller();
        let attitude_controller = scenario.attitude_controller.as_ref().map(|c| c.build_controller());

        let mut pursuer = KinematicState::new(
            scenario.pursuer.position.to_vector(),
            scenario.pursuer.velocity.to_vector(),
        );
        if attitude_controller.is_some() {
            pursuer = pursuer.with_orientation(Attitude3D::default());
        }

        let steps = scenario.sim.steps as usize;

        if verbose_level > 1 {
            debug!(
                target_model = target.name(),
                guidance_law = %guidance.kind(),
                control_mode = %scenario.control.mode,
                attitude_loop = attitude_controller.is_some(),
                seed = scenario.sim.seed,
                "ENGINE_INITIALIZED: シミュレーションエンジンを初期化しました"
            );
        }

        Ok(Self {
            current_time: 0.0,
            dt: scenario.sim.dt_s,
            max_steps: scenario.sim.steps,
            seed: scenario.sim.seed,
            step_count: 0,
            state: EngineState::Initialized,
            target,
            guidance,
            position_controller,
            attitude_controller,
            control_mode: scenario.control.mode,
            endgame_radius: scenario.control.endgame_radius_m,
            phase: GuidancePhase::Pursuit,
            pursuer,
            position_noise: noise_distribution(scenario.noise.position_std_m)?,
            velocity_noise: noise_distribution(scenario.noise.velocity_std_mps)?,
            noise: scenario.noise.clone(),
            disturbance: scenario.disturbance.clone(),
            capture_radius: scenario.metrics.capture_radius_m,
            rng: ChaCha8Rng::seed_from_u64(scenario.sim.seed),
            pursuer_trajectory: Trajectory::with_capacity(steps),
            target_trajectory: Trajectory::with_capacity(steps),
            accelerations: Vec::with_capacity(steps),
            captured: false,
            verbose_level,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn phase(&self) -> GuidancePhase {
        self.phase
    }

    pub fn pursuer_trajectory(&self) -> &Trajectory {
        &self.pursuer_trajectory
    }

    pub fn target_trajectory(&self) -> &Trajectory {
        &self.target_trajectory
    }

    /// 残りの全ステップを実行して結果を返す
    pub fn run(&mut self) -> Result<EngagementReport, SimulationError> {
        if self.state == EngineState::Completed {
            return Err(SimulationError::AlreadyCompleted { steps: self.step_count });
        }

        while self.state != EngineState::Completed {
            self.step()?;

            if self.verbose_level > 2 {
                trace!("時刻: {:.2}秒 (ステップ: {})", self.current_time, self.step_count);
            }

            if self.step_count % 100 == 0 && self.verbose_level > 0 {
                let progress = self.step_count as f64 / self.max_steps as f64 * 100.0;
                info!(
                    "進行状況: {:.1}% ({}/{}ステップ)",
                    progress, self.step_count, self.max_steps
                );
            }
        }

        self.report()
    }

    /// 完了した交戦の結果
    pub fn report(&self) -> Result<EngagementReport, SimulationError> {
        let metrics = EngagementMetrics::extract(
            &self.pursuer_trajectory.positions(),
            &self.target_trajectory.positions(),
            &self.accelerations,
            self.dt,
            self.capture_radius,
        )?;

        Ok(EngagementReport {
            guidance: self.guidance.kind(),
            seed: self.seed,
            pursuer: self.pursuer_trajectory.clone(),
            target: self.target_trajectory.clone(),
            accelerations: self.accelerations.clone(),
            metrics,
        })
    }

    /// 1ステップ進める
    pub fn step(&mut self) -> Result<(), SimulationError> {
        match self.state {
            EngineState::Completed => {
                return Err(SimulationError::AlreadyCompleted { steps: self.step_count });
            }
            EngineState::Initialized => {
                self.state = EngineState::Running;
                let target = self.target.get_state();
                info!(
                    guidance_law = %self.guidance.kind(),
                    target_model = self.target.name(),
                    pursuer_x = self.pursuer.position.x,
                    pursuer_y = self.pursuer.position.y,
                    pursuer_z = self.pursuer.position.z,
                    initial_separation = self.pursuer.separation(&target),
                    steps = self.max_steps,
                    dt = self.dt,
                    seed = self.seed,
                    "ENGAGEMENT_START: 交戦を開始しました"
                );
            }
            EngineState::Running => {}
        }

        let target_state = self.process_target();
        self.update_guidance_phase(&target_state);
        let (measured_pursuer, perceived_target) = self.process_sensor(target_state);
        let command = self.guidance.compute_command(&measured_pursuer, &perceived_target);
        self.trace_command(&command);
        let mut acceleration = self.process_controller(command, &measured_pursuer, &perceived_target);
        if let Some(disturbance) = self.process_disturbance() {
            acceleration += disturbance;
        }
        self.integrate(acceleration);
        self.process_attitude(acceleration);
        self.record(target_state, acceleration);

        if self.step_count >= self.max_steps {
            self.state = EngineState::Completed;
            info!(
                guidance_law = %self.guidance.kind(),
                steps = self.step_count,
                elapsed_time = self.current_time,
                final_separation = self.pursuer.separation(&target_state),
                captured = self.captured,
                "SIMULATION_COMPLETED: 交戦シミュレーションが完了しました"
            );
        }

        Ok(())
    }

    fn process_target(&mut self) -> KinematicState {
        self.target.update(self.dt);
        self.target.get_state()
    }

    /// 切替距離以内に入ったら終盤フェーズへ移行（以後は戻らない）
    fn update_guidance_phase(&mut self, target: &KinematicState) {
        if self.phase == GuidancePhase::Endgame || self.control_mode != ControlMode::PositionController {
            return;
        }
        let Some(radius) = self.endgame_radius else {
            return;
        };

        let distance = self.pursuer.separation(target);
        if distance <= radius {
            let previous_phase = self.phase;
            self.phase = GuidancePhase::Endgame;
            debug!(
                guidance_law = %self.guidance.kind(),
                step = self.step_count + 1,
                previous_phase = ?previous_phase,
                current_phase = ?self.phase,
                target_distance = distance,
                endgame_radius = radius,
                "GUIDANCE_PHASE_TRANSITION: 誘導フェーズが切り替わりました（終盤フェーズへ）"
            );
        }
    }

    /// 計測ノイズを付加した追跡機状態と、誘導則に渡すターゲット状態
    fn process_sensor(&mut self, target: KinematicState) -> (KinematicState, KinematicState) {
        let mut measured = self.pursuer;
        if let Some(noise) = &self.position_noise {
            measured.position += sample_vector(&mut self.rng, noise);
        }
        if let Some(noise) = &self.velocity_noise {
            measured.velocity += sample_vector(&mut self.rng, noise);
        }

        let mut perceived = target;
        if self.noise.corrupt_target_velocity && self.guidance.requires_target_velocity() {
            if let Some(noise) = &self.velocity_noise {
                perceived.velocity += sample_vector(&mut self.rng, noise);
            }
        }

        (measured, perceived)
    }

    fn trace_command(&self, command: &GuidanceCommand) {
        if self.verbose_level <= 2 {
            return;
        }
        let vector = command.vector();
        trace!(
            step = self.step_count + 1,
            command = ?command,
            magnitude = vector.magnitude(),
            zero = command.is_zero(),
            "GUIDANCE_COMMAND: 誘導コマンドを計算しました"
        );
    }

    /// 制御モードと誘導フェーズに応じて誘導コマンドを加速度に変換
    ///
    /// 照準点は真の位置から求め、現在位置には計測値を使うため、
    /// 位置の計測ノイズはPD制御の誤差としてそのまま現れます。
    fn process_controller(
        &self,
        command: GuidanceCommand,
        measured: &KinematicState,
        perceived_target: &KinematicState,
    ) -> Acceleration3D {
        let controller = &self.position_controller;
        match (self.control_mode, self.phase) {
            (ControlMode::PositionController, GuidancePhase::Endgame) => controller.compute_acceleration(
                measured.position,
                measured.velocity,
                perceived_target.position,
                perceived_target.velocity,
            ),
            (ControlMode::PositionController, GuidancePhase::Pursuit) => match command {
                GuidanceCommand::DesiredVelocity(desired_velocity) => controller.compute_acceleration(
                    measured.position,
                    measured.velocity,
                    self.pursuer.position + desired_velocity,
                    Vector3::ZERO,
                ),
                GuidanceCommand::Acceleration(acceleration) => controller.saturate(acceleration),
            },
            (ControlMode::TargetTracking, _) => controller.compute_acceleration(
                measured.position,
                measured.velocity,
                perceived_target.position,
                Vector3::ZERO,
            ),
            (ControlMode::Direct, _) => match command {
                // 1ステップで要求速度に一致させる加速度
                GuidanceCommand::DesiredVelocity(desired_velocity) => {
                    (desired_velocity - self.pursuer.velocity) * (1.0 / self.dt)
                }
                GuidanceCommand::Acceleration(acceleration) => acceleration,
            },
        }
    }

    fn process_disturbance(&mut self) -> Option<Acceleration3D> {
        if !self.disturbance.enabled || !self.rng.gen_bool(self.disturbance.probability) {
            return None;
        }

        let m = self.disturbance.magnitude_mps2;
        let disturbance = Vector3::new(
            self.rng.gen_range(-m..=m),
            self.rng.gen_range(-m..=m),
            self.rng.gen_range(-m..=m),
        );

        if self.verbose_level > 1 {
            debug!(
                step = self.step_count + 1,
                disturbance_x = disturbance.x,
                disturbance_y = disturbance.y,
                disturbance_z = disturbance.z,
                "DISTURBANCE_APPLIED: 外乱加速度を加えました"
            );
        }

        Some(disturbance)
    }

    fn integrate(&mut self, acceleration: Acceleration3D) {
        self.pursuer.velocity += acceleration * self.dt;
        self.pursuer.position += self.pursuer.velocity * self.dt;
    }

    fn process_attitude(&mut self, acceleration: Acceleration3D) {
        let Some(controller) = self.attitude_controller.as_mut() else {
            return;
        };
        let current = self.pursuer.orientation.unwrap_or_default();
        let desired = Attitude3D::from_acceleration(&acceleration, GRAVITY);
        let rates = controller.compute(&desired, &current, self.dt);
        self.pursuer.orientation = Some(Attitude3D::new(
            current.roll + rates.roll * self.dt,
            current.pitch + rates.pitch * self.dt,
            current.yaw + rates.yaw * self.dt,
        ));
    }

    fn record(&mut self, target: KinematicState, acceleration: Acceleration3D) {
        self.step_count += 1;
        self.current_time = self.step_count as f64 * self.dt;

        self.target_trajectory.push(TrajectorySample {
            step: self.step_count,
            time: self.current_time,
            state: target,
        });
        self.pursuer_trajectory.push(TrajectorySample {
            step: self.step_count,
            time: self.current_time,
            state: self.pursuer,
        });
        self.accelerations.push(acceleration);

        let separation = self.pursuer.separation(&target);
        if !self.captured && separation < self.capture_radius {
            self.captured = true;
            info!(
                guidance_law = %self.guidance.kind(),
                step = self.step_count,
                capture_time = self.current_time,
                separation = separation,
                pursuer_x = self.pursuer.position.x,
                pursuer_y = self.pursuer.position.y,
                pursuer_z = self.pursuer.position.z,
                target_x = target.position.x,
                target_y = target.position.y,
                target_z = target.position.z,
                "TARGET_CAPTURED: ターゲットが捕捉半径内に入りました"
            );
        }
    }
}

fn noise_distribution(std_dev: f64) -> Result<Option<Normal<f64>>, ScenarioError> {
    if std_dev == 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, std_dev)
        .map(Some)
        .map_err(|e| ScenarioError::ValidationError(format!("noise std {}: {}", std_dev, e)))
}

fn sample_vector(rng: &mut ChaCha8Rng, distribution: &Normal<f64>) -> Vector3 {
    Vector3::new(
        distribution.sample(rng),
        distribution.sample(rng),
        distribution.sample(rng),
    )
}
