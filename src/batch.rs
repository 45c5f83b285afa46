//! # Batch モジュール
//!
//! パラメータスイープとモンテカルロ評価のための並列実行を提供します。
//!
//! 各実行は独立したエンジン（ターゲット・制御器・乱数生成器）を持ち、
//! tokio のブロッキングスレッドプール上で並列に実行されます。結果は実行番号順に
//! 並べ替えてから返すため、集計結果は完了順序に依存しません。

use crate::metrics::{EngagementMetrics, MetricsSummary};
use crate::scenario::ScenarioConfig;
use crate::simulation::{SimulationEngine, SimulationError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

/// バッチ実行エラー
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("非同期ランタイムの作成に失敗しました: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("バッチ実行タスクが異常終了しました: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("実行 {index} ({label}) が失敗しました: {source}")]
    Run {
        index: usize,
        label: String,
        #[source]
        source: SimulationError,
    },
    #[error("実行回数は1以上である必要があります")]
    NoRuns,
}

/// 1回分の実行結果
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub index: usize,
    pub label: String,
    pub seed: u64,
    pub metrics: EngagementMetrics,
    /// 実行に要した実時間
    pub elapsed: Duration,
}

/// スイープ対象のパラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepParameter {
    /// 位置制御器の比例ゲイン（kd = 1.0 固定）
    Gain { kp: f64 },
    /// 位置計測ノイズの標準偏差
    Noise { position_std_m: f64 },
    /// 最大加速度
    ActuatorLimit { max_accel_mps2: f64 },
    /// 外乱の有無
    Disturbance { enabled: bool },
}

impl SweepParameter {
    pub fn label(&self) -> String {
        match self {
            SweepParameter::Gain { kp } => format!("[Gain] kp={kp}, kd=1.0"),
            SweepParameter::Noise { position_std_m } => format!("[Noise] std={position_std_m}"),
            SweepParameter::ActuatorLimit { max_accel_mps2 } => format!("[Actuator Limit] max_acc={max_accel_mps2}"),
            SweepParameter::Disturbance { enabled } => format!("[Disturbance] {}", if *enabled { "ON" } else { "OFF" }),
        }
    }

    /// 基準シナリオにパラメータを適用
    pub fn apply(&self, config: &mut ScenarioConfig) {
        match *self {
            SweepParameter::Gain { kp } => {
                config.position_controller.kp = kp;
                config.position_controller.kd = 1.0;
            }
            SweepParameter::Noise { position_std_m } => config.noise.position_std_m = position_std_m,
            SweepParameter::ActuatorLimit { max_accel_mps2 } => {
                config.position_controller.max_accel_mps2 = max_accel_mps2;
            }
            SweepParameter::Disturbance { enabled } => config.disturbance.enabled = enabled,
        }
    }
}

/// シナリオのバッチ設定からスイープケースを生成
pub fn sweep_cases(config: &ScenarioConfig) -> Vec<SweepParameter> {
    let batch = &config.batch;
    let mut cases = Vec::new();
    cases.extend(batch.kp_values.iter().map(|&kp| SweepParameter::Gain { kp }));
    cases.extend(
        batch
            .noise_std_values_m
            .iter()
            .map(|&position_std_m| SweepParameter::Noise { position_std_m }),
    );
    cases.extend(
        batch
            .max_accel_values_mps2
            .iter()
            .map(|&max_accel_mps2| SweepParameter::ActuatorLimit { max_accel_mps2 }),
    );
    cases.extend([false, true].map(|enabled| SweepParameter::Disturbance { enabled }));
    cases
}

/// モンテカルロ評価の結果
#[derive(Debug, Clone)]
pub struct MonteCarloResult {
    pub runs: Vec<BatchRun>,
    pub summary: MetricsSummary,
}

/// 独立した実行を並列に処理するランナー
pub struct BatchRunner {
    runtime: Runtime,
    verbose_level: u8,
}

impl BatchRunner {
    /// ランナーを作成
    ///
    /// # 引数
    /// * `worker_threads` - ワーカースレッド数（`None` の場合は tokio の既定値）
    /// * `verbose_level` - 各実行エンジンに渡す詳細出力レベル
    pub fn new(worker_threads: Option<usize>, verbose_level: u8) -> Result<Self, BatchError> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name("pursuitsim-batch");
        if let Some(threads) = worker_threads {
            builder.worker_threads(threads.max(1));
        }
        let runtime = builder.build().map_err(BatchError::Runtime)?;
        Ok(Self { runtime, verbose_level })
    }

    /// ラベル付きシナリオを並列実行し、実行番号順の結果を返す
    pub fn run_all(&self, jobs: Vec<(String, ScenarioConfig)>) -> Result<Vec<BatchRun>, BatchError> {
        if jobs.is_empty() {
            return Err(BatchError::NoRuns);
        }

        let verbose_level = self.verbose_level;
        let total = jobs.len();
        let started = Instant::now();

        let mut results = self.runtime.block_on(async move {
            let handles: Vec<_> = jobs
                .into_iter()
                .enumerate()
                .map(|(index, (label, config))| {
                    tokio::task::spawn_blocking(move || run_single(index, label, config, verbose_level))
                })
                .collect();

            let mut results = Vec::with_capacity(handles.len());
            for handle in handles {
                results.push(handle.await??);
            }
            Ok::<_, BatchError>(results)
        })?;

        results.sort_by_key(|run| run.index);

        info!(
            runs = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "BATCH_COMPLETED: バッチ実行が完了しました"
        );

        Ok(results)
    }

    /// シード値を変えて同一シナリオを繰り返し実行
    ///
    /// 実行 `i` のシード値は `base.sim.seed + i`（ラップアラウンド）です。
    pub fn monte_carlo(&self, base: &ScenarioConfig, runs: u32) -> Result<MonteCarloResult, BatchError> {
        if runs == 0 {
            return Err(BatchError::NoRuns);
        }

        info!(
            scenario = %base.meta.name,
            guidance_law = %base.guidance.law,
            runs = runs,
            base_seed = base.sim.seed,
            "MONTE_CARLO_START: モンテカルロ評価を開始します"
        );

        let jobs = (0..runs)
            .map(|i| {
                let mut config = base.clone();
                config.sim.seed = base.sim.seed.wrapping_add(u64::from(i));
                (format!("run {:03}", i), config)
            })
            .collect();

        let runs = self.run_all(jobs)?;
        let metrics: Vec<EngagementMetrics> = runs.iter().map(|r| r.metrics.clone()).collect();
        let summary = MetricsSummary::from_metrics(&metrics).ok_or(BatchError::NoRuns)?;

        info!(
            guidance_law = %base.guidance.law,
            runs = summary.count,
            miss_distance_mean = summary.miss_distance.mean,
            miss_distance_std = summary.miss_distance.std_dev,
            intercept_count = summary.intercept_count,
            "MONTE_CARLO_COMPLETED: モンテカルロ評価が完了しました"
        );

        Ok(MonteCarloResult { runs, summary })
    }

    /// ゲイン・ノイズ・最大加速度・外乱のスイープを実行
    pub fn sweep(&self, base: &ScenarioConfig) -> Result<Vec<BatchRun>, BatchError> {
        let jobs = sweep_cases(base)
            .into_iter()
            .map(|case| {
                let mut config = base.clone();
                case.apply(&mut config);
                (case.label(), config)
            })
            .collect();
        self.run_all(jobs)
    }
}

fn run_single(index: usize, label: String, config: ScenarioConfig, verbose_level: u8) -> Result<BatchRun, BatchError> {
    let started = Instant::now();
    let seed = config.sim.seed;

    let report = SimulationEngine::new(&config, verbose_level)
        .and_then(|mut engine| engine.run())
        .map_err(|source| BatchError::Run { index, label: label.clone(), source })?;

    let elapsed = started.elapsed();
    if verbose_level > 1 {
        debug!(
            run_index = index,
            label = %label,
            seed = seed,
            miss_distance = report.metrics.miss_distance,
            elapsed_us = elapsed.as_micros() as u64,
            "BATCH_RUN_FINISHED: バッチ内の実行が完了しました"
        );
    }

    Ok(BatchRun {
        index,
        label,
        seed,
        metrics: report.metrics,
        elapsed,
    })
}
