use crate::models::{Acceleration3D, Position3D};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 評価指標計算エラー
#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("軌跡が空です")]
    EmptyTrajectory,
    #[error("軌跡の長さが一致しません: 追跡機 {pursuer}, ターゲット {target}")]
    LengthMismatch { pursuer: usize, target: usize },
}

/// 1回の交戦の評価指標
///
/// サンプル `i` の時刻は `(i + 1) * dt` です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// 最小相対距離（m）
    pub miss_distance: f64,
    /// 最終ステップでの相対距離（m）
    pub final_miss_distance: f64,
    /// 初めて捕捉半径内に入った時刻（秒）
    pub time_to_intercept: Option<f64>,
    /// 末尾ウィンドウ全体が捕捉半径内に留まった場合のウィンドウ開始時刻（秒）
    pub settling_time: Option<f64>,
    /// 制御エネルギー `dt * Σ|a|²`
    pub energy: f64,
}

impl EngagementMetrics {
    /// 記録された軌跡から評価指標を抽出
    ///
    /// # 引数
    /// * `pursuer` - 追跡機の位置履歴
    /// * `target` - ターゲットの位置履歴（追跡機と同じ長さ）
    /// * `accelerations` - 各ステップの加速度指令
    /// * `dt` - 時間刻み（秒）
    /// * `capture_radius` - 捕捉半径（m）
    pub fn extract(
        pursuer: &[Position3D],
        target: &[Position3D],
        accelerations: &[Acceleration3D],
        dt: f64,
        capture_radius: f64,
    ) -> Result<Self, MetricsError> {
        let separations = separations(pursuer, target)?;
        let n = separations.len();

        let miss_distance = separations.iter().copied().fold(f64::INFINITY, f64::min);
        let final_miss_distance = separations[n - 1];

        let time_to_intercept = separations
            .iter()
            .position(|&d| d < capture_radius)
            .map(|i| sample_time(i, dt));

        let window = (n / 10).max(1);
        let window_start = n - window;
        let settling_time = if separations[window_start..].iter().all(|&d| d < capture_radius) {
            Some(sample_time(window_start, dt))
        } else {
            None
        };

        let energy = dt * accelerations.iter().map(|a| a.magnitude_squared()).sum::<f64>();

        Ok(Self {
            miss_distance,
            final_miss_distance,
            time_to_intercept,
            settling_time,
            energy,
        })
    }

    pub fn intercepted(&self) -> bool {
        self.time_to_intercept.is_some()
    }
}

/// 各ステップ時点での最接近距離（それまでの最小相対距離）
pub fn closest_approach_history(pursuer: &[Position3D], target: &[Position3D]) -> Result<Vec<f64>, MetricsError> {
    let separations = separations(pursuer, target)?;
    let mut closest = f64::INFINITY;
    Ok(separations
        .into_iter()
        .map(|d| {
            closest = closest.min(d);
            closest
        })
        .collect())
}

fn separations(pursuer: &[Position3D], target: &[Position3D]) -> Result<Vec<f64>, MetricsError> {
    if pursuer.len() != target.len() {
        return Err(MetricsError::LengthMismatch {
            pursuer: pursuer.len(),
            target: target.len(),
        });
    }
    if pursuer.is_empty() {
        return Err(MetricsError::EmptyTrajectory);
    }
    Ok(pursuer
        .iter()
        .zip(target)
        .map(|(p, t)| p.distance_3d(t))
        .collect())
}

fn sample_time(index: usize, dt: f64) -> f64 {
    (index + 1) as f64 * dt
}

/// 統計量（平均・標準偏差・最小・最大）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Statistics {
    /// 母標準偏差で計算（空の場合は `None`）
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

/// 複数回の交戦結果の集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub count: usize,
    pub miss_distance: Statistics,
    pub energy: Statistics,
    /// 捕捉半径内に入った回数
    pub intercept_count: usize,
}

impl MetricsSummary {
    pub fn from_metrics(metrics: &[EngagementMetrics]) -> Option<Self> {
        let miss: Vec<f64> = metrics.iter().map(|m| m.miss_distance).collect();
        let energy: Vec<f64> = metrics.iter().map(|m| m.energy).collect();
        Some(Self {
            count: metrics.len(),
            miss_distance: Statistics::from_values(&miss)?,
            energy: Statistics::from_values(&energy)?,
            intercept_count: metrics.iter().filter(|m| m.intercepted()).count(),
        })
    }

    pub fn intercept_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.intercept_count as f64 / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vector3;
    use approx::assert_relative_eq;

    fn along_x(distances: &[f64]) -> (Vec<Position3D>, Vec<Position3D>) {
        let pursuer = distances.iter().map(|_| Vector3::ZERO).collect();
        let target = distances.iter().map(|&d| Vector3::new(d, 0.0, 0.0)).collect();
        (pursuer, target)
    }

    #[test]
    fn test_miss_distance_and_intercept_time() {
        let (pursuer, target) = along_x(&[3.0, 2.0, 0.4, 0.2, 0.6]);
        let metrics = EngagementMetrics::extract(&pursuer, &target, &[], 0.1, 0.5).unwrap();
        assert_relative_eq!(metrics.miss_distance, 0.2);
        assert_relative_eq!(metrics.final_miss_distance, 0.6);
        assert_relative_eq!(metrics.time_to_intercept.unwrap(), 0.3, epsilon = 1e-12);
        // 末尾1サンプルが捕捉半径外
        assert_eq!(metrics.settling_time, None);
        assert!(metrics.intercepted());
    }

    #[test]
    fn test_no_intercept_is_valid_outcome() {
        let (pursuer, target) = along_x(&[5.0, 4.0, 3.0, 4.0]);
        let metrics = EngagementMetrics::extract(&pursuer, &target, &[], 0.1, 0.5).unwrap();
        assert_eq!(metrics.time_to_intercept, None);
        assert_eq!(metrics.settling_time, None);
        assert_relative_eq!(metrics.miss_distance, 3.0);
    }

    #[test]
    fn test_settling_uses_trailing_tenth() {
        // 20 サンプル、末尾 2 サンプルのウィンドウ
        let mut distances = vec![2.0; 18];
        distances.extend([0.3, 0.1]);
        let (pursuer, target) = along_x(&distances);
        let metrics = EngagementMetrics::extract(&pursuer, &target, &[], 0.5, 0.5).unwrap();
        assert_relative_eq!(metrics.settling_time.unwrap(), 9.5, epsilon = 1e-12);
        assert_relative_eq!(metrics.time_to_intercept.unwrap(), 9.5, epsilon = 1e-12);

        distances[18] = 0.7;
        let (pursuer, target) = along_x(&distances);
        let metrics = EngagementMetrics::extract(&pursuer, &target, &[], 0.5, 0.5).unwrap();
        assert_eq!(metrics.settling_time, None);
    }

    #[test]
    fn test_energy() {
        let (pursuer, target) = along_x(&[1.0, 1.0]);
        let zero = [Vector3::ZERO, Vector3::ZERO];
        let metrics = EngagementMetrics::extract(&pursuer, &target, &zero, 0.05, 0.5).unwrap();
        assert_eq!(metrics.energy, 0.0);

        let accelerations = [Vector3::new(3.0, 4.0, 0.0), Vector3::new(0.0, 0.0, -2.0)];
        let metrics = EngagementMetrics::extract(&pursuer, &target, &accelerations, 0.05, 0.5).unwrap();
        assert_relative_eq!(metrics.energy, 0.05 * 29.0, epsilon = 1e-12);
        assert!(metrics.energy >= 0.0);
    }

    #[test]
    fn test_invalid_trajectories() {
        assert_eq!(
            EngagementMetrics::extract(&[], &[], &[], 0.1, 0.5),
            Err(MetricsError::EmptyTrajectory)
        );
        let (pursuer, _) = along_x(&[1.0, 2.0]);
        let (_, target) = along_x(&[1.0]);
        assert_eq!(
            closest_approach_history(&pursuer, &target),
            Err(MetricsError::LengthMismatch { pursuer: 2, target: 1 })
        );
    }

    #[test]
    fn test_closest_approach_history_is_non_increasing() {
        let (pursuer, target) = along_x(&[3.0, 1.0, 2.0, 0.5, 4.0]);
        let history = closest_approach_history(&pursuer, &target).unwrap();
        assert_eq!(history, vec![3.0, 1.0, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_summary_statistics() {
        let make = |miss: f64, energy: f64, tti: Option<f64>| EngagementMetrics {
            miss_distance: miss,
            final_miss_distance: miss,
            time_to_intercept: tti,
            settling_time: None,
            energy,
        };
        let summary = MetricsSummary::from_metrics(&[
            make(1.0, 10.0, None),
            make(3.0, 20.0, Some(1.0)),
        ])
        .unwrap();
        assert_eq!(summary.count, 2);
        assert_relative_eq!(summary.miss_distance.mean, 2.0);
        assert_relative_eq!(summary.miss_distance.std_dev, 1.0);
        assert_relative_eq!(summary.energy.min, 10.0);
        assert_relative_eq!(summary.energy.max, 20.0);
        assert_eq!(summary.intercept_count, 1);
        assert_relative_eq!(summary.intercept_rate(), 0.5);

        assert!(MetricsSummary::from_metrics(&[]).is_none());
    }
}
