use crate::models::{
    common::{Acceleration3D, KinematicState, Velocity3D, Vector3, SEPARATION_FLOOR},
    traits::{Guidance, GuidanceCommand},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// LOS角速度計算の分母に加える安定化項
///
/// ハードな打ち切りではなく `|r|² + LOS_RATE_EPSILON` として常に加算します。
pub const LOS_RATE_EPSILON: f64 = 1e-6;

/// 誘導則の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceKind {
    PurePursuit,
    ProportionalNavigation,
}

impl GuidanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceKind::PurePursuit => "pure_pursuit",
            GuidanceKind::ProportionalNavigation => "proportional_navigation",
        }
    }
}

impl std::fmt::Display for GuidanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuidanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pure_pursuit" | "pp" => Ok(GuidanceKind::PurePursuit),
            "proportional_navigation" | "pn" => Ok(GuidanceKind::ProportionalNavigation),
            _ => Err(format!(
                "無効な誘導則: {}. 利用可能: pure_pursuit, proportional_navigation",
                s
            )),
        }
    }
}

/// 純追尾誘導
///
/// ターゲット方向の単位ベクトルにゲインを掛けた要求速度を出力します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurePursuit {
    /// 接近ゲイン
    pub gain: f64,
}

impl PurePursuit {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }

    /// 要求速度の計算
    ///
    /// 相対距離が `SEPARATION_FLOOR` 未満の場合は正規化せずゼロベクトルを返します。
    pub fn desired_velocity(&self, pursuer_position: Vector3, target_position: Vector3) -> Velocity3D {
        match (target_position - pursuer_position).normalize() {
            Some(direction) => direction * self.gain,
            None => Vector3::ZERO,
        }
    }
}

impl Guidance for PurePursuit {
    fn compute_command(&self, pursuer: &KinematicState, target: &KinematicState) -> GuidanceCommand {
        GuidanceCommand::DesiredVelocity(self.desired_velocity(pursuer.position, target.position))
    }

    fn requires_target_velocity(&self) -> bool {
        false
    }
}

/// 比例航法誘導
///
/// LOS角速度 `cross(r, v) / (|r|² + eps)` と追跡機速度の外積に航法定数 `N` を
/// 掛けた加速度を出力します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalNavigation {
    /// 航法定数 N（通常 3〜5）
    pub nav_constant: f64,
}

impl ProportionalNavigation {
    pub fn new(nav_constant: f64) -> Self {
        Self { nav_constant }
    }

    /// LOS角速度ベクトル
    pub fn los_rate(relative_position: &Vector3, relative_velocity: &Vector3) -> Vector3 {
        let denominator = relative_position.magnitude_squared() + LOS_RATE_EPSILON;
        relative_position.cross(relative_velocity) * (1.0 / denominator)
    }

    pub fn commanded_acceleration(&self, pursuer: &KinematicState, target: &KinematicState) -> Acceleration3D {
        let relative_position = target.position - pursuer.position;
        if relative_position.magnitude() < SEPARATION_FLOOR {
            return Vector3::ZERO;
        }
        let relative_velocity = target.velocity - pursuer.velocity;
        let los_rate = Self::los_rate(&relative_position, &relative_velocity);
        los_rate.cross(&pursuer.velocity) * self.nav_constant
    }
}

impl Guidance for ProportionalNavigation {
    fn compute_command(&self, pursuer: &KinematicState, target: &KinematicState) -> GuidanceCommand {
        GuidanceCommand::Acceleration(self.commanded_acceleration(pursuer, target))
    }

    fn requires_target_velocity(&self) -> bool {
        true
    }
}

/// 誘導則（閉じた列挙）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidanceLaw {
    PurePursuit(PurePursuit),
    ProportionalNavigation(ProportionalNavigation),
}

impl GuidanceLaw {
    /// 識別子と定数から誘導則を作成
    ///
    /// 純追尾では `gain`、比例航法では `nav_constant` を使用します。
    pub fn from_kind(kind: GuidanceKind, gain: f64, nav_constant: f64) -> Self {
        match kind {
            GuidanceKind::PurePursuit => GuidanceLaw::PurePursuit(PurePursuit::new(gain)),
            GuidanceKind::ProportionalNavigation => {
                GuidanceLaw::ProportionalNavigation(ProportionalNavigation::new(nav_constant))
            }
        }
    }

    pub fn kind(&self) -> GuidanceKind {
        match self {
            GuidanceLaw::PurePursuit(_) => GuidanceKind::PurePursuit,
            GuidanceLaw::ProportionalNavigation(_) => GuidanceKind::ProportionalNavigation,
        }
    }
}

impl Guidance for GuidanceLaw {
    fn compute_command(&self, pursuer: &KinematicState, target: &KinematicState) -> GuidanceCommand {
        match self {
            GuidanceLaw::PurePursuit(law) => law.compute_command(pursuer, target),
            GuidanceLaw::ProportionalNavigation(law) => law.compute_command(pursuer, target),
        }
    }

    fn requires_target_velocity(&self) -> bool {
        match self {
            GuidanceLaw::PurePursuit(law) => law.requires_target_velocity(),
            GuidanceLaw::ProportionalNavigation(law) => law.requires_target_velocity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(position: Vector3, velocity: Vector3) -> KinematicState {
        KinematicState::new(position, velocity)
    }

    #[test]
    fn test_pure_pursuit_points_at_target() {
        let law = PurePursuit::new(1.0);
        let cases = [
            (Vector3::new(-7.0, -7.0, 0.0), Vector3::new(5.0, 0.0, 0.0)),
            (Vector3::new(1.0, 2.0, 3.0), Vector3::new(-4.0, 8.0, -1.0)),
            (Vector3::ZERO, Vector3::new(0.0, 0.0, 1e-3)),
        ];
        for (pursuer, target) in cases {
            let command = law.desired_velocity(pursuer, target);
            assert_relative_eq!(command.magnitude(), 1.0, epsilon = 1e-12);
            let expected = (target - pursuer).normalize().unwrap();
            assert_relative_eq!(command.dot(&expected), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pure_pursuit_scales_by_gain() {
        let law = PurePursuit::new(1.2);
        let command = law.desired_velocity(Vector3::ZERO, Vector3::new(0.0, 10.0, 0.0));
        assert_relative_eq!(command.y, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_both_laws_return_zero_below_floor() {
        let pursuer = state(Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 0.0, 0.0));
        let target = state(Vector3::new(1.0 + 5e-7, 1.0, 1.0), Vector3::new(0.0, 3.0, 0.0));

        for law in [
            GuidanceLaw::from_kind(GuidanceKind::PurePursuit, 1.2, 3.0),
            GuidanceLaw::from_kind(GuidanceKind::ProportionalNavigation, 1.2, 3.0),
        ] {
            let command = law.compute_command(&pursuer, &target);
            assert!(command.is_zero(), "{:?} returned {:?}", law.kind(), command);
            assert!(command.vector().is_finite());
        }

        let coincident = law_output_at_coincidence();
        assert!(coincident.iter().all(|c| c.is_zero()));
    }

    fn law_output_at_coincidence() -> Vec<GuidanceCommand> {
        let s = state(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        vec![
            PurePursuit::new(1.0).compute_command(&s, &s),
            ProportionalNavigation::new(4.0).compute_command(&s, &s),
        ]
    }

    #[test]
    fn test_pn_command_kinds() {
        let pp = GuidanceLaw::from_kind(GuidanceKind::PurePursuit, 1.0, 3.0);
        let pn = GuidanceLaw::from_kind(GuidanceKind::ProportionalNavigation, 1.0, 3.0);
        let pursuer = state(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        let target = state(Vector3::new(10.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(matches!(pp.compute_command(&pursuer, &target), GuidanceCommand::DesiredVelocity(_)));
        assert!(matches!(pn.compute_command(&pursuer, &target), GuidanceCommand::Acceleration(_)));
        assert!(!pp.requires_target_velocity());
        assert!(pn.requires_target_velocity());
    }

    #[test]
    fn test_pn_matches_closed_form() {
        // r = (10,0,0), v = (0,1,0) - (1,0,0) = (-1,1,0)
        // los = (0,0,10) / (100 + eps), acc = N * los × vp = N * (0, 10/(100+eps), 0)
        let law = ProportionalNavigation::new(3.0);
        let pursuer = state(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        let target = state(Vector3::new(10.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        let acc = law.commanded_acceleration(&pursuer, &target);
        assert_relative_eq!(acc.x, 0.0);
        assert_relative_eq!(acc.y, 3.0 * 10.0 / (100.0 + LOS_RATE_EPSILON), epsilon = 1e-15);
        assert_relative_eq!(acc.z, 0.0);
        // 加速度は追跡機速度に直交
        assert_relative_eq!(acc.dot(&pursuer.velocity), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_pn_zero_on_collision_course() {
        // LOS が回転しない（相対速度が LOS に平行）場合は指令ゼロ
        let law = ProportionalNavigation::new(4.0);
        let pursuer = state(Vector3::ZERO, Vector3::new(2.0, 0.0, 0.0));
        let target = state(Vector3::new(20.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(law.commanded_acceleration(&pursuer, &target), Vector3::ZERO);
    }

    #[test]
    fn test_pn_stays_finite_just_above_floor() {
        let law = ProportionalNavigation::new(5.0);
        let pursuer = state(Vector3::ZERO, Vector3::new(100.0, 0.0, 0.0));
        let target = state(Vector3::new(0.0, 2e-6, 0.0), Vector3::new(-100.0, 0.0, 0.0));
        let acc = law.commanded_acceleration(&pursuer, &target);
        assert!(acc.is_finite());
    }

    #[test]
    fn test_guidance_kind_from_str() {
        assert_eq!(GuidanceKind::from_str("pure_pursuit"), Ok(GuidanceKind::PurePursuit));
        assert_eq!(GuidanceKind::from_str("PN"), Ok(GuidanceKind::ProportionalNavigation));
        assert!(GuidanceKind::from_str("lead_pursuit").is_err());
        assert_eq!(GuidanceKind::ProportionalNavigation.to_string(), "proportional_navigation");
    }
}
