use serde::{Deserialize, Serialize};

/// Coral colony health grade, from live tissue to full skeleton exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Watch,
    MildStress,
    ModeratelyBleached,
    SeverelyBleached,
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Watch => "Watch",
            HealthStatus::MildStress => "Mild Stress",
            HealthStatus::ModeratelyBleached => "Moderately Bleached",
            HealthStatus::SeverelyBleached => "Severely Bleached",
        }
    }

    pub fn is_bleached(&self) -> bool {
        matches!(
            self,
            HealthStatus::ModeratelyBleached | HealthStatus::SeverelyBleached
        )
    }

    pub fn is_stressed(&self) -> bool {
        matches!(self, HealthStatus::Watch | HealthStatus::MildStress)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Graded bleaching assessment for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub status: HealthStatus,
    pub bleaching_percentage: f32,
    pub confidence: f32,
}

/// Grades a bleaching percentage into a status with a confidence estimate.
/// Confidence grows with distance into a tier and is clamped to [30, 95].
pub fn grade(bleaching_percentage: f32) -> HealthAssessment {
    let pct = bleaching_percentage.clamp(0.0, 100.0);

    let (status, confidence) = if pct > 40.0 {
        (HealthStatus::SeverelyBleached, pct.min(95.0))
    } else if pct > 20.0 {
        (HealthStatus::ModeratelyBleached, 75.0 + (pct - 20.0))
    } else if pct > 10.0 {
        (HealthStatus::MildStress, 65.0 + (pct - 10.0))
    } else if pct > 5.0 {
        (HealthStatus::Watch, 60.0)
    } else {
        (HealthStatus::Healthy, 95.0 - pct)
    };

    HealthAssessment {
        status,
        bleaching_percentage: pct,
        confidence: confidence.clamp(30.0, 95.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(grade(0.0).status, HealthStatus::Healthy);
        assert_eq!(grade(5.0).status, HealthStatus::Healthy);
        assert_eq!(grade(5.1).status, HealthStatus::Watch);
        assert_eq!(grade(10.1).status, HealthStatus::MildStress);
        assert_eq!(grade(20.1).status, HealthStatus::ModeratelyBleached);
        assert_eq!(grade(40.1).status, HealthStatus::SeverelyBleached);
        assert_eq!(grade(100.0).status, HealthStatus::SeverelyBleached);
    }

    #[test]
    fn confidence_is_clamped() {
        for pct in [0.0, 3.0, 7.0, 15.0, 30.0, 55.0, 100.0] {
            let confidence = grade(pct).confidence;
            assert!((30.0..=95.0).contains(&confidence), "pct={pct}");
        }
    }

    #[test]
    fn healthy_confidence_shrinks_with_score() {
        assert!(grade(0.0).confidence > grade(4.0).confidence);
    }

    #[test]
    fn bleached_predicates() {
        assert!(grade(50.0).status.is_bleached());
        assert!(grade(12.0).status.is_stressed());
        assert!(!grade(1.0).status.is_bleached());
    }
}
