//! Conservation insight generation: turns a graded assessment into the
//! action plan a reef manager would hand to the survey team.

use serde::{Deserialize, Serialize};

use crate::analysis::health::{HealthAssessment, HealthStatus};
use crate::analysis::morphology::MorphologyReport;
use crate::taxonomy::{BleachingResistance, SpeciesMatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    Elevated,
    Routine,
}

/// Ordered action list for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub urgency: Urgency,
    pub headline: String,
    pub actions: Vec<String>,
    pub outlook: String,
}

/// Species-specific guidance attached when identification succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesNotes {
    pub bleaching_resistance: String,
    pub typical_habitat: String,
    pub conservation_priority: String,
    pub recovery_potential: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub plan: ActionPlan,
    pub species_notes: Option<SpeciesNotes>,
    /// Compact per-frame summary, also persisted with the analysis row.
    pub summary: Vec<String>,
}

pub fn generate(
    assessment: &HealthAssessment,
    morphology: &MorphologyReport,
    species: Option<&SpeciesMatch>,
) -> InsightReport {
    let plan = plan_for(assessment.status);
    let species_notes = species.map(|matched| notes_for(matched));

    let mut summary = vec![
        format!("Morphology: {}", morphology.growth_form),
        format!("Health: {}", assessment.status),
        format!("Bleaching: {:.1}%", assessment.bleaching_percentage),
    ];
    if let Some(matched) = species {
        summary.push(format!("Species: {}", matched.species.common_name));
    }

    InsightReport {
        plan,
        species_notes,
        summary,
    }
}

fn plan_for(status: HealthStatus) -> ActionPlan {
    if status.is_bleached() {
        ActionPlan {
            urgency: Urgency::Immediate,
            headline: "Immediate action required".to_string(),
            actions: vec![
                "Document and report: record GPS coordinates and notify the local marine authority"
                    .to_string(),
                "Check sea surface temperature anomalies".to_string(),
                "Identify and mitigate local stressors (pollution, tourism)".to_string(),
                "Document changes every 48 hours".to_string(),
                "Evaluate artificial shading feasibility".to_string(),
            ],
            outlook: "Expected recovery: 6-12 months with improved conditions".to_string(),
        }
    } else if status.is_stressed() {
        ActionPlan {
            urgency: Urgency::Elevated,
            headline: "Increased vigilance needed".to_string(),
            actions: vec![
                "Document color changes and growth weekly".to_string(),
                "Test water quality for nutrients and sedimentation".to_string(),
                "Compare against historical imagery of the site".to_string(),
                "Inform local conservation groups".to_string(),
                "Reduce nearby human activity".to_string(),
            ],
            outlook: "Risk level: medium, could progress to bleaching".to_string(),
        }
    } else {
        ActionPlan {
            urgency: Urgency::Routine,
            headline: "Healthy, maintenance phase".to_string(),
            actions: vec![
                "Include in quarterly reef surveys".to_string(),
                "Document as a healthy baseline reference".to_string(),
                "Ensure existing protections remain in place".to_string(),
                "Use as an example of healthy coral in community education".to_string(),
                "Flag for growth rate studies".to_string(),
            ],
            outlook: "Status: stable, continue current management".to_string(),
        }
    }
}

fn notes_for(matched: &SpeciesMatch) -> SpeciesNotes {
    let species = &matched.species;
    let recovery_potential = match species.bleaching_resistance {
        BleachingResistance::High => "High",
        _ => "Medium-Low",
    };

    SpeciesNotes {
        bleaching_resistance: species.bleaching_resistance.label().to_string(),
        typical_habitat: species.field_marks.clone(),
        conservation_priority: species.conservation_status.label().to_string(),
        recovery_potential: recovery_potential.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::health;
    use crate::taxonomy::{GrowthForm, SpeciesCatalog};

    use super::*;

    fn morphology(growth_form: GrowthForm) -> MorphologyReport {
        MorphologyReport {
            growth_form,
            circularity: 0.25,
            aspect_ratio: 1.2,
            area: 1200,
            perimeter: 300,
            component_count: 1,
            edge_density: 0.1,
        }
    }

    #[test]
    fn bleached_colony_gets_immediate_plan() {
        let assessment = health::grade(55.0);
        let report = generate(&assessment, &morphology(GrowthForm::Branching), None);
        assert_eq!(report.plan.urgency, Urgency::Immediate);
        assert_eq!(report.plan.actions.len(), 5);
        assert!(report.species_notes.is_none());
    }

    #[test]
    fn stressed_colony_gets_vigilance_plan() {
        let assessment = health::grade(15.0);
        let report = generate(&assessment, &morphology(GrowthForm::Boulder), None);
        assert_eq!(report.plan.urgency, Urgency::Elevated);
    }

    #[test]
    fn healthy_colony_gets_routine_plan() {
        let assessment = health::grade(2.0);
        let report = generate(&assessment, &morphology(GrowthForm::Plate), None);
        assert_eq!(report.plan.urgency, Urgency::Routine);
    }

    #[test]
    fn species_notes_follow_resistance() {
        let catalog = SpeciesCatalog::builtin();
        let staghorn = catalog.identify(GrowthForm::Branching).unwrap();
        let brain = SpeciesMatch {
            species: catalog.get("Brain Coral").unwrap().clone(),
            confidence: 85.5,
        };

        let assessment = health::grade(25.0);
        let fragile = generate(
            &assessment,
            &morphology(GrowthForm::Branching),
            Some(&staghorn),
        );
        let hardy = generate(&assessment, &morphology(GrowthForm::Boulder), Some(&brain));

        assert_eq!(
            fragile.species_notes.unwrap().recovery_potential,
            "Medium-Low"
        );
        assert_eq!(hardy.species_notes.unwrap().recovery_potential, "High");
    }

    #[test]
    fn summary_lists_the_key_findings() {
        let catalog = SpeciesCatalog::builtin();
        let matched = catalog.identify(GrowthForm::Branching).unwrap();
        let assessment = health::grade(7.5);
        let report = generate(
            &assessment,
            &morphology(GrowthForm::Branching),
            Some(&matched),
        );
        assert_eq!(
            report.summary,
            vec![
                "Morphology: Branching".to_string(),
                "Health: Watch".to_string(),
                "Bleaching: 7.5%".to_string(),
                "Species: Staghorn Coral".to_string(),
            ]
        );
    }
}
