use serde::{Deserialize, Serialize};

use super::models::{ProfileSection, ProfileSnapshot};
use super::{SectionData, SectionRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionCompletion {
    pub section: ProfileSection,
    pub label: String,
    pub complete: bool,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    pub overall_score: f64,
    pub sections: Vec<SectionCompletion>,
    pub completed_sections: usize,
    pub missing_sections: Vec<ProfileSection>,
}

const SECTION_WEIGHTS: &[(ProfileSection, f64)] = &[
    (ProfileSection::Basic, 0.25),
    (ProfileSection::Education, 0.20),
    (ProfileSection::Work, 0.15),
    (ProfileSection::Skills, 0.15),
    (ProfileSection::Personal, 0.15),
    (ProfileSection::About, 0.10),
];

fn scalar_complete<T: SectionData>(value: &Option<T>) -> bool {
    value.as_ref().is_some_and(|v| v.is_complete())
}

fn list_complete<R: SectionRecord>(records: &Option<Vec<R>>) -> bool {
    records
        .as_ref()
        .is_some_and(|r| r.iter().any(|record| record.validate().is_ok()))
}

pub fn is_section_complete(snapshot: &ProfileSnapshot, section: ProfileSection) -> bool {
    match section {
        ProfileSection::Basic => scalar_complete(&snapshot.basic_details),
        ProfileSection::About => scalar_complete(&snapshot.about),
        ProfileSection::Skills => scalar_complete(&snapshot.skills),
        ProfileSection::Education => list_complete(&snapshot.education),
        ProfileSection::Work => list_complete(&snapshot.work_experience),
        ProfileSection::Personal => scalar_complete(&snapshot.personal_details),
    }
}

pub fn compute_completion_report(snapshot: &ProfileSnapshot) -> CompletionReport {
    let mut sections = Vec::with_capacity(SECTION_WEIGHTS.len());
    let mut missing_sections = Vec::new();
    let mut weighted_sum = 0.0;

    for &(section, weight) in SECTION_WEIGHTS {
        let complete = is_section_complete(snapshot, section);
        if complete {
            weighted_sum += weight;
        } else {
            missing_sections.push(section);
        }
        sections.push(SectionCompletion {
            section,
            label: section.label().to_string(),
            complete,
            weight,
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let overall_score = if total_weight > 0.0 {
        (weighted_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CompletionReport {
        overall_score,
        completed_sections: sections.iter().filter(|s| s.complete).count(),
        sections,
        missing_sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> ProfileSnapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let report = compute_completion_report(&ProfileSnapshot::default());
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.completed_sections, 0);
        assert_eq!(report.missing_sections.len(), ProfileSection::ALL.len());
    }

    #[test]
    fn test_weights_cover_every_section() {
        let total: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for section in ProfileSection::ALL {
            assert!(SECTION_WEIGHTS.iter().any(|(s, _)| *s == section));
        }
    }

    #[test]
    fn test_partial_profile_is_weighted() {
        let report = compute_completion_report(&snapshot(json!({
            "about": "Final-year student who likes compilers.",
            "skills": [{"id": "1", "name": "Rust"}]
        })));
        assert_eq!(report.completed_sections, 2);
        assert!((report.overall_score - 0.25).abs() < 1e-9);
        assert!(report.missing_sections.contains(&ProfileSection::Basic));
    }

    #[test]
    fn test_invalid_saved_data_is_not_complete() {
        let snap = snapshot(json!({
            "basicDetails": {"firstName": "Asha", "lastName": "", "email": "a@b.co", "phone": "9876543210"},
            "education": [{"qualification": "degree", "institute": "X"}]
        }));
        assert!(!is_section_complete(&snap, ProfileSection::Basic));
        assert!(!is_section_complete(&snap, ProfileSection::Education));
    }

    #[test]
    fn test_one_valid_record_completes_the_list() {
        let snap = snapshot(json!({
            "education": [
                {"qualification": "degree", "institute": "X"},
                {"qualification": "high_school", "institute": "DPS", "board": "CBSE", "endYear": 2016, "score": 92.5}
            ]
        }));
        assert!(is_section_complete(&snap, ProfileSection::Education));
    }
}
