use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::lookups::LookupEntity;

/// The profile sections this service edits, with their document paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSection {
    Basic,
    About,
    Skills,
    Education,
    Work,
    Personal,
}

impl ProfileSection {
    pub const ALL: [ProfileSection; 6] = [
        ProfileSection::Basic,
        ProfileSection::About,
        ProfileSection::Skills,
        ProfileSection::Education,
        ProfileSection::Work,
        ProfileSection::Personal,
    ];

    /// Field path inside the user document.
    pub fn path(self) -> &'static str {
        match self {
            ProfileSection::Basic => "basicDetails",
            ProfileSection::About => "about",
            ProfileSection::Skills => "skills",
            ProfileSection::Education => "education",
            ProfileSection::Work => "workExperience",
            ProfileSection::Personal => "personalDetails",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileSection::Basic => "Basic details",
            ProfileSection::About => "About",
            ProfileSection::Skills => "Skills",
            ProfileSection::Education => "Education",
            ProfileSection::Work => "Work experience",
            ProfileSection::Personal => "Personal details",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Student,
    Fresher,
    Professional,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub current_city: Option<String>,
    #[serde(default)]
    pub profile_type: Option<ProfileType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct About(pub String);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Skills(pub Vec<LookupEntity>);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: String,
    /// Formatted address, usually picked from place autocomplete.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<LookupEntity>,
}

/// Discriminant of an education record; decides which fields are required.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    HighSchool,
    Intermediate,
    Degree,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    #[default]
    Percentage,
    Cgpa,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    pub qualification: Qualification,
    /// School, college or institute name depending on the qualification.
    #[serde(default)]
    pub institute: String,
    /// Board for school levels, university for degrees.
    #[serde(default)]
    pub board: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    /// Passing year for school levels.
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub score_type: ScoreType,
    #[serde(default)]
    pub document: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentKind {
    Internship,
    FullTime,
    PartTime,
    Freelance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    pub employment_type: EmploymentKind,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currently_working: bool,
    #[serde(default)]
    pub certificate: Option<String>,
}

/// The editable slice of the user document, as fetched for completion checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub basic_details: Option<BasicDetails>,
    #[serde(default)]
    pub about: Option<About>,
    #[serde(default)]
    pub skills: Option<Skills>,
    #[serde(default, deserialize_with = "readable_education")]
    pub education: Option<Vec<EducationRecord>>,
    #[serde(default, deserialize_with = "readable_work")]
    pub work_experience: Option<Vec<WorkRecord>>,
    #[serde(default)]
    pub personal_details: Option<PersonalDetails>,
}

/// Parses one stored list entry. Entries that no longer fit the record type
/// are logged and reported as `None` so the rest of the list stays usable.
pub fn read_record<R: DeserializeOwned>(
    section: ProfileSection,
    index: usize,
    raw: &Value,
) -> Option<R> {
    match R::deserialize(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping unreadable {} entry {index}: {e}", section.path());
            None
        }
    }
}

fn readable_records<'de, D, R>(
    deserializer: D,
    section: ProfileSection,
) -> Result<Option<Vec<R>>, D::Error>
where
    D: Deserializer<'de>,
    R: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| read_record(section, i, item))
            .collect(),
        _ => Vec::new(),
    }))
}

fn readable_education<'de, D>(deserializer: D) -> Result<Option<Vec<EducationRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    readable_records(deserializer, ProfileSection::Education)
}

fn readable_work<'de, D>(deserializer: D) -> Result<Option<Vec<WorkRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    readable_records(deserializer, ProfileSection::Work)
}
