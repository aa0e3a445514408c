//! Profile sections: models, validation, persistence and the repeatable-record
//! editor shared by education and work experience.

pub mod completion;
pub mod handlers;
pub mod models;
pub mod records;
pub mod repository;
pub mod validation;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;
use models::{About, BasicDetails, PersonalDetails, ProfileSection, Skills};

pub use records::{RecordEditor, SectionRecord};
pub use repository::ProfileRepository;

/// A single-valued profile section stored whole at its document path.
pub trait SectionData: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    const SECTION: ProfileSection;

    /// Cleans user input before validation (trimming and the like).
    fn normalize(&mut self) {}

    fn validate(&self) -> Result<(), AppError>;

    /// Completion status: the saved value is minimally valid.
    fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

impl SectionData for BasicDetails {
    const SECTION: ProfileSection = ProfileSection::Basic;

    fn normalize(&mut self) {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.phone = self.phone.trim().to_string();
    }

    fn validate(&self) -> Result<(), AppError> {
        validation::validate_basic(self)
    }
}

impl SectionData for About {
    const SECTION: ProfileSection = ProfileSection::About;

    fn normalize(&mut self) {
        self.0 = self.0.trim().to_string();
    }

    fn validate(&self) -> Result<(), AppError> {
        validation::validate_about(&self.0)
    }
}

impl SectionData for Skills {
    const SECTION: ProfileSection = ProfileSection::Skills;

    fn validate(&self) -> Result<(), AppError> {
        validation::validate_skills(&self.0)
    }
}

impl SectionData for PersonalDetails {
    const SECTION: ProfileSection = ProfileSection::Personal;

    fn normalize(&mut self) {
        self.gender = self.gender.trim().to_string();
        self.address = self.address.trim().to_string();
        self.languages = self
            .languages
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }

    fn validate(&self) -> Result<(), AppError> {
        validation::validate_personal(self, Utc::now().date_naive())
    }
}
