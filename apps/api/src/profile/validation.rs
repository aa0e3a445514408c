//! Synchronous, pre-network validation for every profile section.
//!
//! Required fields are checked in display order and the first missing one
//! aborts the save with a message naming it. For repeatable records the
//! checklist depends on the record's discriminant.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::models::{
    BasicDetails, EducationRecord, EmploymentKind, PersonalDetails, Qualification, ScoreType,
    WorkRecord,
};
use crate::errors::AppError;
use crate::lookups::LookupEntity;

pub const MAX_ABOUT_CHARS: usize = 1000;
pub const MAX_SKILLS: usize = 30;

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Fails on the first `(label, present)` pair that is not present.
fn first_missing(checks: &[(&'static str, bool)]) -> Result<(), AppError> {
    match checks.iter().find(|(_, present)| !present) {
        Some((label, _)) => Err(AppError::Validation(format!("{label} is required"))),
        None => Ok(()),
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    // The domain needs at least two labels and none of them may be empty.
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Ten national digits, optionally preceded by `+<country code>`.
/// Spaces, dashes and parentheses are ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let (international, rest) = match phone.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, phone),
    };
    if !rest
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return false;
    }
    let digits = rest.chars().filter(char::is_ascii_digit).count();
    if international {
        (11..=13).contains(&digits)
    } else {
        digits == 10
    }
}

pub fn validate_basic(details: &BasicDetails) -> Result<(), AppError> {
    first_missing(&[
        ("First name", filled(&details.first_name)),
        ("Last name", filled(&details.last_name)),
        ("Email", filled(&details.email)),
        ("Phone", filled(&details.phone)),
    ])?;
    if !is_valid_email(&details.email) {
        return Err(invalid("Please enter a valid email address"));
    }
    if !is_valid_phone(&details.phone) {
        return Err(invalid("Please enter a valid 10-digit phone number"));
    }
    Ok(())
}

pub fn validate_about(about: &str) -> Result<(), AppError> {
    first_missing(&[("About", filled(about))])?;
    if about.chars().count() > MAX_ABOUT_CHARS {
        return Err(invalid(format!(
            "About must be at most {MAX_ABOUT_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_skills(skills: &[LookupEntity]) -> Result<(), AppError> {
    if skills.is_empty() {
        return Err(invalid("Add at least one skill"));
    }
    if skills.len() > MAX_SKILLS {
        return Err(invalid(format!("You can add at most {MAX_SKILLS} skills")));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = skills.iter().find(|s| !seen.insert(s.id.as_str())) {
        return Err(invalid(format!("{} is already added", dup.name)));
    }
    Ok(())
}

pub fn validate_personal(details: &PersonalDetails, today: NaiveDate) -> Result<(), AppError> {
    first_missing(&[
        ("Date of birth", details.date_of_birth.is_some()),
        ("Gender", filled(&details.gender)),
        ("Address", filled(&details.address)),
    ])?;
    if details.date_of_birth.is_some_and(|dob| dob > today) {
        return Err(invalid("Date of birth cannot be in the future"));
    }
    Ok(())
}

pub fn validate_education(record: &EducationRecord) -> Result<(), AppError> {
    let has_end = record.end_year.is_some();
    let has_score = record.score.is_some();
    match record.qualification {
        Qualification::HighSchool => first_missing(&[
            ("School name", filled(&record.institute)),
            ("Board", filled(&record.board)),
            ("Passing year", has_end),
            ("Score", has_score),
        ])?,
        Qualification::Intermediate => first_missing(&[
            ("College name", filled(&record.institute)),
            ("Board", filled(&record.board)),
            ("Stream", filled(&record.stream)),
            ("Passing year", has_end),
            ("Score", has_score),
        ])?,
        Qualification::Degree => first_missing(&[
            ("Institute", filled(&record.institute)),
            ("Degree", filled(&record.degree)),
            ("Specialization", filled(&record.specialization)),
            ("Start year", record.start_year.is_some()),
            ("End year", has_end),
            ("Score", has_score),
        ])?,
    }

    if let (Some(start), Some(end)) = (record.start_year, record.end_year) {
        if end < start {
            return Err(invalid("End year cannot be before start year"));
        }
    }

    if let Some(score) = record.score {
        let max = match record.score_type {
            ScoreType::Percentage => 100.0,
            ScoreType::Cgpa => 10.0,
        };
        if !(0.0..=max).contains(&score) {
            return Err(invalid(format!("Score must be between 0 and {max}")));
        }
    }
    Ok(())
}

pub fn validate_work(record: &WorkRecord) -> Result<(), AppError> {
    let kind = record.employment_type;
    let mut checks = Vec::with_capacity(6);
    if kind != EmploymentKind::Freelance {
        checks.push(("Company", filled(&record.company)));
    }
    checks.push(("Designation", filled(&record.designation)));
    if matches!(kind, EmploymentKind::FullTime | EmploymentKind::PartTime) {
        checks.push(("Location", filled(&record.location)));
    }
    if kind == EmploymentKind::Freelance {
        checks.push(("Description", filled(&record.description)));
    }
    checks.push(("Start date", record.start_date.is_some()));
    if !record.currently_working {
        checks.push(("End date", record.end_date.is_some()));
    }
    first_missing(&checks)?;

    if let (Some(start), Some(end)) = (record.start_date, record.end_date) {
        if !record.currently_working && end < start {
            return Err(invalid("End date cannot be before start date"));
        }
    }
    Ok(())
}
