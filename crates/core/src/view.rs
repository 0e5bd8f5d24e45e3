//! Headless views of the patient page.
//!
//! Views are plain data built from the store, plus a `Display` rendering for the terminal. Icons and
//! colours are closed enums; every dispatch over entry kinds is an exhaustive `match`.

use crate::diagnosis::Diagnosis;
use crate::entry::{Entry, EntryKind, EntryType, HealthCheckRating};
use crate::form::{FieldError, FieldPath};
use crate::patient::{Gender, Patient};
use chrono::NaiveDate;
use std::fmt;

/// Colour of the health check rating indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Green,
    Yellow,
    Orange,
    Red,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Red => "red",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Doctor,
    Stethoscope,
    Heart,
    Woman,
    Man,
    OtherGender,
}

impl Icon {
    pub fn as_str(self) -> &'static str {
        match self {
            Icon::Doctor => "doctor",
            Icon::Stethoscope => "stethoscope",
            Icon::Heart => "heart",
            Icon::Woman => "woman",
            Icon::Man => "man",
            Icon::OtherGender => "other gender",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.as_str())
    }
}

pub fn rating_color(rating: HealthCheckRating) -> Color {
    match rating {
        HealthCheckRating::Healthy => Color::Green,
        HealthCheckRating::LowRisk => Color::Yellow,
        HealthCheckRating::HighRisk => Color::Orange,
        HealthCheckRating::CriticalRisk => Color::Red,
    }
}

pub fn gender_icon(gender: Gender) -> Icon {
    match gender {
        Gender::Female => Icon::Woman,
        Gender::Male => Icon::Man,
        Gender::Other => Icon::OtherGender,
    }
}

pub fn entry_icon(entry_type: EntryType) -> Icon {
    match entry_type {
        EntryType::HealthCheck | EntryType::Hospital => Icon::Doctor,
        EntryType::OccupationalHealthcare => Icon::Stethoscope,
    }
}

// ============================================================================
// Entry cards
// ============================================================================

/// Type-specific part of an entry card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardBody {
    Rating { icon: Icon, color: Color },
    Discharge { date: NaiveDate, criteria: String },
    Empty,
}

/// The card shell shared by all entry kinds, with its type-specific body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryCard {
    pub date: NaiveDate,
    pub icon: Icon,
    /// Only set for occupational healthcare entries.
    pub employer_name: Option<String>,
    pub description: String,
    pub body: CardBody,
}

impl EntryCard {
    pub fn from_entry(entry: &Entry) -> Self {
        let details = &entry.details;
        let (employer_name, body) = match &details.kind {
            EntryKind::HealthCheck {
                health_check_rating,
            } => (
                None,
                CardBody::Rating {
                    icon: Icon::Heart,
                    color: rating_color(*health_check_rating),
                },
            ),
            EntryKind::Hospital { discharge } => (
                None,
                CardBody::Discharge {
                    date: discharge.date,
                    criteria: discharge.criteria.clone(),
                },
            ),
            EntryKind::OccupationalHealthcare { employer_name } => {
                (Some(employer_name.clone()), CardBody::Empty)
            }
        };

        Self {
            date: details.date,
            icon: entry_icon(entry.entry_type()),
            employer_name,
            description: details.description.clone(),
            body,
        }
    }
}

impl fmt::Display for EntryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.icon)?;
        if let Some(employer) = &self.employer_name {
            write!(f, " {employer}")?;
        }
        writeln!(f)?;
        writeln!(f, "  {}", self.description)?;
        match &self.body {
            CardBody::Rating { icon, color } => writeln!(f, "  {} {}", icon, color.as_str()),
            CardBody::Discharge { date, criteria } => {
                writeln!(f, "  discharge: {date}, {criteria}")
            }
            CardBody::Empty => Ok(()),
        }
    }
}

/// An entry card followed by its resolved diagnoses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryView {
    pub card: EntryCard,
    pub diagnoses: Vec<Diagnosis>,
}

impl fmt::Display for EntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.card)?;
        for diagnosis in &self.diagnoses {
            writeln!(f, "  - {diagnosis}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Patient page
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientView {
    pub name: String,
    pub gender_icon: Icon,
    pub ssn: Option<String>,
    pub occupation: String,
    pub entries: Vec<EntryView>,
}

impl PatientView {
    pub fn new(patient: &Patient, entries: Vec<EntryView>) -> Self {
        Self {
            name: patient.name.clone(),
            gender_icon: gender_icon(patient.gender),
            ssn: patient.ssn.clone(),
            occupation: patient.occupation.clone(),
            entries,
        }
    }
}

impl fmt::Display for PatientView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.gender_icon)?;
        if let Some(ssn) = &self.ssn {
            writeln!(f, "ssn: {ssn}")?;
        }
        writeln!(f, "occupation: {}", self.occupation)?;
        writeln!(f)?;
        writeln!(f, "entries")?;
        if self.entries.is_empty() {
            return writeln!(f, "no entries");
        }
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Add-entry modal
// ============================================================================

pub const ADD_ENTRY_TITLE: &str = "Add a new entry";

/// What the add-entry modal shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddEntryModalView {
    pub open: bool,
    /// Message of the last rejected submission.
    pub error: Option<String>,
    pub selected_type: Option<EntryType>,
    pub visible_fields: Vec<FieldPath>,
    pub field_errors: Vec<(FieldPath, FieldError)>,
    pub submit_enabled: bool,
}

impl fmt::Display for AddEntryModalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.open {
            return Ok(());
        }
        writeln!(f, "{ADD_ENTRY_TITLE}")?;
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        if let Some(entry_type) = self.selected_type {
            writeln!(f, "type: {entry_type}")?;
        }
        let fields: Vec<&str> = self.visible_fields.iter().map(|p| p.as_str()).collect();
        writeln!(f, "fields: {}", fields.join(", "))?;
        for (path, err) in &self.field_errors {
            writeln!(f, "  {path}: {err}")?;
        }
        let submit = if self.submit_enabled { "enabled" } else { "disabled" };
        writeln!(f, "submit: {submit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Discharge, EntryDetails};
    use crate::testing::{sample_diagnoses, sample_entry, sample_patient};

    fn entry_with(kind: EntryKind) -> Entry {
        let mut entry = sample_entry("e1", None);
        entry.details = EntryDetails { kind, ..entry.details };
        entry
    }

    #[test]
    fn rating_colours() {
        assert_eq!(rating_color(HealthCheckRating::Healthy), Color::Green);
        assert_eq!(rating_color(HealthCheckRating::LowRisk), Color::Yellow);
        assert_eq!(rating_color(HealthCheckRating::HighRisk), Color::Orange);
        assert_eq!(rating_color(HealthCheckRating::CriticalRisk), Color::Red);
    }

    #[test]
    fn gender_icons() {
        assert_eq!(gender_icon(Gender::Female).as_str(), "woman");
        assert_eq!(gender_icon(Gender::Male).as_str(), "man");
        assert_eq!(gender_icon(Gender::Other).as_str(), "other gender");
    }

    #[test]
    fn health_check_card_shows_rating() {
        let card = EntryCard::from_entry(&entry_with(EntryKind::HealthCheck {
            health_check_rating: HealthCheckRating::HighRisk,
        }));

        assert_eq!(card.icon, Icon::Doctor);
        assert_eq!(card.employer_name, None);
        assert_eq!(
            card.body,
            CardBody::Rating {
                icon: Icon::Heart,
                color: Color::Orange
            }
        );
    }

    #[test]
    fn hospital_card_shows_discharge() {
        let card = EntryCard::from_entry(&entry_with(EntryKind::Hospital {
            discharge: Discharge {
                date: NaiveDate::from_ymd_opt(2015, 1, 16).unwrap(),
                criteria: "Thumb has healed.".into(),
            },
        }));

        assert_eq!(card.icon, Icon::Doctor);
        assert!(card
            .to_string()
            .contains("discharge: 2015-01-16, Thumb has healed."));
    }

    #[test]
    fn occupational_card_shows_employer_only() {
        let card = EntryCard::from_entry(&entry_with(EntryKind::OccupationalHealthcare {
            employer_name: "FBI".into(),
        }));

        assert_eq!(card.icon, Icon::Stethoscope);
        assert_eq!(card.employer_name.as_deref(), Some("FBI"));
        assert_eq!(card.body, CardBody::Empty);
        assert!(card.to_string().starts_with("2019-10-20 [stethoscope] FBI\n"));
    }

    #[test]
    fn patient_view_renders_profile_and_entries() {
        let patient = sample_patient(vec![sample_entry("e1", Some(vec!["M24.2"]))]);
        let entries = vec![EntryView {
            card: EntryCard::from_entry(&patient.entries[0]),
            diagnoses: vec![sample_diagnoses()[0].clone()],
        }];

        let rendered = PatientView::new(&patient, entries).to_string();
        assert!(rendered.starts_with("John McClane [man]\n"));
        assert!(rendered.contains("ssn: 090786-122X\n"));
        assert!(rendered.contains("occupation: New york city cop\n"));
        assert!(rendered.contains("  [heart] yellow\n"));
        assert!(rendered.contains("  - M24.2 Disorder of ligament\n"));
        assert!(!rendered.contains("no entries"));
    }

    #[test]
    fn patient_view_without_entries() {
        let patient = sample_patient(vec![]);
        let rendered = PatientView::new(&patient, vec![]).to_string();
        assert!(rendered.ends_with("entries\nno entries\n"));
    }

    #[test]
    fn closed_modal_renders_nothing() {
        let view = AddEntryModalView {
            open: false,
            error: Some("ignored".into()),
            selected_type: None,
            visible_fields: vec![],
            field_errors: vec![],
            submit_enabled: false,
        };
        assert_eq!(view.to_string(), "");
    }

    #[test]
    fn open_modal_lists_fields_and_submit_state() {
        let view = AddEntryModalView {
            open: true,
            error: None,
            selected_type: Some(EntryType::OccupationalHealthcare),
            visible_fields: EntryType::OccupationalHealthcare.fields(),
            field_errors: vec![(FieldPath::EmployerName, FieldError::Required)],
            submit_enabled: false,
        };

        assert_eq!(
            view.to_string(),
            "Add a new entry\n\
             type: OccupationalHealthcare\n\
             fields: type, description, date, specialist, diagnosisCodes, employerName\n  \
             employerName: Field is required.\n\
             submit: disabled\n"
        );
    }
}
