//! The add-entry form.
//!
//! One form collects every kind of entry. The selected [`EntryType`] decides which fields are
//! visible and which rules apply; switching type keeps whatever was already typed into the shared
//! fields.
//!
//! Validation is driven by a static schema: each [`FieldSchema`] names a field by its
//! [`FieldPath`] and lists the [`Rule`]s it must satisfy. [`validate`] walks the schema for the
//! selected type and fills an [`EntryFormErrors`] tree that mirrors the entry shape, one leaf per
//! field. The first failing rule of a field is the one reported.

use crate::constants::{MAX_HEALTH_CHECK_RATING, MIN_HEALTH_CHECK_RATING};
use crate::entry::{Discharge, EntryKind, EntryType, HealthCheckRating, NewEntry};
use crate::{PatientorError, PatientorResult};
use chrono::NaiveDate;
use patientor_types::NonEmptyText;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Field addressing
// ============================================================================

/// Address of a single form field, printed as its dotted wire name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Type,
    Description,
    Date,
    Specialist,
    DiagnosisCodes,
    HealthCheckRating,
    DischargeDate,
    DischargeCriteria,
    EmployerName,
}

impl FieldPath {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldPath::Type => "type",
            FieldPath::Description => "description",
            FieldPath::Date => "date",
            FieldPath::Specialist => "specialist",
            FieldPath::DiagnosisCodes => "diagnosisCodes",
            FieldPath::HealthCheckRating => "healthCheckRating",
            FieldPath::DischargeDate => "discharge.date",
            FieldPath::DischargeCriteria => "discharge.criteria",
            FieldPath::EmployerName => "employerName",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SHARED_FIELDS: [FieldPath; 5] = [
    FieldPath::Type,
    FieldPath::Description,
    FieldPath::Date,
    FieldPath::Specialist,
    FieldPath::DiagnosisCodes,
];

impl EntryType {
    /// Fields shown by the form while this type is selected.
    pub fn fields(self) -> Vec<FieldPath> {
        let specific: &[FieldPath] = match self {
            EntryType::HealthCheck => &[FieldPath::HealthCheckRating],
            EntryType::Hospital => &[FieldPath::DischargeDate, FieldPath::DischargeCriteria],
            EntryType::OccupationalHealthcare => &[FieldPath::EmployerName],
        };
        SHARED_FIELDS.iter().chain(specific).copied().collect()
    }
}

// ============================================================================
// Values
// ============================================================================

/// Raw discharge inputs of a hospital entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DischargeValues {
    pub date: String,
    pub criteria: String,
}

/// Raw inputs of the form, exactly as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFormValues {
    pub entry_type: Option<EntryType>,
    pub description: String,
    pub date: String,
    pub specialist: String,
    pub diagnosis_codes: Vec<String>,
    pub health_check_rating: Option<i64>,
    pub discharge: DischargeValues,
    pub employer_name: String,
}

impl Default for EntryFormValues {
    fn default() -> Self {
        Self {
            entry_type: Some(EntryType::HealthCheck),
            description: String::new(),
            date: String::new(),
            specialist: String::new(),
            diagnosis_codes: Vec::new(),
            health_check_rating: Some(i64::from(HealthCheckRating::CriticalRisk.level())),
            discharge: DischargeValues::default(),
            employer_name: String::new(),
        }
    }
}

/// A field value as seen by the validation rules.
#[derive(Clone, Copy, Debug)]
enum FieldValue<'a> {
    Text(&'a str),
    Number(Option<i64>),
    Choice(Option<EntryType>),
    List(&'a [String]),
}

impl EntryFormValues {
    fn field(&self, path: FieldPath) -> FieldValue<'_> {
        match path {
            FieldPath::Type => FieldValue::Choice(self.entry_type),
            FieldPath::Description => FieldValue::Text(&self.description),
            FieldPath::Date => FieldValue::Text(&self.date),
            FieldPath::Specialist => FieldValue::Text(&self.specialist),
            FieldPath::DiagnosisCodes => FieldValue::List(&self.diagnosis_codes),
            FieldPath::HealthCheckRating => FieldValue::Number(self.health_check_rating),
            FieldPath::DischargeDate => FieldValue::Text(&self.discharge.date),
            FieldPath::DischargeCriteria => FieldValue::Text(&self.discharge.criteria),
            FieldPath::EmployerName => FieldValue::Text(&self.employer_name),
        }
    }

    fn text_mut(&mut self, path: FieldPath) -> Option<&mut String> {
        match path {
            FieldPath::Description => Some(&mut self.description),
            FieldPath::Date => Some(&mut self.date),
            FieldPath::Specialist => Some(&mut self.specialist),
            FieldPath::DischargeDate => Some(&mut self.discharge.date),
            FieldPath::DischargeCriteria => Some(&mut self.discharge.criteria),
            FieldPath::EmployerName => Some(&mut self.employer_name),
            FieldPath::Type | FieldPath::DiagnosisCodes | FieldPath::HealthCheckRating => None,
        }
    }

    /// Build the create-entry payload from valid values.
    ///
    /// # Errors
    ///
    /// Returns `PatientorError::InvalidForm` with the number of failing fields if the values do not
    /// pass [`validate`].
    pub fn to_new_entry(&self) -> PatientorResult<NewEntry> {
        let errors = validate(self);
        if !errors.is_empty() {
            return Err(PatientorError::InvalidForm(errors.len()));
        }

        let entry_type = self
            .entry_type
            .ok_or_else(|| PatientorError::InvalidInput("type is required".into()))?;

        let kind = match entry_type {
            EntryType::HealthCheck => {
                let level = self.health_check_rating.ok_or_else(|| {
                    PatientorError::InvalidInput("healthCheckRating is required".into())
                })?;
                let health_check_rating = HealthCheckRating::from_level(level).ok_or_else(|| {
                    PatientorError::InvalidInput(format!("healthCheckRating {level} is invalid"))
                })?;
                EntryKind::HealthCheck {
                    health_check_rating,
                }
            }
            EntryType::Hospital => EntryKind::Hospital {
                discharge: Discharge {
                    date: parse_date(FieldPath::DischargeDate, &self.discharge.date)?,
                    criteria: required_text(FieldPath::DischargeCriteria, &self.discharge.criteria)?,
                },
            },
            EntryType::OccupationalHealthcare => EntryKind::OccupationalHealthcare {
                employer_name: required_text(FieldPath::EmployerName, &self.employer_name)?,
            },
        };

        Ok(NewEntry {
            description: required_text(FieldPath::Description, &self.description)?,
            date: parse_date(FieldPath::Date, &self.date)?,
            specialist: required_text(FieldPath::Specialist, &self.specialist)?,
            diagnosis_codes: normalise_codes(&self.diagnosis_codes),
            kind,
        })
    }
}

fn required_text(path: FieldPath, value: &str) -> PatientorResult<String> {
    NonEmptyText::new(value)
        .map(NonEmptyText::into_inner)
        .map_err(|e| PatientorError::InvalidInput(format!("{path}: {e}")))
}

fn parse_date(path: FieldPath, value: &str) -> PatientorResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| PatientorError::InvalidInput(format!("{path}: {e}")))
}

/// Trimmed, de-duplicated codes in input order; `None` when nothing is left.
fn normalise_codes(codes: &[String]) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !out.iter().any(|existing| existing == code) {
            out.push(code.to_string());
        }
    }
    (!out.is_empty()).then_some(out)
}

// ============================================================================
// Schema
// ============================================================================

/// A single validation rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// The field must hold a value; text must not be blank.
    Required,
    /// Non-blank text must be a `YYYY-MM-DD` calendar date.
    CalendarDate,
    /// A present number must be one of the defined health check levels.
    RatingLevel,
}

/// Validation error of a single field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidDate,
    OutOfRange { min: i64, max: i64 },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => f.write_str("Field is required."),
            FieldError::InvalidDate => f.write_str("Date must be a valid date (YYYY-MM-DD)."),
            FieldError::OutOfRange { min, max } => {
                write!(f, "Value must be between {min} and {max}.")
            }
        }
    }
}

impl Rule {
    fn check(self, value: FieldValue<'_>) -> Result<(), FieldError> {
        match (self, value) {
            (Rule::Required, FieldValue::Text(text)) if text.trim().is_empty() => {
                Err(FieldError::Required)
            }
            (Rule::Required, FieldValue::Number(None))
            | (Rule::Required, FieldValue::Choice(None)) => Err(FieldError::Required),
            (Rule::Required, FieldValue::List(items)) if items.is_empty() => {
                Err(FieldError::Required)
            }
            (Rule::CalendarDate, FieldValue::Text(text))
                if !text.trim().is_empty()
                    && NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).is_err() =>
            {
                Err(FieldError::InvalidDate)
            }
            (Rule::RatingLevel, FieldValue::Number(Some(level)))
                if HealthCheckRating::from_level(level).is_none() =>
            {
                Err(FieldError::OutOfRange {
                    min: MIN_HEALTH_CHECK_RATING,
                    max: MAX_HEALTH_CHECK_RATING,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Rules attached to one field.
#[derive(Clone, Copy, Debug)]
pub struct FieldSchema {
    pub path: FieldPath,
    pub rules: &'static [Rule],
}

const SHARED_SCHEMA: &[FieldSchema] = &[
    FieldSchema {
        path: FieldPath::Type,
        rules: &[Rule::Required],
    },
    FieldSchema {
        path: FieldPath::Description,
        rules: &[Rule::Required],
    },
    FieldSchema {
        path: FieldPath::Date,
        rules: &[Rule::Required, Rule::CalendarDate],
    },
    FieldSchema {
        path: FieldPath::Specialist,
        rules: &[Rule::Required],
    },
];

const HEALTH_CHECK_SCHEMA: &[FieldSchema] = &[FieldSchema {
    path: FieldPath::HealthCheckRating,
    rules: &[Rule::Required, Rule::RatingLevel],
}];

const HOSPITAL_SCHEMA: &[FieldSchema] = &[
    FieldSchema {
        path: FieldPath::DischargeDate,
        rules: &[Rule::Required, Rule::CalendarDate],
    },
    FieldSchema {
        path: FieldPath::DischargeCriteria,
        rules: &[Rule::Required],
    },
];

const OCCUPATIONAL_SCHEMA: &[FieldSchema] = &[FieldSchema {
    path: FieldPath::EmployerName,
    rules: &[Rule::Required],
}];

/// Schema in force for the selected type: shared fields first, then the type's own fields.
pub fn schema_for(entry_type: Option<EntryType>) -> impl Iterator<Item = &'static FieldSchema> {
    let specific: &'static [FieldSchema] = match entry_type {
        Some(EntryType::HealthCheck) => HEALTH_CHECK_SCHEMA,
        Some(EntryType::Hospital) => HOSPITAL_SCHEMA,
        Some(EntryType::OccupationalHealthcare) => OCCUPATIONAL_SCHEMA,
        None => &[],
    };
    SHARED_SCHEMA.iter().chain(specific)
}

// ============================================================================
// Error tree
// ============================================================================

/// Errors of the discharge sub-record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DischargeErrors {
    pub date: Option<FieldError>,
    pub criteria: Option<FieldError>,
}

/// Validation errors, shaped like the entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryFormErrors {
    pub entry_type: Option<FieldError>,
    pub description: Option<FieldError>,
    pub date: Option<FieldError>,
    pub specialist: Option<FieldError>,
    pub diagnosis_codes: Option<FieldError>,
    pub health_check_rating: Option<FieldError>,
    pub discharge: DischargeErrors,
    pub employer_name: Option<FieldError>,
}

const ALL_FIELDS: [FieldPath; 9] = [
    FieldPath::Type,
    FieldPath::Description,
    FieldPath::Date,
    FieldPath::Specialist,
    FieldPath::DiagnosisCodes,
    FieldPath::HealthCheckRating,
    FieldPath::DischargeDate,
    FieldPath::DischargeCriteria,
    FieldPath::EmployerName,
];

impl EntryFormErrors {
    pub fn get(&self, path: FieldPath) -> Option<FieldError> {
        match path {
            FieldPath::Type => self.entry_type,
            FieldPath::Description => self.description,
            FieldPath::Date => self.date,
            FieldPath::Specialist => self.specialist,
            FieldPath::DiagnosisCodes => self.diagnosis_codes,
            FieldPath::HealthCheckRating => self.health_check_rating,
            FieldPath::DischargeDate => self.discharge.date,
            FieldPath::DischargeCriteria => self.discharge.criteria,
            FieldPath::EmployerName => self.employer_name,
        }
    }

    fn slot_mut(&mut self, path: FieldPath) -> &mut Option<FieldError> {
        match path {
            FieldPath::Type => &mut self.entry_type,
            FieldPath::Description => &mut self.description,
            FieldPath::Date => &mut self.date,
            FieldPath::Specialist => &mut self.specialist,
            FieldPath::DiagnosisCodes => &mut self.diagnosis_codes,
            FieldPath::HealthCheckRating => &mut self.health_check_rating,
            FieldPath::DischargeDate => &mut self.discharge.date,
            FieldPath::DischargeCriteria => &mut self.discharge.criteria,
            FieldPath::EmployerName => &mut self.employer_name,
        }
    }

    /// Failing fields with their error, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, FieldError)> + '_ {
        ALL_FIELDS
            .into_iter()
            .filter_map(move |path| self.get(path).map(|err| (path, err)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check `values` against the schema of the selected type.
pub fn validate(values: &EntryFormValues) -> EntryFormErrors {
    let mut errors = EntryFormErrors::default();
    for field in schema_for(values.entry_type) {
        let value = values.field(field.path);
        if let Some(err) = field.rules.iter().find_map(|rule| rule.check(value).err()) {
            *errors.slot_mut(field.path) = Some(err);
        }
    }
    errors
}

// ============================================================================
// Form state
// ============================================================================

/// The add-entry form: current values plus their validation result.
///
/// Every setter re-runs validation. The form counts as dirty once its values differ from the
/// initial ones.
#[derive(Clone, Debug)]
pub struct EntryForm {
    values: EntryFormValues,
    errors: EntryFormErrors,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryForm {
    pub fn new() -> Self {
        let values = EntryFormValues::default();
        let errors = validate(&values);
        Self { values, errors }
    }

    pub fn values(&self) -> &EntryFormValues {
        &self.values
    }

    pub fn errors(&self) -> &EntryFormErrors {
        &self.errors
    }

    pub fn entry_type(&self) -> Option<EntryType> {
        self.values.entry_type
    }

    /// Fields shown for the current type; only the shared ones while no type is selected.
    pub fn visible_fields(&self) -> Vec<FieldPath> {
        match self.values.entry_type {
            Some(entry_type) => entry_type.fields(),
            None => SHARED_FIELDS.to_vec(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.values != EntryFormValues::default()
    }

    pub fn can_submit(&self) -> bool {
        self.is_dirty() && self.errors.is_empty()
    }

    /// Switch to another entry type. Shared fields keep their values.
    pub fn select_type(&mut self, entry_type: EntryType) {
        self.set_entry_type(Some(entry_type));
    }

    pub fn set_entry_type(&mut self, entry_type: Option<EntryType>) {
        self.values.entry_type = entry_type;
        self.revalidate();
    }

    /// Set one of the free-text fields.
    ///
    /// # Errors
    ///
    /// Returns `PatientorError::InvalidInput` if `path` is not a text field.
    pub fn set_text(&mut self, path: FieldPath, value: impl Into<String>) -> PatientorResult<()> {
        let slot = self
            .values
            .text_mut(path)
            .ok_or_else(|| PatientorError::InvalidInput(format!("{path} is not a text field")))?;
        *slot = value.into();
        self.revalidate();
        Ok(())
    }

    pub fn set_rating(&mut self, level: Option<i64>) {
        self.values.health_check_rating = level;
        self.revalidate();
    }

    pub fn set_diagnosis_codes(&mut self, codes: Vec<String>) {
        self.values.diagnosis_codes = codes;
        self.revalidate();
    }

    /// Payload for submission.
    ///
    /// # Errors
    ///
    /// Returns `PatientorError::InvalidForm` unless [`EntryForm::can_submit`] holds.
    pub fn submission(&self) -> PatientorResult<NewEntry> {
        if !self.can_submit() {
            return Err(PatientorError::InvalidForm(self.errors.len()));
        }
        self.values.to_new_entry()
    }

    /// Back to the initial values.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn revalidate(&mut self) {
        self.errors = validate(&self.values);
    }
}
