//! # Patientor Core
//!
//! Client-side logic of the Patientor medical records client.
//!
//! This crate contains the data model and everything that runs between the REST service and the
//! screen:
//! - the session [`Store`] and its pure [`reducer`]
//! - read-through resolution of diagnosis codes
//! - the add-entry form with schema-based validation
//! - headless views of the patient page and the page orchestration
//!
//! **No transport concerns**: HTTP lives in `patientor-api`, which implements [`PatientorApi`].

pub mod api;
pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod entry;
pub mod error;
pub mod form;
pub mod page;
pub mod patient;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::PatientorApi;
pub use config::ClientConfig;
pub use diagnosis::{CatalogState, Diagnosis};
pub use entry::{
    Discharge, Entry, EntryDetails, EntryKind, EntryType, HealthCheckRating, NewEntry,
};
pub use error::{PatientorError, PatientorResult};
pub use form::{EntryForm, EntryFormErrors, FieldError, FieldPath};
pub use page::{load_patient, load_patient_list, AddEntryModal, PatientPage};
pub use patient::{Gender, Patient};
pub use state::{reducer, Action, State, Store};
pub use view::{AddEntryModalView, EntryCard, EntryView, PatientView};

// Re-export the validated text type used across the entry model.
pub use patientor_types::NonEmptyText;
