//! Session store of patients and diagnoses.
//!
//! [`State`] is an immutable snapshot; [`reducer`] is the only function that derives a new snapshot
//! from an old one. [`Store`] owns the current snapshot for the session and funnels every mutation
//! through `reducer` via [`Store::dispatch`]. Nothing is ever evicted, and entries are only ever
//! appended.

use crate::diagnosis::{CatalogState, Diagnosis};
use crate::entry::Entry;
use crate::patient::Patient;
use std::collections::BTreeMap;

/// Snapshot of everything the client knows in this session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
    pub patients: BTreeMap<String, Patient>,
    pub diagnoses: BTreeMap<String, Diagnosis>,
}

/// Store transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Merge a list of patients; patients already in the store win on id collision.
    SetPatientList(Vec<Patient>),
    /// Add one patient, replacing any stored patient with the same id.
    AddPatient(Patient),
    /// Merge diagnoses by code; incoming diagnoses replace stored ones.
    SetDiagnosisList(Vec<Diagnosis>),
    /// Append one entry to one patient's entries.
    AddEntry { patient_id: String, entry: Entry },
}

pub fn set_patient_list(patients: Vec<Patient>) -> Action {
    Action::SetPatientList(patients)
}

pub fn add_patient(patient: Patient) -> Action {
    Action::AddPatient(patient)
}

pub fn set_diagnosis_list(diagnoses: Vec<Diagnosis>) -> Action {
    Action::SetDiagnosisList(diagnoses)
}

pub fn add_entry(patient_id: impl Into<String>, entry: Entry) -> Action {
    Action::AddEntry {
        patient_id: patient_id.into(),
        entry,
    }
}

/// Derive the next snapshot from `state` and `action`.
///
/// `state` is left untouched. An `AddEntry` for a patient that is not in the store yields an
/// unchanged snapshot.
pub fn reducer(state: &State, action: Action) -> State {
    match action {
        Action::SetPatientList(incoming) => {
            let mut patients: BTreeMap<String, Patient> = incoming
                .into_iter()
                .map(|patient| (patient.id.clone(), patient))
                .collect();
            patients.extend(
                state
                    .patients
                    .iter()
                    .map(|(id, patient)| (id.clone(), patient.clone())),
            );
            State {
                patients,
                diagnoses: state.diagnoses.clone(),
            }
        }
        Action::AddPatient(patient) => {
            let mut patients = state.patients.clone();
            patients.insert(patient.id.clone(), patient);
            State {
                patients,
                diagnoses: state.diagnoses.clone(),
            }
        }
        Action::SetDiagnosisList(incoming) => {
            let mut diagnoses = state.diagnoses.clone();
            diagnoses.extend(
                incoming
                    .into_iter()
                    .map(|diagnosis| (diagnosis.code.clone(), diagnosis)),
            );
            State {
                patients: state.patients.clone(),
                diagnoses,
            }
        }
        Action::AddEntry { patient_id, entry } => {
            let mut patients = state.patients.clone();
            if let Some(patient) = patients.get_mut(&patient_id) {
                patient.entries.push(entry);
            }
            State {
                patients,
                diagnoses: state.diagnoses.clone(),
            }
        }
    }
}

/// The session's application state.
///
/// Passed by reference to whatever needs to read or change it. Reads go through the accessors;
/// writes go through [`Store::dispatch`].
#[derive(Debug, Default)]
pub struct Store {
    state: State,
    catalog: CatalogState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.state.patients.get(id)
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.state.patients.values()
    }

    pub fn diagnoses(&self) -> &BTreeMap<String, Diagnosis> {
        &self.state.diagnoses
    }

    /// Apply `action` through [`reducer`].
    pub fn dispatch(&mut self, action: Action) {
        if let Action::AddEntry { patient_id, .. } = &action {
            if !self.state.patients.contains_key(patient_id) {
                tracing::warn!("dropping entry for unknown patient {}", patient_id);
            }
        }
        let sets_catalog = matches!(action, Action::SetDiagnosisList(_));
        self.state = reducer(&self.state, action);
        if sets_catalog {
            self.catalog = CatalogState::Populated;
        }
    }

    /// Where the diagnosis catalog is in its lifecycle.
    pub fn catalog_state(&self) -> CatalogState {
        self.catalog
    }

    /// Mark the catalog as loading for as long as the returned fetch is alive.
    pub(crate) fn begin_catalog_fetch(&mut self) -> CatalogFetch<'_> {
        self.catalog = CatalogState::Loading;
        CatalogFetch { store: self }
    }
}

/// An in-flight catalog fetch.
///
/// Completing it stores the fetched diagnoses. Dropping it without completing (failed or
/// cancelled fetch) returns the catalog to [`CatalogState::Empty`].
#[derive(Debug)]
pub(crate) struct CatalogFetch<'a> {
    store: &'a mut Store,
}

impl CatalogFetch<'_> {
    pub(crate) fn complete(self, diagnoses: Vec<Diagnosis>) {
        self.store.dispatch(set_diagnosis_list(diagnoses));
    }
}

impl Drop for CatalogFetch<'_> {
    fn drop(&mut self) {
        if self.store.catalog == CatalogState::Loading {
            self.store.catalog = CatalogState::Empty;
        }
    }
}
