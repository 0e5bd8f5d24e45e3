//! The REST collaborator seen from the core.
//!
//! The core never talks HTTP itself. Orchestration code is generic over [`PatientorApi`], which the
//! `patientor-api` crate implements with `reqwest` and tests implement in memory.

use crate::diagnosis::Diagnosis;
use crate::entry::{Entry, NewEntry};
use crate::patient::Patient;
use crate::PatientorResult;

/// Remote operations of the patient records service.
#[allow(async_fn_in_trait)]
pub trait PatientorApi {
    /// `GET /patients`
    async fn fetch_patient_list(&self) -> PatientorResult<Vec<Patient>>;

    /// `GET /patients/:id`
    async fn fetch_patient(&self, id: &str) -> PatientorResult<Patient>;

    /// `GET /diagnoses`
    async fn fetch_diagnoses(&self) -> PatientorResult<Vec<Diagnosis>>;

    /// `POST /patients/:id/entries`
    ///
    /// On rejection the error is `PatientorError::Rejected` carrying the server's `error` string.
    async fn create_entry(&self, patient_id: &str, entry: &NewEntry) -> PatientorResult<Entry>;
}
