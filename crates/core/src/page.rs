//! Patient page orchestration.
//!
//! Ties the store, the REST collaborator and the views together:
//! - a patient is read from the store when present and fetched (then stored) otherwise;
//! - diagnosis codes of all entries are resolved through one catalog fetch;
//! - the add-entry modal submits a validated form and appends the server's entry to the store.
//!
//! Failed reads are logged and render nothing. A diagnosis code missing from the catalog fails
//! the page render with `PatientorError::UnknownDiagnosisCode`.

use crate::api::PatientorApi;
use crate::diagnosis::{ensure_catalog, resolve};
use crate::entry::Entry;
use crate::form::EntryForm;
use crate::patient::Patient;
use crate::state::{add_entry, add_patient, set_patient_list, Store};
use crate::view::{AddEntryModalView, EntryCard, EntryView, PatientView};
use crate::PatientorResult;

/// Fetch the patient list and merge it into the store.
///
/// Returns every patient the store knows afterwards. A failed fetch is logged and leaves the store
/// as it was.
pub async fn load_patient_list<A: PatientorApi>(store: &mut Store, api: &A) -> Vec<Patient> {
    match api.fetch_patient_list().await {
        Ok(patients) => {
            tracing::debug!("fetched {} patients", patients.len());
            store.dispatch(set_patient_list(patients));
        }
        Err(e) => tracing::error!("failed to fetch patient list: {}", e),
    }
    store.patients().cloned().collect()
}

/// Resolve a patient by id, from the store if possible.
///
/// `None` means the fetch failed; the failure is logged.
pub async fn load_patient<A: PatientorApi>(
    store: &mut Store,
    api: &A,
    id: &str,
) -> Option<Patient> {
    if let Some(patient) = store.patient(id) {
        tracing::debug!("patient {} served from store", id);
        return Some(patient.clone());
    }

    match api.fetch_patient(id).await {
        Ok(patient) => {
            store.dispatch(add_patient(patient.clone()));
            Some(patient)
        }
        Err(e) => {
            tracing::error!("failed to fetch patient {}: {}", id, e);
            None
        }
    }
}

/// Build entry views, resolving every entry's diagnosis codes.
///
/// If the catalog cannot be fetched, the diagnosis lists render empty.
///
/// # Errors
///
/// Returns `PatientorError::UnknownDiagnosisCode` if an entry references a code the catalog lacks.
pub async fn entry_views<A: PatientorApi>(
    store: &mut Store,
    api: &A,
    entries: &[Entry],
) -> PatientorResult<Vec<EntryView>> {
    let has_codes = entries
        .iter()
        .any(|entry| !entry.details.diagnosis_codes().is_empty());

    let catalog_ready = if has_codes {
        match ensure_catalog(store, api).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to fetch diagnoses: {}", e);
                false
            }
        }
    } else {
        false
    };

    let mut views = Vec::with_capacity(entries.len());
    for entry in entries {
        let diagnoses = if catalog_ready {
            resolve(store, api, entry.details.diagnosis_codes()).await?
        } else {
            Vec::new()
        };
        views.push(EntryView {
            card: EntryCard::from_entry(entry),
            diagnoses,
        });
    }
    Ok(views)
}

// ============================================================================
// Add-entry modal
// ============================================================================

/// Modal wrapping the add-entry form.
#[derive(Clone, Debug, Default)]
pub struct AddEntryModal {
    open: bool,
    error: Option<String>,
    form: EntryForm,
}

impl AddEntryModal {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EntryForm {
        &mut self.form
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the modal, discarding the form contents and any submission error.
    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
        self.form.reset();
    }

    pub fn view(&self) -> AddEntryModalView {
        AddEntryModalView {
            open: self.open,
            error: self.error.clone(),
            selected_type: self.form.entry_type(),
            visible_fields: self.form.visible_fields(),
            field_errors: self.form.errors().iter().collect(),
            submit_enabled: self.form.can_submit(),
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// The page of a single patient.
#[derive(Clone, Debug)]
pub struct PatientPage {
    patient_id: String,
    modal: AddEntryModal,
}

impl PatientPage {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            modal: AddEntryModal::default(),
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn modal(&self) -> &AddEntryModal {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut AddEntryModal {
        &mut self.modal
    }

    /// Render the page.
    ///
    /// `Ok(None)` until the patient can be resolved.
    ///
    /// # Errors
    ///
    /// Returns `PatientorError::UnknownDiagnosisCode` if an entry references an unknown code.
    pub async fn render<A: PatientorApi>(
        &self,
        store: &mut Store,
        api: &A,
    ) -> PatientorResult<Option<PatientView>> {
        let Some(patient) = load_patient(store, api, &self.patient_id).await else {
            return Ok(None);
        };

        let entries = entry_views(store, api, &patient.entries).await?;
        Ok(Some(PatientView::new(&patient, entries)))
    }

    /// Submit the modal's form.
    ///
    /// On success the created entry is appended to the patient in the store and the modal is
    /// cleared and closed. On failure the modal stays open and shows the server's message.
    ///
    /// # Errors
    ///
    /// - `PatientorError::InvalidForm` if the form is pristine or has validation errors; nothing is
    ///   sent;
    /// - any error from the API call.
    pub async fn submit_entry<A: PatientorApi>(
        &mut self,
        store: &mut Store,
        api: &A,
    ) -> PatientorResult<Entry> {
        let new_entry = self.modal.form.submission()?;

        match api.create_entry(&self.patient_id, &new_entry).await {
            Ok(entry) => {
                tracing::info!("created entry {} for patient {}", entry.id, self.patient_id);
                store.dispatch(add_entry(self.patient_id.clone(), entry.clone()));
                self.modal.close();
                Ok(entry)
            }
            Err(e) => {
                tracing::error!("failed to create entry for {}: {}", self.patient_id, e);
                self.modal.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryType;
    use crate::form::FieldPath;
    use crate::testing::{sample_entry, sample_patient, FakeApi, PATIENT_ID};
    use crate::PatientorError;

    fn fill_hospital_form(page: &mut PatientPage) {
        let form = page.modal_mut().form_mut();
        form.select_type(EntryType::Hospital);
        form.set_text(FieldPath::Description, "Broken thumb").unwrap();
        form.set_text(FieldPath::Date, "2015-01-02").unwrap();
        form.set_text(FieldPath::Specialist, "MD House").unwrap();
        form.set_text(FieldPath::DischargeDate, "2015-01-16").unwrap();
        form.set_text(FieldPath::DischargeCriteria, "Thumb has healed.")
            .unwrap();
        form.set_diagnosis_codes(vec!["S62.5".into()]);
    }

    #[tokio::test]
    async fn load_patient_fetches_once_then_reuses_store() {
        let api = FakeApi::new();
        let mut store = Store::new();

        let first = load_patient(&mut store, &api, PATIENT_ID).await;
        let second = load_patient(&mut store, &api, PATIENT_ID).await;

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(api.patient_fetches(), 1);
        assert!(store.patient(PATIENT_ID).is_some());
    }

    #[tokio::test]
    async fn load_patient_failure_renders_nothing() {
        let api = FakeApi::new().failing_reads();
        let mut store = Store::new();
        let page = PatientPage::new(PATIENT_ID);

        let view = page.render(&mut store, &api).await.expect("no integrity error");

        assert!(view.is_none());
        assert!(store.patient(PATIENT_ID).is_none());
    }

    #[tokio::test]
    async fn load_patient_list_merges_without_losing_entries() {
        let api = FakeApi::new();
        let mut store = Store::new();
        load_patient(&mut store, &api, PATIENT_ID).await;

        let patients = load_patient_list(&mut store, &api).await;

        assert_eq!(patients.len(), 1);
        assert_eq!(store.patient(PATIENT_ID).unwrap().entries.len(), 1);
    }

    #[tokio::test]
    async fn render_resolves_diagnoses_in_order() {
        let api = FakeApi::new();
        let mut store = Store::new();
        let page = PatientPage::new(PATIENT_ID);

        let view = page
            .render(&mut store, &api)
            .await
            .expect("renders")
            .expect("patient resolved");

        let codes: Vec<&str> = view.entries[0]
            .diagnoses
            .iter()
            .map(|d| d.code.as_str())
            .collect();
        assert_eq!(codes, ["M24.2", "S03.5"]);
        assert_eq!(api.diagnosis_fetches(), 1);
    }

    #[tokio::test]
    async fn render_fails_on_unknown_code() {
        let api = FakeApi::new().with_patient(sample_patient(vec![
            sample_entry("e1", Some(vec!["M24.2"])),
            sample_entry("e2", Some(vec!["Q99.9"])),
        ]));
        let mut store = Store::new();
        let page = PatientPage::new(PATIENT_ID);

        let err = page.render(&mut store, &api).await.expect_err("unknown code");

        assert!(matches!(err, PatientorError::UnknownDiagnosisCode(code) if code == "Q99.9"));
    }

    #[tokio::test]
    async fn render_shows_entries_without_diagnoses_when_catalog_fails() {
        let api = FakeApi::new().failing_diagnoses();
        let mut store = Store::new();
        let page = PatientPage::new(PATIENT_ID);

        let view = page
            .render(&mut store, &api)
            .await
            .expect("renders")
            .expect("patient resolved");

        assert_eq!(view.entries.len(), 1);
        assert!(view.entries[0].diagnoses.is_empty());
    }

    #[tokio::test]
    async fn render_many_entries_fetches_catalog_once() {
        let api = FakeApi::new().with_patient(sample_patient(vec![
            sample_entry("e1", Some(vec!["M24.2"])),
            sample_entry("e2", Some(vec!["S03.5"])),
            sample_entry("e3", None),
        ]));
        let mut store = Store::new();
        let page = PatientPage::new(PATIENT_ID);

        let view = page.render(&mut store, &api).await.unwrap().unwrap();

        assert_eq!(view.entries.len(), 3);
        assert!(view.entries[2].diagnoses.is_empty());
        assert_eq!(api.diagnosis_fetches(), 1);
    }

    #[tokio::test]
    async fn submit_success_appends_entry_and_closes_modal() {
        let api = FakeApi::new();
        let mut store = Store::new();
        let mut page = PatientPage::new(PATIENT_ID);
        load_patient(&mut store, &api, PATIENT_ID).await;

        page.modal_mut().open();
        fill_hospital_form(&mut page);
        assert!(page.modal().view().submit_enabled);

        let entry = page.submit_entry(&mut store, &api).await.expect("created");

        assert_eq!(entry.id, "server-1");
        let stored = &store.patient(PATIENT_ID).unwrap().entries;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.last().unwrap(), &entry);
        assert!(!page.modal().is_open());
        assert!(!page.modal().form().is_dirty());
        assert_eq!(api.created()[0].0, PATIENT_ID);
    }

    #[tokio::test]
    async fn submit_failure_keeps_modal_open_with_error() {
        let api = FakeApi::new().rejecting_entries("Incorrect or missing discharge");
        let mut store = Store::new();
        let mut page = PatientPage::new(PATIENT_ID);
        load_patient(&mut store, &api, PATIENT_ID).await;

        page.modal_mut().open();
        fill_hospital_form(&mut page);

        let err = page.submit_entry(&mut store, &api).await.expect_err("rejected");

        assert!(matches!(err, PatientorError::Rejected { status: 400, .. }));
        assert!(page.modal().is_open());
        assert_eq!(page.modal().error(), Some("Incorrect or missing discharge"));
        assert!(page.modal().form().is_dirty());
        assert_eq!(store.patient(PATIENT_ID).unwrap().entries.len(), 1);
        assert!(page
            .modal()
            .view()
            .to_string()
            .contains("Error: Incorrect or missing discharge"));
    }

    #[tokio::test]
    async fn submit_invalid_form_sends_nothing() {
        let api = FakeApi::new();
        let mut store = Store::new();
        let mut page = PatientPage::new(PATIENT_ID);
        page.modal_mut().open();
        page.modal_mut().form_mut().select_type(EntryType::Hospital);

        let err = page.submit_entry(&mut store, &api).await.expect_err("invalid");

        assert!(matches!(err, PatientorError::InvalidForm(_)));
        assert!(api.created().is_empty());
        assert!(page.modal().is_open());
    }

    #[test]
    fn closing_modal_clears_error_and_form() {
        let mut page = PatientPage::new(PATIENT_ID);
        page.modal_mut().open();
        fill_hospital_form(&mut page);
        page.modal_mut().error = Some("boom".into());

        page.modal_mut().close();

        assert!(!page.modal().is_open());
        assert_eq!(page.modal().error(), None);
        assert!(!page.modal().form().is_dirty());
    }
}
