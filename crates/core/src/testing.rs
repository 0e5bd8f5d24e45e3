//! In-memory stand-in for the REST service, shared by the unit tests.

use crate::api::PatientorApi;
use crate::diagnosis::Diagnosis;
use crate::entry::{Entry, EntryDetails, EntryKind, HealthCheckRating, NewEntry};
use crate::patient::{Gender, Patient};
use crate::{PatientorError, PatientorResult};
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const PATIENT_ID: &str = "d2773336-f723-11e9-8f0b-362b9e155667";

pub fn sample_diagnoses() -> Vec<Diagnosis> {
    vec![
        Diagnosis {
            code: "M24.2".into(),
            name: "Disorder of ligament".into(),
            latin: Some("Morbositas ligamenti".into()),
        },
        Diagnosis {
            code: "S03.5".into(),
            name: "Sprain and strain of joints and ligaments of other parts of head".into(),
            latin: None,
        },
        Diagnosis {
            code: "S62.5".into(),
            name: "Fracture of thumb".into(),
            latin: Some("Fractura [ossis] pollicis".into()),
        },
    ]
}

pub fn sample_entry(id: &str, codes: Option<Vec<&str>>) -> Entry {
    Entry {
        id: id.into(),
        details: EntryDetails {
            description: "Yearly control visit.".into(),
            date: NaiveDate::from_ymd_opt(2019, 10, 20).unwrap(),
            specialist: "MD House".into(),
            diagnosis_codes: codes.map(|c| c.into_iter().map(String::from).collect()),
            kind: EntryKind::HealthCheck {
                health_check_rating: HealthCheckRating::LowRisk,
            },
        },
    }
}

pub fn sample_patient(entries: Vec<Entry>) -> Patient {
    Patient {
        id: PATIENT_ID.into(),
        name: "John McClane".into(),
        date_of_birth: Some("1986-07-09".into()),
        ssn: Some("090786-122X".into()),
        gender: Gender::Male,
        occupation: "New york city cop".into(),
        entries,
    }
}

#[derive(Debug)]
pub struct FakeApi {
    patients: BTreeMap<String, Patient>,
    diagnoses: Vec<Diagnosis>,
    fail_reads: bool,
    fail_diagnoses: bool,
    stall_diagnoses: bool,
    reject_with: Option<String>,
    patient_fetches: Cell<usize>,
    diagnosis_fetches: Cell<usize>,
    created: RefCell<Vec<(String, NewEntry)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        let patient = sample_patient(vec![sample_entry("e1", Some(vec!["M24.2", "S03.5"]))]);
        Self {
            patients: BTreeMap::from([(patient.id.clone(), patient)]),
            diagnoses: sample_diagnoses(),
            fail_reads: false,
            fail_diagnoses: false,
            stall_diagnoses: false,
            reject_with: None,
            patient_fetches: Cell::new(0),
            diagnosis_fetches: Cell::new(0),
            created: RefCell::new(Vec::new()),
        }
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patients.insert(patient.id.clone(), patient);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_diagnoses(mut self) -> Self {
        self.fail_diagnoses = true;
        self
    }

    pub fn stalled_diagnoses(mut self) -> Self {
        self.stall_diagnoses = true;
        self
    }

    pub fn rejecting_entries(mut self, message: &str) -> Self {
        self.reject_with = Some(message.into());
        self
    }

    pub fn patient_fetches(&self) -> usize {
        self.patient_fetches.get()
    }

    pub fn diagnosis_fetches(&self) -> usize {
        self.diagnosis_fetches.get()
    }

    pub fn created(&self) -> Vec<(String, NewEntry)> {
        self.created.borrow().clone()
    }
}

impl PatientorApi for FakeApi {
    async fn fetch_patient_list(&self) -> PatientorResult<Vec<Patient>> {
        if self.fail_reads {
            return Err(PatientorError::Transport("connection refused".into()));
        }
        Ok(self
            .patients
            .values()
            .map(|p| Patient {
                ssn: None,
                entries: Vec::new(),
                ..p.clone()
            })
            .collect())
    }

    async fn fetch_patient(&self, id: &str) -> PatientorResult<Patient> {
        self.patient_fetches.set(self.patient_fetches.get() + 1);
        if self.fail_reads {
            return Err(PatientorError::Transport("connection refused".into()));
        }
        self.patients
            .get(id)
            .cloned()
            .ok_or_else(|| PatientorError::Rejected {
                status: 404,
                message: format!("patient {id} not found"),
            })
    }

    async fn fetch_diagnoses(&self) -> PatientorResult<Vec<Diagnosis>> {
        self.diagnosis_fetches.set(self.diagnosis_fetches.get() + 1);
        if self.stall_diagnoses {
            std::future::pending::<()>().await;
        }
        if self.fail_reads || self.fail_diagnoses {
            return Err(PatientorError::Transport("connection refused".into()));
        }
        Ok(self.diagnoses.clone())
    }

    async fn create_entry(&self, patient_id: &str, entry: &NewEntry) -> PatientorResult<Entry> {
        if let Some(message) = &self.reject_with {
            return Err(PatientorError::Rejected {
                status: 400,
                message: message.clone(),
            });
        }
        let mut created = self.created.borrow_mut();
        created.push((patient_id.to_string(), entry.clone()));
        Ok(Entry {
            id: format!("server-{}", created.len()),
            details: entry.clone(),
        })
    }
}
