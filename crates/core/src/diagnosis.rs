//! Diagnosis catalog and code resolution.
//!
//! The catalog is reference data fetched once per session and kept in the [`Store`]. Resolution is
//! read-through: a populated catalog answers synchronously, an empty one is fetched first.
//!
//! A code that the catalog does not know is a data-integrity failure and is reported as
//! [`PatientorError::UnknownDiagnosisCode`] rather than skipped.

use crate::api::PatientorApi;
use crate::state::Store;
use crate::{PatientorError, PatientorResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A catalog record mapping a code to its name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin: Option<String>,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.name)
    }
}

/// Lifecycle of the session's diagnosis catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CatalogState {
    /// Nothing fetched yet, or the last fetch failed or was cancelled.
    #[default]
    Empty,
    /// A catalog fetch is in flight.
    Loading,
    /// A catalog has been stored in this session.
    Populated,
}

/// Resolve `codes` against `catalog`, keeping the order of `codes`.
///
/// # Errors
///
/// Returns `PatientorError::UnknownDiagnosisCode` for the first code the catalog does not contain.
pub fn lookup(
    catalog: &BTreeMap<String, Diagnosis>,
    codes: &[String],
) -> PatientorResult<Vec<Diagnosis>> {
    codes
        .iter()
        .map(|code| {
            catalog
                .get(code)
                .cloned()
                .ok_or_else(|| PatientorError::UnknownDiagnosisCode(code.clone()))
        })
        .collect()
}

/// Make sure the store holds the diagnosis catalog, fetching it if it does not.
///
/// On a failed or cancelled fetch the catalog returns to [`CatalogState::Empty`] so a later call
/// can retry.
pub async fn ensure_catalog<A: PatientorApi>(store: &mut Store, api: &A) -> PatientorResult<()> {
    match store.catalog_state() {
        CatalogState::Populated => {
            tracing::debug!("diagnosis catalog already populated");
            return Ok(());
        }
        CatalogState::Loading | CatalogState::Empty => {}
    }

    let fetch = store.begin_catalog_fetch();
    tracing::debug!("fetching diagnosis catalog");
    let diagnoses = api.fetch_diagnoses().await?;
    tracing::debug!("fetched {} diagnoses", diagnoses.len());
    fetch.complete(diagnoses);
    Ok(())
}

/// Resolve diagnosis codes to catalog records, fetching the catalog on first use.
///
/// An empty `codes` slice resolves to an empty list without touching the network.
///
/// # Errors
///
/// - any error from the catalog fetch;
/// - `PatientorError::UnknownDiagnosisCode` if a code is not in the catalog.
pub async fn resolve<A: PatientorApi>(
    store: &mut Store,
    api: &A,
    codes: &[String],
) -> PatientorResult<Vec<Diagnosis>> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    ensure_catalog(store, api).await?;
    lookup(store.diagnoses(), codes)
}
