//! Constants used throughout the Patientor core crate.

/// Default REST base URL when no explicit URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Environment variable holding the REST base URL.
pub const API_BASE_URL_ENV: &str = "PATIENTOR_API_BASE_URL";

/// Path of the diagnosis catalog, relative to the base URL.
pub const DIAGNOSES_PATH: &str = "/diagnoses";

/// Path of the patient collection, relative to the base URL.
pub const PATIENTS_PATH: &str = "/patients";

/// Lowest valid health check rating.
pub const MIN_HEALTH_CHECK_RATING: i64 = 0;

/// Highest valid health check rating.
pub const MAX_HEALTH_CHECK_RATING: i64 = 3;
