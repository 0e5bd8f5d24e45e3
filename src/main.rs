use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patientor_api::PatientorClient;
use patientor_core::config::api_base_url_from_env_value;
use patientor_core::constants::API_BASE_URL_ENV;
use patientor_core::diagnosis::ensure_catalog;
use patientor_core::{
    load_patient, load_patient_list, ClientConfig, EntryForm, EntryType, FieldPath, PatientPage,
    Store,
};

#[derive(Parser)]
#[command(name = "patientor")]
#[command(about = "Patientor medical records client")]
struct Cli {
    /// Base URL of the REST service (overrides PATIENTOR_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show a patient's page
    Show {
        /// Patient id
        id: String,
    },
    /// Print the diagnosis catalog
    Diagnoses,
    /// Add an entry to a patient
    AddEntry {
        /// Patient id
        id: String,
        /// HealthCheck, Hospital or OccupationalHealthcare
        #[arg(long = "type")]
        entry_type: EntryType,
        #[arg(long, default_value = "")]
        description: String,
        /// Visit date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        specialist: String,
        /// Diagnosis code, repeatable
        #[arg(long = "diagnosis-code")]
        diagnosis_codes: Vec<String>,
        /// Health check rating, 0 (healthy) to 3 (critical risk)
        #[arg(long)]
        rating: Option<i64>,
        /// Discharge date of a hospital stay (YYYY-MM-DD)
        #[arg(long)]
        discharge_date: Option<String>,
        /// Discharge criteria of a hospital stay
        #[arg(long)]
        discharge_criteria: Option<String>,
        /// Employer of an occupational healthcare visit
        #[arg(long)]
        employer: Option<String>,
    },
}

/// Values collected for the add-entry form from the command line.
struct EntryArgs {
    entry_type: EntryType,
    description: String,
    date: String,
    specialist: String,
    diagnosis_codes: Vec<String>,
    rating: Option<i64>,
    discharge_date: Option<String>,
    discharge_criteria: Option<String>,
    employer: Option<String>,
}

fn fill_form(form: &mut EntryForm, args: EntryArgs) -> anyhow::Result<()> {
    form.select_type(args.entry_type);
    form.set_text(FieldPath::Description, args.description)?;
    form.set_text(FieldPath::Date, args.date)?;
    form.set_text(FieldPath::Specialist, args.specialist)?;
    form.set_diagnosis_codes(args.diagnosis_codes);
    if let Some(rating) = args.rating {
        form.set_rating(Some(rating));
    }
    if let Some(date) = args.discharge_date {
        form.set_text(FieldPath::DischargeDate, date)?;
    }
    if let Some(criteria) = args.discharge_criteria {
        form.set_text(FieldPath::DischargeCriteria, criteria)?;
    }
    if let Some(employer) = args.employer {
        form.set_text(FieldPath::EmployerName, employer)?;
    }
    Ok(())
}

/// Entry point of the Patientor client.
///
/// # Environment Variables
/// - `PATIENTOR_API_BASE_URL`: REST base URL (default: "http://localhost:3001/api")
/// - `RUST_LOG`: log filter; logs go to stderr
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patientor=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = match cli.api_url {
        Some(url) => ClientConfig::new(url)?,
        None => api_base_url_from_env_value(std::env::var(API_BASE_URL_ENV).ok())?,
    };
    let client = PatientorClient::new(cfg);
    tracing::debug!("using REST service at {}", client.config().api_base_url());
    let mut store = Store::new();

    match cli.command {
        Some(Commands::List) => {
            let patients = load_patient_list(&mut store, &client).await;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "ID: {}, Name: {}, Occupation: {}",
                    patient.id, patient.name, patient.occupation
                );
            }
        }
        Some(Commands::Show { id }) => {
            let page = PatientPage::new(id);
            if let Some(view) = page.render(&mut store, &client).await? {
                print!("{view}");
            }
        }
        Some(Commands::Diagnoses) => match ensure_catalog(&mut store, &client).await {
            Ok(()) => {
                for diagnosis in store.diagnoses().values() {
                    println!("{diagnosis}");
                }
            }
            Err(e) => tracing::error!("failed to fetch diagnoses: {}", e),
        },
        Some(Commands::AddEntry {
            id,
            entry_type,
            description,
            date,
            specialist,
            diagnosis_codes,
            rating,
            discharge_date,
            discharge_criteria,
            employer,
        }) => {
            let mut page = PatientPage::new(id);
            if load_patient(&mut store, &client, page.patient_id())
                .await
                .is_none()
            {
                anyhow::bail!("patient {} could not be loaded", page.patient_id());
            }

            page.modal_mut().open();
            fill_form(
                page.modal_mut().form_mut(),
                EntryArgs {
                    entry_type,
                    description,
                    date,
                    specialist,
                    diagnosis_codes,
                    rating,
                    discharge_date,
                    discharge_criteria,
                    employer,
                },
            )?;

            if !page.modal().form().can_submit() {
                print!("{}", page.modal().view());
                anyhow::bail!("entry form has validation errors");
            }

            match page.submit_entry(&mut store, &client).await {
                Ok(entry) => {
                    println!("Added entry {}", entry.id);
                    if let Some(view) = page.render(&mut store, &client).await? {
                        print!("{view}");
                    }
                }
                Err(e) => {
                    print!("{}", page.modal().view());
                    return Err(e.into());
                }
            }
        }
        None => {
            println!("Use 'patientor --help' for commands");
        }
    }

    Ok(())
}
