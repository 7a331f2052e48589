use api_shared::{ClinicListQuery, ClinicStatus, CreateClinicReq, PlanTier};
use clap::{Parser, Subcommand, ValueEnum};
use clinic_core::{core_config_from_env, ClinicService, DocumentStore, PlatformAdminService};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic booking platform administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanArg {
    Starter,
    Pro,
}

impl From<PlanArg> for PlanTier {
    fn from(plan: PlanArg) -> Self {
        match plan {
            PlanArg::Starter => PlanTier::Starter,
            PlanArg::Pro => PlanTier::Pro,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Inactive,
    Suspended,
}

impl From<StatusArg> for ClinicStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => ClinicStatus::Active,
            StatusArg::Inactive => ClinicStatus::Inactive,
            StatusArg::Suspended => ClinicStatus::Suspended,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a platform administrator
    CreateAdmin {
        /// Login name
        username: String,
        /// Full name shown in the console
        full_name: String,
        /// Password (6 to 72 characters)
        #[arg(long, env = "CLINIC_ADMIN_PASSWORD")]
        password: String,
    },
    /// List clinics
    ListClinics {
        /// Only clinics in this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Case-insensitive match on display or unique name
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a clinic together with its owner
    CreateClinic {
        /// Globally unique clinic name (lowercase letters, digits and dashes)
        unique_name: String,
        /// Name shown to patients
        display_name: String,
        /// Owner login name
        owner_user_name: String,
        /// Owner name shown in the dashboard
        owner_display_name: String,
        /// Owner password
        #[arg(long, env = "CLINIC_OWNER_PASSWORD")]
        owner_password: String,
        /// Plan tier
        #[arg(long, value_enum, default_value = "starter")]
        plan: PlanArg,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(core_config_from_env()?);
    let store = Arc::new(DocumentStore::open(cfg.data_dir())?);

    match command {
        Commands::CreateAdmin {
            username,
            full_name,
            password,
        } => {
            let admins = PlatformAdminService::new(cfg, store);
            match admins.create(&username, &password, &full_name) {
                Ok(admin) => println!("Created admin {} with ID: {}", admin.username, admin.id),
                Err(e) => eprintln!("Error creating admin: {}", e),
            }
        }
        Commands::ListClinics { status, search } => {
            let clinics = ClinicService::new(cfg, store);
            let query = ClinicListQuery {
                status: status.map(Into::into),
                search,
            };
            let found = clinics.list_clinics(&query)?;
            if found.is_empty() {
                println!("No clinics found.");
            } else {
                for clinic in found {
                    println!(
                        "ID: {}, Name: {} ({}), Status: {:?}, Plan: {:?}, Created: {}",
                        clinic.id,
                        clinic.clinic_display_name,
                        clinic.clinic_unique_name,
                        clinic.status,
                        clinic.plan.tier,
                        clinic.created_at
                    );
                }
            }
        }
        Commands::CreateClinic {
            unique_name,
            display_name,
            owner_user_name,
            owner_display_name,
            owner_password,
            plan,
        } => {
            let clinics = ClinicService::new(cfg, store);
            let req = CreateClinicReq {
                display_name,
                unique_name,
                owner_user_name,
                owner_display_name,
                owner_password,
                plan: plan.into(),
            };
            match clinics.create_clinic(req) {
                Ok(clinic) => println!(
                    "Created clinic {} with ID: {}",
                    clinic.clinic_unique_name, clinic.id
                ),
                Err(e) => eprintln!("Error creating clinic: {}", e),
            }
        }
    }

    Ok(())
}
