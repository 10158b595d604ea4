//! Portfolio CLI - Database setup and admin API tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! portfolio-cli migrate
//!
//! # Seed default content (add --force to reset skills and company)
//! portfolio-cli seed
//!
//! # Hash an admin password for ADMIN_PASSWORD_HASH
//! portfolio-cli hash-password 'correct horse battery staple'
//!
//! # Call the admin API of a running site
//! portfolio-cli api login -u admin
//! portfolio-cli api projects list
//! portfolio-cli api projects create project.json --tech Axum --metric users=1200
//! portfolio-cli api skills set-level backend 0 85
//! portfolio-cli api company patch company.json --dry-run
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the document store with default content
//! - `hash-password` - Print an Argon2 hash for the admin password
//! - `api` - Manage content through the admin API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use portfolio_core::ProjectRef;

mod commands;

use commands::api::{self, ApiClient, ApiError, ProjectEdits, SkillsEdit};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(author, version, about = "Portfolio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the document store with default content
    Seed {
        /// Overwrite skills and company content with the defaults
        #[arg(long)]
        force: bool,
    },
    /// Print an Argon2 hash for `ADMIN_PASSWORD_HASH`
    HashPassword {
        /// Plaintext password
        password: String,
    },
    /// Call the admin API of a running site
    Api {
        #[command(subcommand)]
        action: ApiAction,
    },
}

#[derive(Subcommand)]
enum ApiAction {
    /// Log in and print the session token
    Login {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password (falls back to `PORTFOLIO_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Export or replace skill categories
    Skills {
        #[command(subcommand)]
        action: SkillsAction,
    },
    /// Show or patch company content
    Company {
        #[command(subcommand)]
        action: CompanyAction,
    },
    /// Upload an image and print its URL
    Upload {
        /// Image file
        file: PathBuf,
    },
}

/// Tweaks applied on top of a project file before it is sent.
#[derive(Args)]
struct ProjectEditArgs {
    /// Remove the technology at this index (repeatable)
    #[arg(long = "remove-tech", value_name = "INDEX")]
    remove_tech: Vec<usize>,

    /// Append a technology (repeatable)
    #[arg(long = "tech", value_name = "NAME")]
    tech: Vec<String>,

    /// Set a metric; an empty value clears it (repeatable)
    #[arg(long = "metric", value_name = "KEY=VALUE", value_parser = api::parse_metric)]
    metrics: Vec<(String, String)>,
}

impl From<ProjectEditArgs> for ProjectEdits {
    fn from(args: ProjectEditArgs) -> Self {
        Self {
            remove_tech: args.remove_tech,
            tech: args.tech,
            metrics: args.metrics,
        }
    }
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List all projects
    List,
    /// Show one project
    Show { id: String },
    /// Create a project from a JSON file
    Create {
        file: PathBuf,
        #[command(flatten)]
        edits: ProjectEditArgs,
    },
    /// Replace a project from a JSON file
    Update {
        id: String,
        file: PathBuf,
        #[command(flatten)]
        edits: ProjectEditArgs,
    },
    /// Delete a project
    Delete { id: String },
}

#[derive(Subcommand)]
enum SkillsAction {
    /// Print the current categories
    Export,
    /// Replace all categories from a JSON file
    Import { file: PathBuf },
    /// Add an empty category
    AddCategory { key: String, name: String },
    /// Remove a category and its skills
    RemoveCategory { key: String },
    /// Add a skill to a category
    Add {
        category: String,
        name: String,
        /// Proficiency, clamped to 0..=100
        #[arg(long, default_value_t = 50)]
        level: i64,
        /// Years of experience
        #[arg(long, default_value_t = 0.0)]
        years: f64,
        /// Icon key
        #[arg(long)]
        icon: Option<String>,
    },
    /// Remove the skill at an index in a category
    Remove { category: String, index: usize },
    /// Change the level of the skill at an index in a category
    SetLevel {
        category: String,
        index: usize,
        level: i64,
    },
}

impl SkillsAction {
    /// The single edit this action makes to the stored categories, if any.
    fn into_edit(self) -> Option<SkillsEdit> {
        Some(match self {
            Self::Export | Self::Import { .. } => return None,
            Self::AddCategory { key, name } => SkillsEdit::AddCategory { key, name },
            Self::RemoveCategory { key } => SkillsEdit::RemoveCategory { key },
            Self::Add {
                category,
                name,
                level,
                years,
                icon,
            } => SkillsEdit::AddSkill {
                category,
                name,
                level,
                years,
                icon,
            },
            Self::Remove { category, index } => SkillsEdit::RemoveSkill { category, index },
            Self::SetLevel {
                category,
                index,
                level,
            } => SkillsEdit::SetLevel {
                category,
                index,
                level,
            },
        })
    }
}

#[derive(Subcommand)]
enum CompanyAction {
    /// Print the company record
    Show,
    /// Overwrite the sections present in a JSON file
    Patch {
        file: PathBuf,

        /// Leave this section as stored even if the file has it (repeatable)
        #[arg(long, value_name = "SECTION")]
        keep: Vec<String>,

        /// Print the record as it would look after saving, without saving
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { force } => commands::seed::run(force).await?,
        Commands::HashPassword { password } => commands::password::hash(&password)?,
        Commands::Api { action } => run_api(action).await?,
    }
    Ok(())
}

async fn run_api(action: ApiAction) -> Result<(), ApiError> {
    let authenticated = !matches!(action, ApiAction::Login { .. });
    let client = ApiClient::from_env(authenticated)?;

    match action {
        ApiAction::Login { username, password } => {
            let password = password
                .or_else(|| std::env::var("PORTFOLIO_PASSWORD").ok())
                .map(SecretString::from)
                .ok_or(ApiError::MissingEnvVar("PORTFOLIO_PASSWORD"))?;
            let token = client.login(&username, &password).await?;
            tracing::info!("Logged in; export PORTFOLIO_TOKEN to use the other commands");

            #[allow(clippy::print_stdout)]
            {
                println!("{token}");
            }
        }
        ApiAction::Projects { action } => {
            let body = match action {
                ProjectAction::List => client.list_projects().await?,
                ProjectAction::Show { id } => client.get_project(&ProjectRef::parse(&id)).await?,
                ProjectAction::Create { file, edits } => {
                    let mut draft = api::project_draft(&file).await?;
                    ProjectEdits::from(edits).apply(&mut draft)?;
                    client.create_project(&draft).await?
                }
                ProjectAction::Update { id, file, edits } => {
                    let mut draft = api::project_draft(&file).await?;
                    ProjectEdits::from(edits).apply(&mut draft)?;
                    client.update_project(&ProjectRef::parse(&id), &draft).await?
                }
                ProjectAction::Delete { id } => {
                    client.delete_project(&ProjectRef::parse(&id)).await?
                }
            };
            api::print(&body);
        }
        ApiAction::Skills { action } => {
            let body = match action {
                SkillsAction::Export => client.get_skills().await?,
                SkillsAction::Import { file } => {
                    let draft = api::skills_draft(&file).await?;
                    client.put_skills(&draft).await?
                }
                edit => {
                    let mut draft = client.skills_draft().await?;
                    if let Some(edit) = edit.into_edit() {
                        edit.apply(&mut draft)?;
                    }
                    client.put_skills(&draft).await?
                }
            };
            api::print(&body);
        }
        ApiAction::Company { action } => match action {
            CompanyAction::Show => {
                let record = client.get_company().await?;
                api::print(&serde_json::Value::Object(record.to_document()));
            }
            CompanyAction::Patch {
                file,
                keep,
                dry_run,
            } => {
                let current = client.get_company().await?;
                let mut draft = api::company_draft(&file, current).await?;
                api::keep_sections(&mut draft, &keep)?;
                if dry_run {
                    api::print(&serde_json::Value::Object(draft.preview().to_document()));
                } else {
                    api::print(&client.put_company(&draft).await?);
                }
            }
        },
        ApiAction::Upload { file } => api::print(&client.upload(&file).await?),
    }
    Ok(())
}
