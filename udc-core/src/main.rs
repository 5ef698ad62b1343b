// UDC - University disciplinary complaint tracker
// Entry point: command-line front end over the complaint tracker core

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use udc_core::app::AppState;
use udc_core::commands;
use udc_core::config::DEMO_INVESTIGATOR_ID;
use udc_core::database::{ComplaintCategory, ComplaintStatus, ProfileUpdate, Role};
use udc_core::events::{Notice, NoticeVariant};
use udc_core::services::{BehaviorSettings, ComplaintFilter, GeneralSettings, NotificationSettings};

#[derive(Parser)]
#[command(name = "udc")]
#[command(about = "University disciplinary complaint tracker", version)]
struct Cli {
    /// Directory holding the database and settings file
    #[arg(short, long, env = "UDC_DATA_DIR", default_value = "udc-data")]
    data_dir: PathBuf,

    /// Simulated latency in milliseconds (overrides the settings file)
    #[arg(long, env = "UDC_LATENCY_MS")]
    latency_ms: Option<u64>,

    /// Log filter, e.g. "udc=debug,info"
    #[arg(long, env = "UDC_LOG", default_value = "udc=debug,info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show application information
    Info,

    /// Log in with a demo or registered account
    Login { email: String, password: String },

    /// Register a new student account and log in
    Register {
        name: String,
        email: String,
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Replace the profile of the logged-in account
    UpdateProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        department: Option<String>,
    },

    /// Change the password of the logged-in account
    ChangePassword { current: String, new: String },

    /// Submit a complaint
    Submit {
        title: String,
        description: String,
        /// academic_misconduct, harassment, discrimination, safety_concern, facility_issue or other
        category: ComplaintCategory,
    },

    /// List visible complaints
    List {
        /// Text to look for in title or description
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        status: Option<ComplaintStatus>,
        #[arg(short, long)]
        category: Option<ComplaintCategory>,
    },

    /// Most recently created complaints
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one complaint with its tracking history
    Show { id: String },

    /// Change the status of a complaint (staff)
    Status {
        id: String,
        status: ComplaintStatus,
        #[arg(short, long)]
        resolution: Option<String>,
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Assign a complaint to an investigator (staff)
    Assign {
        id: String,
        #[arg(long, default_value = DEMO_INVESTIGATOR_ID)]
        investigator_id: String,
        #[arg(long, default_value = "Investigator User")]
        investigator_name: String,
    },

    /// Complaint statistics over the visible set
    Stats,

    /// Show the notification feed
    Notifications,

    /// Mark one notification as read
    Read { id: String },

    /// Mark every notification as read
    ReadAll,

    /// Delete one notification
    DeleteNotification { id: String },

    /// Delete every notification
    ClearNotifications,

    /// List accounts (staff)
    Users {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        role: Option<Role>,
    },

    /// Export accounts as CSV (staff)
    ExportUsers {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        role: Option<Role>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print all settings
    Show,

    /// Change the application name and email domain (admin)
    General {
        #[arg(long)]
        app_name: String,
        #[arg(long)]
        email_domain: String,
    },

    /// Enable or disable notification popups (admin)
    Notifications {
        #[arg(long)]
        enabled: bool,
    },

    /// Change the simulated latency (admin)
    Latency { ms: u64 },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notice(notice: &Notice) {
    let marker = match notice.variant {
        NoticeVariant::Default => "*",
        NoticeVariant::Destructive => "!",
    };
    eprintln!("{} {}: {}", marker, notice.title, notice.description);
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Info => print_json(&commands::get_app_info(state).await?)?,
        Command::Login { email, password } => {
            print_json(&commands::login(state, email, password).await?)?
        }
        Command::Register {
            name,
            email,
            password,
        } => print_json(&commands::register(state, name, email, password).await?)?,
        Command::Logout => commands::logout(state).await?,
        Command::Whoami => print_json(&commands::current_user(state).await?)?,
        Command::UpdateProfile {
            name,
            email,
            age,
            department,
        } => {
            let update = ProfileUpdate {
                name,
                email,
                age,
                department,
            };
            print_json(&commands::update_profile(state, update).await?)?
        }
        Command::ChangePassword { current, new } => {
            commands::update_password(state, current, new).await?
        }
        Command::Submit {
            title,
            description,
            category,
        } => print_json(&commands::submit_complaint(state, title, description, category).await?)?,
        Command::List {
            query,
            status,
            category,
        } => {
            let filter = ComplaintFilter {
                query,
                status,
                category,
            };
            print_json(&commands::list_complaints(state, filter).await?)?
        }
        Command::Recent { limit } => print_json(&commands::recent_complaints(state, limit).await?)?,
        Command::Show { id } => print_json(&commands::get_complaint(state, id).await?)?,
        Command::Status {
            id,
            status,
            resolution,
            comment,
        } => print_json(
            &commands::update_complaint_status(state, id, status, resolution, comment).await?,
        )?,
        Command::Assign {
            id,
            investigator_id,
            investigator_name,
        } => print_json(
            &commands::assign_complaint(state, id, investigator_id, investigator_name).await?,
        )?,
        Command::Stats => print_json(&commands::get_complaint_stats(state).await?)?,
        Command::Notifications => print_json(&commands::get_notifications(state).await?)?,
        Command::Read { id } => commands::mark_notification_read(state, id).await?,
        Command::ReadAll => commands::mark_all_notifications_read(state).await?,
        Command::DeleteNotification { id } => commands::delete_notification(state, id).await?,
        Command::ClearNotifications => commands::clear_notifications(state).await?,
        Command::Users { search, role } => {
            print_json(&commands::list_accounts(state, search, role).await?)?
        }
        Command::ExportUsers {
            search,
            role,
            output,
        } => {
            let csv = commands::export_accounts(state, search, role).await?;
            match output {
                Some(path) => tokio::fs::write(&path, csv)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", csv),
            }
        }
        Command::Settings(settings) => match settings {
            SettingsCommand::Show => print_json(&commands::get_settings(state).await?)?,
            SettingsCommand::General {
                app_name,
                email_domain,
            } => {
                commands::update_general_settings(
                    state,
                    GeneralSettings {
                        app_name,
                        email_domain,
                    },
                )
                .await?
            }
            SettingsCommand::Notifications { enabled } => {
                commands::update_notification_settings(
                    state,
                    NotificationSettings {
                        notifications_enabled: enabled,
                    },
                )
                .await?
            }
            SettingsCommand::Latency { ms } => {
                commands::update_behavior_settings(
                    state,
                    BehaviorSettings {
                        simulated_latency_ms: ms,
                    },
                )
                .await?
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&cli.log).unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting UDC");

    let state = AppState::initialize(cli.data_dir, cli.latency_ms)
        .await
        .context("Failed to initialize application")?;

    let mut notices = state.notices.subscribe();
    let result = run(&state, cli.command).await;

    while let Ok(notice) = notices.try_recv() {
        print_notice(&notice);
    }

    result
}
