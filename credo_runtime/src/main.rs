//! `credo` — command-line front end over a file-backed data manager.
//!
//! Every command prints its result as pretty JSON on stdout; logs go to
//! stderr through `tracing`.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use credo_kernel::domain::{AttachedFile, NewAchievement, Status, Submission};
use credo_kernel::passport::{categorize, filter_passport, profile_summary, unique_skills};
use credo_kernel::skills::{recommendations, summarize};

use credo_runtime::clock::SystemClock;
use credo_runtime::config::RuntimeConfig;
use credo_runtime::event_bus::EventBus;
use credo_runtime::snapshot::{load_latest_snapshot, restore_snapshot, save_snapshot};
use credo_runtime::store::{FileStore, StoreAdapter};
use credo_runtime::DataManager;

#[derive(Parser, Debug)]
#[command(name = "credo")]
#[command(version = "1.0")]
#[command(about = "StudentCredo: track student achievements, review them and \
                   mint simulated credentials.",
          long_about = None)
]
struct Cli {
    /// Config file (defaults to ./credo.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `store_dir` from the config
    #[arg(long)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the default profile and, optionally, sample data
    Init {
        #[arg(long, action)]
        seed: bool,
    },

    /// Submit an achievement for review
    Submit {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Repeat for several skills
        #[arg(short, long = "skill")]
        skills: Vec<String>,
        /// Evidence file name; metadata only
        #[arg(long = "file")]
        files: Vec<String>,
        /// Request credential minting
        #[arg(long, action)]
        blockchain: bool,
        /// Existing achievement this submission reviews
        #[arg(long)]
        achievement_id: Option<String>,
    },

    /// Record an achievement directly, bypassing review
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long = "skill")]
        skills: Vec<String>,
        #[arg(long, value_parser = parse_status, default_value = "pending")]
        status: Status,
        #[arg(long, default_value = "")]
        issuer: String,
    },

    /// Delete an achievement by id
    Delete { id: String },

    /// Approve a pending submission
    Approve {
        approval_id: String,
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Reject a pending submission
    Reject {
        approval_id: String,
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Drop every pending approval
    ClearApprovals,

    Achievements,
    Approvals,
    Profile,

    /// Dashboard counters and approval counters
    Stats,

    /// Activity points per category
    Points,

    /// Skills analysis, or the 105-cap score of one skill
    Skills {
        #[arg(long)]
        skill: Option<String>,
    },

    /// Approved achievements grouped for the digital passport
    Passport {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
    },

    Credentials,

    /// Look up a credential by block hash
    Verify { block_hash: String },

    /// Write a snapshot of all records
    Snapshot,

    /// Restore the most recent snapshot
    Restore,
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse()
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = RuntimeConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(dir) = cli.store_dir {
        cfg.store_dir = dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    debug!(store = %cfg.store_dir.display(), "opening store");
    let bus = Rc::new(EventBus::new());
    bus.subscribe(|event| debug!(event = event.name(), "change published"));

    let dm = DataManager::new(
        StoreAdapter::new(Box::new(FileStore::new(&cfg.store_dir))),
        bus,
        Box::new(SystemClock),
    );

    match cli.command {
        Commands::Init { seed } => {
            dm.initialize(seed || cfg.seed_sample_data);
            print(&dm.get_stats())?;
        }
        Commands::Submit {
            title,
            category,
            description,
            skills,
            files,
            blockchain,
            achievement_id,
        } => {
            if title.trim().is_empty() || category.trim().is_empty() {
                bail!("title and category are required");
            }
            let approval = dm.add_pending_approval(Submission {
                title,
                description,
                category,
                skills,
                files: files
                    .into_iter()
                    .map(|name| AttachedFile {
                        name,
                        ..Default::default()
                    })
                    .collect(),
                blockchain,
                achievement_id,
            });
            print(&approval)?;
        }
        Commands::Add {
            title,
            category,
            description,
            skills,
            status,
            issuer,
        } => {
            let achievement = dm.add_achievement(NewAchievement {
                title,
                description,
                category,
                skills,
                status,
                issuer,
                ..Default::default()
            });
            print(&achievement)?;
        }
        Commands::Delete { id } => {
            if !dm.delete_achievement(&id) {
                bail!("no achievement with id {id}");
            }
        }
        Commands::Approve { approval_id, reason } => {
            decide(&dm, &approval_id, Status::Approved, reason.as_deref())?;
        }
        Commands::Reject { approval_id, reason } => {
            decide(&dm, &approval_id, Status::Rejected, reason.as_deref())?;
        }
        Commands::ClearApprovals => dm.clear_pending_approvals(),
        Commands::Achievements => print(&dm.get_achievements())?,
        Commands::Approvals => print(&dm.get_pending_approvals())?,
        Commands::Profile => print(&dm.get_user_profile())?,
        Commands::Stats => print(&serde_json::json!({
            "stats": dm.get_stats(),
            "approvals": dm.get_approval_stats(),
        }))?,
        Commands::Points => print(&dm.get_activity_points_breakdown())?,
        Commands::Skills { skill: Some(skill) } => print(&dm.score_skill(&skill))?,
        Commands::Skills { skill: None } => {
            let report = dm.skills_report();
            print(&serde_json::json!({
                "summary": summarize(&report),
                "recommendations": recommendations(&report.skills),
                "report": report,
            }))?;
        }
        Commands::Passport {
            search,
            category,
            status,
        } => {
            let items = dm.passport();
            let shown: Vec<_> = filter_passport(&items, &search, category.as_deref(), status)
                .into_iter()
                .cloned()
                .collect();
            print(&serde_json::json!({
                "summary": profile_summary(&dm.get_user_profile(), &shown),
                "skills": unique_skills(&shown),
                "sections": categorize(&shown),
            }))?;
        }
        Commands::Credentials => print(&dm.get_blockchain_credentials())?,
        Commands::Verify { block_hash } => match dm.find_credential(&block_hash) {
            Some(credential) => print(&serde_json::json!({
                "verified": true,
                "activityPoints": dm.credential_points(&credential),
                "credential": credential,
            }))?,
            None => bail!("no credential with block hash {block_hash}"),
        },
        Commands::Snapshot => {
            let path = save_snapshot(&cfg.snapshot_dir, &dm)?;
            println!("{}", path.display());
        }
        Commands::Restore => {
            let Some(snap) = load_latest_snapshot(&cfg.snapshot_dir)? else {
                bail!("no snapshot in {}", cfg.snapshot_dir.display());
            };
            let state = restore_snapshot(&dm, &snap)?;
            info!(achievements = state.achievements.len(), "restored");
        }
    }

    Ok(())
}

fn decide(dm: &DataManager, approval_id: &str, status: Status, reason: Option<&str>) -> anyhow::Result<()> {
    let Some(approval) = dm.update_approval_status(approval_id, status, reason) else {
        bail!("no pending approval with id {approval_id}");
    };
    if approval.status != status {
        bail!("approval {} is already {}", approval.id, approval.status);
    }
    print(&approval)
}
