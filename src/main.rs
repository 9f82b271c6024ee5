//! GitLab provisioning CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args ──▶ config (file + env + flags) ──▶ GitlabClient (connection handle)
//!                                                       │
//!   command ──▶ typed operation ──▶ RetryInvoker ───────┘
//!                                        │
//!                                        ▼
//!                              RetryOutcome ──▶ stdout / exit status
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gitlab_provisioner::config::loader::load_config;
use gitlab_provisioner::config::{ConfigError, ProvisionerConfig};
use gitlab_provisioner::gitlab::{AccessLevel, Connection, GitlabClient, GroupId, UserId};
use gitlab_provisioner::observability::init_logging;
use gitlab_provisioner::provisioning::{
    onboard, CreateGroup, CreateMember, CreateUser, FindGroup, FindUser, ListGroupMembers,
    Onboarding, PasswordPolicy, RemoveUser, UpdateUserRole,
};
use gitlab_provisioner::resilience::{RemoteOperation, RetryInvoker, RetryPolicy};

#[derive(Parser)]
#[command(name = "gitlab-provisioner")]
#[command(about = "Provision GitLab groups, users and memberships", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitLab base URL (overrides config and GITLAB_URL).
    #[arg(short, long)]
    url: Option<String>,

    /// Attempt each operation exactly once.
    #[arg(long)]
    no_retry: bool,

    /// Maximum attempts per operation.
    #[arg(short, long)]
    attempts: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a group
    CreateGroup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        path: String,
    },
    /// Create a user
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Add a user to a group
    AddMember {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        group: u64,
        #[arg(long, value_enum, default_value = "developer")]
        access_level: AccessLevel,
    },
    /// Grant (or revoke) instance administrator rights
    SetAdmin {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        revoke: bool,
    },
    /// Permanently delete a user
    RemoveUser {
        #[arg(long)]
        user: u64,
    },
    /// Look up a user id by username
    FindUser {
        #[arg(long)]
        username: String,
    },
    /// Look up a group id by path
    FindGroup {
        #[arg(long)]
        path: String,
    },
    /// List the members of a group
    Members {
        #[arg(long)]
        group: u64,
    },
    /// Create a group and a user, then add the user to the group
    Onboard {
        #[arg(long)]
        group_name: String,
        #[arg(long)]
        group_path: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value = "developer")]
        access_level: AccessLevel,
    },
}

impl Cli {
    fn resolve_config(&self) -> Result<ProvisionerConfig, ConfigError> {
        load_config(self.config.as_deref(), |config| {
            if let Some(url) = &self.url {
                config.gitlab.url = url.clone();
            }
            if self.no_retry {
                config.retry.enabled = false;
            }
            if let Some(attempts) = self.attempts {
                config.retry.max_attempts = attempts;
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.logging)?;

    tracing::info!(
        url = %config.gitlab.url,
        retry_enabled = config.retry.enabled,
        max_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );

    let client = GitlabClient::new(&config.gitlab)?;
    let api: &Connection = &client;
    let invoker = RetryInvoker::new(RetryPolicy::from(&config.retry));

    match cli.command {
        Commands::CreateGroup { name, path } => {
            let id = run(&invoker, &CreateGroup { name, path }, api).await?;
            println!("{}", id);
        }
        Commands::CreateUser {
            name,
            username,
            email,
        } => {
            let op = CreateUser {
                name,
                username,
                email,
                password: PasswordPolicy::from(&config.users),
            };
            let id = run(&invoker, &op, api).await?;
            println!("{}", id);
        }
        Commands::AddMember {
            user,
            group,
            access_level,
        } => {
            let op = CreateMember {
                user: UserId(user),
                group: GroupId(group),
                access_level,
            };
            let id = run(&invoker, &op, api).await?;
            println!("{}", id);
        }
        Commands::SetAdmin { user, revoke } => {
            let op = UpdateUserRole {
                user: UserId(user),
                admin: !revoke,
            };
            run(&invoker, &op, api).await?;
            println!("ok");
        }
        Commands::RemoveUser { user } => {
            run(&invoker, &RemoveUser { user: UserId(user) }, api).await?;
            println!("ok");
        }
        Commands::FindUser { username } => {
            match run(&invoker, &FindUser { username }, api).await? {
                Some(id) => println!("{}", id),
                None => return Err("user not found".into()),
            }
        }
        Commands::FindGroup { path } => match run(&invoker, &FindGroup { path }, api).await? {
            Some(id) => println!("{}", id),
            None => return Err("group not found".into()),
        },
        Commands::Members { group } => {
            let members = run(&invoker, &ListGroupMembers { group: GroupId(group) }, api).await?;
            for member in members {
                println!(
                    "{}\t{}\t{:?}",
                    member.id, member.username, member.access_level
                );
            }
        }
        Commands::Onboard {
            group_name,
            group_path,
            name,
            username,
            email,
            access_level,
        } => {
            let plan = Onboarding {
                group: CreateGroup {
                    name: group_name,
                    path: group_path,
                },
                user: CreateUser {
                    name,
                    username,
                    email,
                    password: PasswordPolicy::from(&config.users),
                },
                access_level,
            };
            let done = onboard(&invoker, api, &plan).await?;
            println!("group={} user={} member={}", done.group, done.user, done.member);
        }
    }

    Ok(())
}

/// Invoke one operation; an exhausted budget becomes an error.
async fn run<Op>(
    invoker: &RetryInvoker,
    op: &Op,
    api: &Connection,
) -> Result<Op::Output, Box<dyn std::error::Error>>
where
    Op: RemoteOperation<Connection>,
{
    let outcome = invoker.invoke(op, api).await?;
    outcome
        .into_success()
        .ok_or_else(|| format!("{} failed after exhausting its attempts", op.name()).into())
}
