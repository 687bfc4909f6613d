//! Command-line arguments.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskshare_access::ShareRequest;
use taskshare_types::{CapabilityPatch, UserId};

#[derive(Parser, Debug)]
#[command(name = "taskshare")]
#[command(about = "Share tasks and projects with fine-grained capabilities")]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage projects and their grants
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage tasks and their grants
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user
    Add { name: String, email: String },
    /// Show a user by name
    Show { name: String },
}

/// The user the command acts as.
#[derive(Args, Debug, Clone)]
pub struct Actor {
    #[arg(long = "as", value_name = "USER")]
    pub acting_as: String,
}

/// Who receives, loses or changes access. Give exactly one.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long)]
    pub user_id: Option<UserId>,
    #[arg(long)]
    pub user_name: Option<String>,
    #[arg(long)]
    pub user_email: Option<String>,
}

/// Capability fields of a share or edit-access request.
#[derive(Args, Debug, Clone, Default)]
pub struct CapabilityArgs {
    #[arg(long, value_name = "BOOL")]
    pub share: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub change_permissions: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub edit: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub delete: Option<bool>,
}

impl TargetArgs {
    pub fn request(&self, capabilities: &CapabilityArgs) -> ShareRequest {
        ShareRequest {
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            user_email: self.user_email.clone(),
            capabilities: CapabilityPatch {
                can_share: capabilities.share,
                can_change_permissions: capabilities.change_permissions,
                can_edit: capabilities.edit,
                can_delete: capabilities.delete,
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project
    Create {
        #[command(flatten)]
        actor: Actor,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List visible projects
    List {
        #[command(flatten)]
        actor: Actor,
    },
    /// Show one project
    Show {
        #[command(flatten)]
        actor: Actor,
        id: String,
    },
    /// Edit a project
    Edit {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Mark completed (true) or reopen (false)
        #[arg(long, value_name = "BOOL")]
        completed: Option<bool>,
    },
    /// Delete a project
    Delete {
        #[command(flatten)]
        actor: Actor,
        id: String,
    },
    /// Give a user access
    Share {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        capabilities: CapabilityArgs,
    },
    /// List who has access
    Access {
        #[command(flatten)]
        actor: Actor,
        id: String,
    },
    /// Change a user's access
    EditAccess {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        capabilities: CapabilityArgs,
    },
    /// Remove a user's access
    Revoke {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task
    Create {
        #[command(flatten)]
        actor: Actor,
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Project to create the task under
        #[arg(long)]
        project: Option<String>,
        /// Due date (RFC 3339)
        #[arg(long)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// List visible tasks
    List {
        #[command(flatten)]
        actor: Actor,
    },
    /// Show one task
    Show {
        #[command(flatten)]
        actor: Actor,
        id: String,
    },
    /// Edit a task
    Edit {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Mark completed (true) or reopen (false)
        #[arg(long, value_name = "BOOL")]
        completed: Option<bool>,
        #[arg(long)]
        due: Option<DateTime<Utc>>,
        /// Move the task into this project
        #[arg(long, conflicts_with = "detach")]
        project: Option<String>,
        /// Remove the task from its project
        #[arg(long)]
        detach: bool,
    },
    /// Delete a task
    Delete {
        #[command(flatten)]
        actor: Actor,
        id: String,
    },
    /// Give a user access
    Share {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        capabilities: CapabilityArgs,
    },
    /// List who has access
    Access {
        #[command(flatten)]
        actor: Actor,
        id: String,
    },
    /// Change a user's access
    EditAccess {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        capabilities: CapabilityArgs,
    },
    /// Remove a user's access
    Revoke {
        #[command(flatten)]
        actor: Actor,
        id: String,
        #[command(flatten)]
        target: TargetArgs,
    },
}
