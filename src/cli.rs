//! clap-based command-line interface.
//!
//! Defines [`Cli`] with subcommands [`Command`] (show, actions, transition,
//! delete) and global actor flags (`--actor-id`, `--role`, `--verbose`).

use clap::{Parser, Subcommand, ValueEnum};

use crate::lifecycle::{Role, Status};

/// vulntrack — vulnerability lifecycle tracking console.
#[derive(Debug, Parser)]
#[command(name = "vulntrack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Id of the acting user (overrides the config file).
    #[arg(long, global = true)]
    pub actor_id: Option<u64>,

    /// Role of the acting user (overrides the config file).
    #[arg(long, global = true)]
    pub role: Option<RoleArg>,

    /// Enable verbose output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Role accepted on the command line, mapped to [`Role`] internally.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    SuperAdmin,
    SecurityEngineer,
    DevEngineer,
    NormalUser,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Role {
        match arg {
            RoleArg::SuperAdmin => Role::SuperAdmin,
            RoleArg::SecurityEngineer => Role::SecurityEngineer,
            RoleArg::DevEngineer => Role::DevEngineer,
            RoleArg::NormalUser => Role::NormalUser,
        }
    }
}

/// Target status accepted on the command line, mapped to [`Status`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Unfixed,
    Fixing,
    Fixed,
    Retesting,
    Completed,
    Rejected,
    Ignored,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Status {
        match arg {
            StatusArg::Unfixed => Status::Unfixed,
            StatusArg::Fixing => Status::Fixing,
            StatusArg::Fixed => Status::Fixed,
            StatusArg::Retesting => Status::Retesting,
            StatusArg::Completed => Status::Completed,
            StatusArg::Rejected => Status::Rejected,
            StatusArg::Ignored => Status::Ignored,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and print a vulnerability.
    Show {
        /// Vulnerability id.
        id: u64,
    },

    /// List the status changes the acting user may request.
    Actions {
        /// Vulnerability id.
        id: u64,
    },

    /// Request a status change.
    Transition {
        /// Vulnerability id.
        id: u64,

        /// Target status.
        status: StatusArg,

        /// Annotation for transitions that require one (reject reason,
        /// ignore reason, retest result).
        #[arg(long)]
        comment: Option<String>,
    },

    /// Report a new vulnerability, assigned to a dev engineer.
    Report {
        /// Short title for the report.
        title: String,

        /// Project the vulnerability belongs to.
        #[arg(long)]
        project: u64,

        /// Dev engineer responsible for the fix.
        #[arg(long)]
        assignee: u64,

        /// Severity label (critical, high, medium, low, info).
        #[arg(long)]
        severity: Option<String>,

        /// Fix deadline, RFC 3339 (e.g. 2026-09-30T00:00:00Z).
        #[arg(long)]
        deadline: Option<chrono::DateTime<chrono::Utc>>,
    },

    /// Delete a vulnerability record.
    Delete {
        /// Vulnerability id.
        id: u64,
    },
}
