use anyhow::{bail, Result};
use clap::Parser;

use vulntrack::api::{VulnClient, VulnCreate};
use vulntrack::cli::{Cli, Command};
use vulntrack::config::VulntrackConfig;
use vulntrack::lifecycle::{Actor, Role, Status};
use vulntrack::service::LifecycleService;
use vulntrack::ui::{self, ApiProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = VulntrackConfig::load()?;

    let actor = resolve_actor(&cli, &config)?;
    if cli.verbose {
        eprintln!("acting as user {} ({})", actor.id, actor.role);
    }

    let client = VulnClient::new(&config.api_url, &config.token, config.timeout_secs);
    let service = LifecycleService::new(client);

    match cli.command {
        Command::Show { id } => {
            let progress = ApiProgress::start(&format!("Fetching vulnerability #{id}"));
            match service.fetch(id).await {
                Ok(vuln) => {
                    progress.success(&format!("Vulnerability #{id}"));
                    ui::print_vuln(&vuln);
                    ui::print_permissions(&actor, &vuln);
                }
                Err(e) => {
                    progress.failure(&e.to_string());
                    return Err(e.into());
                }
            }
        }

        Command::Actions { id } => {
            let progress = ApiProgress::start(&format!("Checking actions for #{id}"));
            match service.query_legal_actions(id, &actor).await {
                Ok(actions) => {
                    progress.success(&format!("Vulnerability #{id}"));
                    ui::print_actions(&actions);
                }
                Err(e) => {
                    progress.failure(&e.to_string());
                    return Err(e.into());
                }
            }
        }

        Command::Transition { id, status, comment } => {
            let to: Status = status.into();
            let progress = ApiProgress::start(&format!("Moving #{id} to {to}"));
            match service
                .submit_transition(id, to, &actor, comment.as_deref())
                .await
            {
                Ok(vuln) => {
                    progress.success(&format!("Vulnerability #{id} is now {}", vuln.status));
                    ui::print_vuln(&vuln);
                }
                Err(e) => {
                    progress.failure(&e.to_string());
                    return Err(e.into());
                }
            }
        }

        Command::Report {
            title,
            project,
            assignee,
            severity,
            deadline,
        } => {
            let create = VulnCreate {
                title,
                severity,
                project_id: project,
                assignee_id: assignee,
                fix_deadline: deadline,
            };
            let progress = ApiProgress::start("Submitting report");
            match service.report(&create, &actor).await {
                Ok(vuln) => {
                    progress.success(&format!("Reported as #{}", vuln.id));
                    ui::print_vuln(&vuln);
                }
                Err(e) => {
                    progress.failure(&e.to_string());
                    return Err(e.into());
                }
            }
        }

        Command::Delete { id } => {
            let progress = ApiProgress::start(&format!("Deleting vulnerability #{id}"));
            match service.delete(id, &actor).await {
                Ok(()) => progress.success(&format!("Vulnerability #{id} deleted")),
                Err(e) => {
                    progress.failure(&e.to_string());
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

/// Build the acting user from CLI flags, falling back to the config file.
fn resolve_actor(cli: &Cli, config: &VulntrackConfig) -> Result<Actor> {
    let id = match cli.actor_id.or(config.actor_id) {
        Some(id) => id,
        None => bail!("no acting user: pass --actor-id or set actor_id in vulntrack.toml"),
    };
    let role = match cli.role.map(Role::from).or(config.role) {
        Some(role) => role,
        None => bail!("no role: pass --role or set role in vulntrack.toml"),
    };
    Ok(Actor::new(id, role))
}
