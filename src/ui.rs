//! Terminal output — spinner during backend calls, coloured statuses.
//!
//! Uses `indicatif` for the progress spinner and `console` for styling.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::lifecycle::{can_delete, can_edit, Actor, LegalAction, Status, Vulnerability};

/// Spinner shown while a request is in flight.
pub struct ApiProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl ApiProgress {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    pub fn success(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    pub fn failure(&self, message: &str) {
        self.pb.finish_and_clear();
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }
}

/// Colour matching the status badges of the original console.
pub fn status_style(status: Status) -> Style {
    match status {
        Status::Unfixed => Style::new().red(),
        Status::Fixing => Style::new().yellow(),
        Status::Fixed => Style::new().blue(),
        Status::Retesting => Style::new().cyan(),
        Status::Completed => Style::new().green(),
        Status::Rejected => Style::new().magenta(),
        Status::Ignored => Style::new().dim(),
    }
}

pub fn print_vuln(vuln: &Vulnerability) {
    let badge = status_style(vuln.status).apply_to(vuln.status.as_str());
    println!("#{} [{badge}] {}", vuln.id, vuln.title);
    if let Some(severity) = &vuln.severity {
        println!("  severity:     {severity}");
    }
    println!("  project:      {} (owner {})", vuln.project_id, vuln.project_owner_id);
    println!("  reporter:     {}", vuln.reporter_id);
    if let Some(assignee) = vuln.assignee_id {
        println!("  assignee:     {assignee}");
    }
    println!("  submitted at: {}", vuln.submitted_at.to_rfc3339());
    if let Some(deadline) = vuln.fix_deadline {
        println!("  fix deadline: {}", deadline.to_rfc3339());
    }
    if let Some(reason) = &vuln.reject_reason {
        println!("  rejected:     {reason}");
    }
    if let Some(reason) = &vuln.ignore_reason {
        println!("  ignored:      {reason}");
    }
    if let Some(result) = &vuln.retest_result {
        println!("  retest:       {result}");
    }
}

/// What the acting user may do with the record besides transitions.
pub fn print_permissions(actor: &Actor, vuln: &Vulnerability) {
    let yes = Style::new().green();
    let no = Style::new().dim();
    let mark = |allowed: bool| {
        if allowed {
            yes.apply_to("yes")
        } else {
            no.apply_to("no")
        }
    };
    println!(
        "  edit: {}  delete: {}",
        mark(can_edit(actor, vuln)),
        mark(can_delete(actor, vuln))
    );
}

pub fn print_actions(actions: &[LegalAction]) {
    if actions.is_empty() {
        println!("No transitions available for this user.");
        return;
    }
    println!("Available transitions:");
    for action in actions {
        let badge = status_style(action.to).apply_to(action.to.as_str());
        if action.requires_annotation {
            println!("  → {badge} (requires --comment)");
        } else {
            println!("  → {badge}");
        }
    }
}
