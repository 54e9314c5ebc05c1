//! Terminal and JSON output for CLI commands

use crate::core::{Comment, Priority, Status, Ticket};
use crate::error::Result;
use crate::query::{TicketStats, TicketSummary};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Formats command results either as colored text or as JSON.
///
/// In JSON mode the human-oriented messages are suppressed so that stdout
/// carries a single JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    json: bool,
    no_color: bool,
}

impl OutputFormatter {
    #[must_use]
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { json, no_color }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    #[must_use]
    pub const fn is_colored(&self) -> bool {
        !self.no_color
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {message}", "✓".green().bold());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.json {
            eprintln!("{} {message}", "!".yellow().bold());
        }
    }

    /// Errors always go to stderr, in both modes
    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }

    /// Pretty-print a value as JSON on stdout
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Alias of [`Self::print_json`]
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.print_json(value)
    }

    /// Full ticket view
    pub fn print_ticket(&self, ticket: &Ticket) {
        self.info(&format!("{} {}", ticket.id.short().dimmed(), ticket.title.bold()));
        self.info(&format!(
            "  Status:   {}    Priority: {}",
            status_label(ticket.status),
            priority_label(ticket.priority)
        ));
        self.info(&format!("  Owner:    {}", ticket.owner));
        if let Some(assignee) = &ticket.assignee {
            self.info(&format!("  Assignee: {assignee}"));
        }
        self.info(&format!(
            "  Created:  {}",
            ticket.created_at.format("%Y-%m-%d %H:%M")
        ));
        if let Some(resolved_at) = ticket.resolved_at {
            self.info(&format!("  Resolved: {}", resolved_at.format("%Y-%m-%d %H:%M")));
        }
        self.info("");
        self.info(&ticket.description);
    }

    /// One line per ticket with its latest comment underneath
    pub fn print_summaries(&self, summaries: &[TicketSummary]) {
        if summaries.is_empty() {
            self.info("No tickets found");
            return;
        }
        for summary in summaries {
            let ticket = &summary.ticket;
            self.info(&format!(
                "{}  {:<13} {:<8} {}",
                ticket.id.short().dimmed(),
                status_label(ticket.status),
                priority_label(ticket.priority),
                ticket.title
            ));
            if let Some(comment) = &summary.last_comment {
                self.info(&format!(
                    "          └ {}: {}",
                    comment.author,
                    first_line(&comment.body).dimmed()
                ));
            }
        }
        self.info(&format!("\n{} ticket(s)", summaries.len()));
    }

    pub fn print_comment(&self, comment: &Comment) {
        self.info(&format!(
            "#{} {} {}",
            comment.id,
            comment.author.to_string().cyan(),
            comment.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        ));
        for line in comment.body.lines() {
            self.info(&format!("    {line}"));
        }
    }

    pub fn print_stats(&self, stats: &TicketStats) {
        self.info(&format!("Open:        {}", stats.open));
        self.info(&format!("In progress: {}", stats.in_progress));
        self.info(&format!("Resolved:    {}", stats.resolved));
        self.info(&format!("Total:       {}", stats.total));
        self.info(&format!(
            "Average resolution time: {:.1}h",
            stats.average_resolution_hours
        ));
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Open => status.as_str().blue(),
        Status::InProgress => status.as_str().yellow(),
        Status::Resolved => status.as_str().green(),
    }
}

fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::Low => priority.as_str().normal(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::High => priority.as_str().red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_flags() {
        let formatter = OutputFormatter::new(true, true);
        assert!(formatter.is_json());
        assert!(!formatter.is_colored());
        assert!(!OutputFormatter::default().is_json());
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("one\ntwo"), "one");
        assert_eq!(first_line(""), "");
    }
}
