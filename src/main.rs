//! helpdesk - help-desk ticket tracker
//!
//! This is the main entry point for the helpdesk CLI application.
//! It parses command-line arguments and dispatches to the command handlers.

use clap::Parser;
use helpdesk::cli::{Cli, Commands, OutputFormatter, handlers};
use helpdesk::error::{HelpdeskError, Result};
use std::process;

fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.json, cli.no_color);

    if let Err(e) = run(cli, &formatter) {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

/// Run the CLI application with the parsed arguments
fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(default_log_level(&cli.command))
                }),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    dispatch_command(&cli, formatter)
}

/// The API server reports requests at info level; other commands stay quiet
fn default_log_level(command: &Commands) -> &'static str {
    match command {
        #[cfg(feature = "api")]
        Commands::Serve { .. } => "info",
        _ => "warn",
    }
}

fn dispatch_command(cli: &Cli, formatter: &OutputFormatter) -> Result<()> {
    let project = cli.project.as_deref();

    match &cli.command {
        Commands::Init {
            name,
            description,
            force,
        } => handlers::handle_init(
            name.as_deref(),
            description.as_deref(),
            *force,
            project,
            formatter,
        ),
        #[cfg(feature = "api")]
        Commands::Serve { host, port } => {
            handlers::handle_serve_command(host.clone(), *port, project, formatter)
        },
        command => {
            let actor = cli.actor()?;
            tracing::debug!(actor = %actor.id, role = %actor.role, "Acting user");
            dispatch_actor_command(command, &actor, project, formatter)
        },
    }
}

fn dispatch_actor_command(
    command: &Commands,
    actor: &helpdesk::core::Actor,
    project: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    match command {
        Commands::New {
            title,
            description,
            priority,
        } => handlers::handle_new_command(
            actor,
            title,
            description,
            priority.as_deref(),
            project,
            formatter,
        ),
        Commands::Show { ticket, comments } => {
            handlers::handle_show_command(actor, ticket, *comments, project, formatter)
        },
        Commands::List {
            status,
            priority,
            search,
        } => handlers::handle_list_command(
            actor,
            status.as_deref(),
            priority.as_deref(),
            search.as_deref(),
            project,
            formatter,
        ),
        Commands::Comment { ticket, body } => {
            handlers::handle_comment_command(actor, ticket, body, project, formatter)
        },
        Commands::Comments { ticket } => {
            handlers::handle_comments_command(actor, ticket, project, formatter)
        },
        Commands::Resolve { ticket, message } => {
            handlers::handle_resolve_command(actor, ticket, message.clone(), project, formatter)
        },
        Commands::Reopen { ticket, yes } => {
            handlers::handle_reopen_command(actor, ticket, *yes, project, formatter)
        },
        Commands::Stats => handlers::handle_stats_command(actor, project, formatter),
        Commands::Init { .. } => unreachable!("init does not take an actor"),
        #[cfg(feature = "api")]
        Commands::Serve { .. } => unreachable!("serve does not take an actor"),
    }
}

/// Print the error, its suggestions and, in JSON mode, a structured error object
fn handle_error(error: &HelpdeskError, formatter: &OutputFormatter) {
    formatter.error(&error.user_message());

    let suggestions = error.suggestions();
    if !suggestions.is_empty() && !formatter.is_json() {
        eprintln!("\nSuggestions:");
        for suggestion in &suggestions {
            eprintln!("  • {suggestion}");
        }
    }

    if formatter.is_json() {
        let _ = formatter.json(&serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "error_type": error.kind(),
            "suggestions": suggestions,
            "recoverable": error.is_recoverable(),
            "is_config_error": error.is_config_error(),
        }));
    }

    // In verbose mode, show the full error
    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}
