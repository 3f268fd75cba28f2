//! Application assembly and run modes
//!
//! Wires settings into the analysis agent and frontline responder, then
//! runs either a single alert passed on the command line or an interactive
//! prompt loop.

use crate::agent::AnalysisAgent;
use crate::alert::Alert;
use crate::classifier::Taxonomy;
use crate::config::Settings;
use crate::error::AppError;
use crate::llm::backend_from_settings;
use crate::logging::{log_error, log_warning, styled_log};
use crate::mcp::ConfluenceClient;
use crate::respond::FrontlineResponder;
use console::Color;
use log::{info, warn};
use std::io::{self, BufRead, Write};

/// Display name for the assistant serving a taxonomy
fn assistant_name(taxonomy: Taxonomy) -> &'static str {
    match taxonomy {
        Taxonomy::General => "AI Alert Assistant",
        Taxonomy::Database => "AI DBA Assistant",
    }
}

/// Commands that end the interactive loop
const EXIT_COMMANDS: &[&str] = &["quit", "exit", "q"];

/// Assembled application: agent plus responder for one taxonomy
pub struct Application {
    taxonomy: Taxonomy,
    agent: AnalysisAgent,
    responder: FrontlineResponder,
}

impl Application {
    /// Build the application from loaded settings
    ///
    /// Confluence is optional: incomplete credentials produce a warning and
    /// an application that analyzes without documentation search.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the model backend cannot be constructed.
    pub fn from_settings(settings: &Settings, taxonomy: Taxonomy) -> Result<Self, AppError> {
        let backend = backend_from_settings(&settings.model)?;

        let confluence = match ConfluenceClient::new(&settings.confluence) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Confluence unavailable: {}", e);
                log_warning("Documentation search disabled: Confluence is not configured");
                None
            }
        };

        info!(
            "Starting {} with {}",
            assistant_name(taxonomy),
            settings.model.describe()
        );

        Ok(Self {
            taxonomy,
            agent: AnalysisAgent::new(taxonomy, backend.clone(), confluence),
            responder: FrontlineResponder::new(backend),
        })
    }

    /// Analyze a single alert and print the results
    ///
    /// # Errors
    ///
    /// Returns `AppError` when analysis fails after retries. The frontline
    /// stage never fails; it falls back to the analysis report.
    pub async fn run_once(&self, alert_text: &str) -> Result<(), AppError> {
        let alert = Alert::new(alert_text);
        styled_log("ALARM", &alert.message, Color::Yellow);

        let report = self.agent.analyze(&alert).await?;
        styled_log("ANALYSIS", &report.render(), Color::Green);

        let response = self.responder.respond(&report).await;
        if response.fell_back {
            log_warning("Frontline message assembled from the analysis report");
        }
        styled_log("HANDOFF", &response.message, Color::Cyan);
        for confirmation in &response.notifications {
            info!("{}", confirmation);
        }

        Ok(())
    }

    /// Run the interactive prompt loop over stdin until an exit command or EOF
    pub async fn run_interactive(&self) -> Result<(), AppError> {
        let stdin = io::stdin();
        self.run_loop(stdin.lock()).await
    }

    /// The interactive loop over an arbitrary line source
    ///
    /// Blank input re-prompts; a failed analysis is reported and the loop
    /// continues with the next alert.
    async fn run_loop(&self, input: impl BufRead) -> Result<(), AppError> {
        let name = assistant_name(self.taxonomy);
        styled_log(
            name,
            "Paste an alert message to analyze it. Type 'quit', 'exit' or 'q' to leave.",
            Color::Blue,
        );

        let mut lines = input.lines();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                // EOF, e.g. piped input ran out
                println!();
                break;
            };
            let input = line?.trim().to_string();

            if input.is_empty() {
                continue;
            }
            if EXIT_COMMANDS.contains(&input.to_lowercase().as_str()) {
                styled_log(name, "Goodbye!", Color::Blue);
                break;
            }

            if let Err(e) = self.run_once(&input).await {
                log_error(&format!("Analysis failed: {}", e));
            }
        }

        Ok(())
    }
}
