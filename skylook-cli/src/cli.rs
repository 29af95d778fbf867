use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use skylook_core::{
    Config, Coordinates, LocationSource, LookupError, OutputFormat, RecentView, UiPorts,
};
use std::process::ExitCode;

use crate::app::App;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skylook", version, about = "Current weather for a city or your location")]
pub struct Cli {
    /// Output format: "text" or "html". Defaults to the configured format.
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a place name.
    Search {
        /// City or place name, e.g. "Paris" or "San Jose, Costa Rica".
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show current weather for your position.
    Locate,

    /// List recent searches.
    Recent {
        /// Forget all recent searches.
        #[arg(long, conflicts_with = "pick")]
        clear: bool,

        /// Choose a recent search and run it again.
        #[arg(long)]
        pick: bool,
    },

    /// Prompt for searches until you quit.
    Interactive,

    /// Configure the location provider and output format.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        if let Command::Configure = self.command {
            // The wizard must still run when the file it would fix is broken.
            let config = Config::load().unwrap_or_else(|e| {
                eprintln!("warning: {e:#}; starting from defaults");
                Config::default()
            });
            configure(config)?;
            return Ok(ExitCode::SUCCESS);
        }

        let config = Config::load()?;
        let build = |echo_recent| App::build(&config, self.format, echo_recent);

        let outcome = match self.command {
            Command::Configure => Ok(()),
            Command::Search { query } => {
                let app = build(false)?;
                app.ui.set_input_value(&query.join(" "));
                app.search.search().await
            }
            Command::Locate => build(false)?.locate.locate().await,
            Command::Recent { clear: true, .. } => {
                build(false)?.recent.clear()?;
                println!("Recent searches cleared.");
                Ok(())
            }
            Command::Recent { pick, .. } => {
                let app = build(false)?;
                app.recent.render(app.ui.as_ref());
                if pick {
                    match pick_recent(&app)? {
                        Some(label) => app.search.search_recent(&label).await,
                        None => Ok(()),
                    }
                } else {
                    app.ui.print_recent();
                    Ok(())
                }
            }
            Command::Interactive => {
                interactive_loop(&build(true)?).await?;
                Ok(())
            }
        };

        // Failures were already shown on the error banner.
        Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

/// Prompt loop: Enter searches, `:loc` locates, `:recent` picks, `:q` quits.
async fn interactive_loop(app: &App) -> anyhow::Result<()> {
    app.recent.render(app.ui.as_ref());

    loop {
        let line = match Text::new("City:")
            .with_help_message(
                ":loc for your location, :recent to pick a recent search, :q to quit",
            )
            .prompt()
        {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        let result: Result<(), LookupError> = match line.trim() {
            ":q" | ":quit" => break,
            ":loc" => app.locate.locate().await,
            ":recent" => match pick_recent(app)? {
                Some(label) => app.search.search_recent(&label).await,
                None => Ok(()),
            },
            _ => {
                app.ui.set_input_value(&line);
                app.search.search().await
            }
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "lookup finished with error");
        }
    }

    Ok(())
}

/// Let the user choose one of the recent searches. `None` if there are none
/// or the prompt was dismissed.
fn pick_recent(app: &App) -> anyhow::Result<Option<String>> {
    let RecentView::Items(items) = app.recent.view() else {
        println!("No recent searches");
        return Ok(None);
    };

    let labels: Vec<String> = items.iter().map(|l| l.to_string()).collect();
    match Select::new("Search again:", labels).prompt() {
        Ok(label) => Ok(Some(label)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read selection"),
    }
}

/// Interactive configuration wizard; writes the config file.
fn configure(mut config: Config) -> anyhow::Result<()> {
    let source = Select::new(
        "Where should \"use my location\" come from?",
        LocationSource::all().to_vec(),
    )
    .with_help_message(
        "ip: approximate position from your IP address, fixed: coordinates you enter, none: disabled",
    )
    .prompt()
    .context("Configuration cancelled")?;

    if source == LocationSource::Fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 59.91")
            .prompt()
            .context("Configuration cancelled")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. 10.75")
            .prompt()
            .context("Configuration cancelled")?;
        config.set_fixed_location(Coordinates::new(latitude, longitude));
    } else {
        config.set_location_source(source);
    }

    let format = Select::new("Output format:", vec![OutputFormat::Text, OutputFormat::Html])
        .prompt()
        .context("Configuration cancelled")?;
    config.format = Some(format);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
