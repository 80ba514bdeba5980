//! crop-advisor CLI
//!
//! Terminal front end for the recommendation form.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use crop_advisor::{
    chart::{ChartData, build_chart},
    controller::Controller,
    error::{AppError, Result},
    models::{Config, Field, RecommendationResult},
    render,
    services::{AdvisorApi, HttpAdvisor},
    session,
};
use serde::Serialize;
use tokio::io::BufReader;

/// crop-advisor - soil & climate crop recommendation client
#[derive(Parser, Debug)]
#[command(
    name = "crop-advisor",
    version,
    about = "Get crop recommendations from soil and climate measurements"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "crop-advisor.toml")]
    config: PathBuf,

    /// Override the service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in the form interactively (default)
    Interactive,

    /// Submit one set of measurements and print the recommendation
    Recommend {
        #[command(flatten)]
        form: FormArgs,

        /// Prefill temperature, humidity and rainfall from the sensor first
        #[arg(long)]
        with_sensor: bool,

        /// Print the result and chart series as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch the latest sensor reading
    Sensor,

    /// Check that the service is up
    Health,

    /// List the crops the service knows about
    Crops,

    /// Show the service's model and crop statistics
    Stats,

    /// Validate the configuration file
    Validate,
}

/// Raw form values; validation happens in the controller.
#[derive(Args, Debug, Default)]
struct FormArgs {
    /// Nitrogen, ppm (0-140)
    #[arg(long, visible_alias = "n", allow_hyphen_values = true)]
    nitrogen: Option<String>,
    /// Phosphorus, ppm (5-145)
    #[arg(long, visible_alias = "p", allow_hyphen_values = true)]
    phosphorus: Option<String>,
    /// Potassium, ppm (5-205)
    #[arg(long, visible_alias = "k", allow_hyphen_values = true)]
    potassium: Option<String>,
    /// Temperature, °C (8-43)
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<String>,
    /// Relative humidity, % (14-100)
    #[arg(long, allow_hyphen_values = true)]
    humidity: Option<String>,
    /// Soil pH (3.5-9.5)
    #[arg(long, allow_hyphen_values = true)]
    ph: Option<String>,
    /// Rainfall, mm (20-300)
    #[arg(long, allow_hyphen_values = true)]
    rainfall: Option<String>,
}

impl FormArgs {
    fn entries(&self) -> impl Iterator<Item = (Field, &str)> {
        [
            (Field::Nitrogen, &self.nitrogen),
            (Field::Phosphorus, &self.phosphorus),
            (Field::Potassium, &self.potassium),
            (Field::Temperature, &self.temperature),
            (Field::Humidity, &self.humidity),
            (Field::Ph, &self.ph),
            (Field::Rainfall, &self.rainfall),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[derive(Serialize)]
struct RecommendOutput<'a> {
    result: Option<&'a RecommendationResult>,
    chart: Option<ChartData>,
    error: Option<String>,
}

async fn run_recommend(
    ctl: &mut Controller,
    form: &FormArgs,
    with_sensor: bool,
    json: bool,
    bar_width: usize,
) -> Result<()> {
    if with_sensor {
        ctl.fetch_sensor();
        ctl.settle().await;
        match ctl.state().sensor() {
            Some(reading) => log::info!(
                "Sensor prefill: {}°C, {}%, rain {}",
                reading.temperature,
                reading.humidity,
                reading.rain_value
            ),
            None => log::warn!("Sensor prefill failed, using the given values only"),
        }
    }

    for (field, value) in form.entries() {
        ctl.edit(field, value);
    }

    if ctl.submit() {
        ctl.settle().await;
    }

    let state = ctl.state();
    if json {
        let output = RecommendOutput {
            result: state.result(),
            chart: state.result().and_then(|r| build_chart(r.ranking())),
            error: state.banner().map(|b| b.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render::render_state(state, bar_width));
    }

    match state.banner() {
        Some(banner) => Err(AppError::from(banner)),
        None => Ok(()),
    }
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_if_present(&cli.config)?;
    init_logging(cli.verbose, &config.logging.level);

    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    let command = cli.command.unwrap_or(Command::Interactive);
    if let Command::Validate = command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK ({})", config.api.base_url);
        return Ok(());
    }

    config.validate()?;
    let advisor = HttpAdvisor::from_config(&config.api)?;
    log::debug!("Using service at {}", advisor.base_url());
    let api: Arc<dyn AdvisorApi> = Arc::new(advisor);
    let bar_width = config.display.bar_width;

    match command {
        Command::Interactive => {
            let mut ctl = Controller::new(api);
            let stdin = BufReader::new(tokio::io::stdin());
            let end = session::run(&mut ctl, stdin, &mut std::io::stdout(), bar_width).await?;
            log::debug!("Session ended: {:?}", end);
        }

        Command::Recommend {
            form,
            with_sensor,
            json,
        } => {
            let mut ctl = Controller::new(api);
            run_recommend(&mut ctl, &form, with_sensor, json, bar_width).await?;
        }

        Command::Sensor => {
            let mut ctl = Controller::new(api);
            ctl.fetch_sensor();
            ctl.settle().await;
            match (ctl.state().sensor(), ctl.state().banner()) {
                (Some(reading), _) => println!("{}", render::render_sensor(reading)),
                (None, Some(banner)) => return Err(AppError::from(banner)),
                (None, None) => {}
            }
        }

        Command::Health => {
            let health = api.health().await?;
            print!("{}", render::render_health(&health));
        }

        Command::Crops => {
            let catalog = api.crops().await?;
            print!("{}", render::render_catalog(&catalog));
        }

        Command::Stats => {
            let stats = api.stats().await?;
            print!("{}", render::render_stats(&stats));
        }

        // handled before the client is built
        Command::Validate => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_args_keep_only_given_fields() {
        let form = FormArgs {
            nitrogen: Some("90".into()),
            ph: Some("6.5".into()),
            ..FormArgs::default()
        };
        let entries: Vec<_> = form.entries().collect();
        assert_eq!(entries, vec![(Field::Nitrogen, "90"), (Field::Ph, "6.5")]);
    }

    #[test]
    fn cli_parses_recommend_flags() {
        let cli = Cli::try_parse_from([
            "crop-advisor", "recommend", "--n", "90", "--p", "40", "--k", "40",
            "--temperature", "21.5", "--humidity", "82", "--ph", "6.5",
            "--rainfall", "202", "--with-sensor",
        ])
        .unwrap();

        let Some(Command::Recommend { form, with_sensor, json }) = cli.command else {
            panic!("expected recommend");
        };
        assert!(with_sensor && !json);
        assert_eq!(form.entries().count(), 7);
        assert_eq!(form.temperature.as_deref(), Some("21.5"));
    }

    #[test]
    fn cli_defaults_to_interactive() {
        let cli = Cli::try_parse_from(["crop-advisor", "--base-url", "http://10.0.0.7:5000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.7:5000"));

        let cli = Cli::try_parse_from(["crop-advisor", "stats"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Stats)));
    }
}
