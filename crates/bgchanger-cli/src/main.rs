//! bgchanger-cli: submit one composite from the command line.
//!
//! Reads a subject and a background image from disk, sends them with the
//! given parameters through the same submit path the web app uses, and
//! writes the composited PNG.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin bgchanger-cli -- --subject me.jpg --background beach.png [OPTIONS]
//! ```
//!
//! Service settings come from `--base-url` / `--timeout-secs`, falling
//! back to `BGCHANGER_API_BASE_URL` / `BGCHANGER_API_TIMEOUT_SECS` in the
//! environment or a `.env` file.

#![allow(clippy::print_stderr)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bgchanger_pipeline::config::{ENV_BASE_URL, ENV_TIMEOUT_SECS};
use bgchanger_pipeline::{
    ConfigError, Field, FieldValue, FormError, FormParameters, FormStore, ImageSlot, ImageSource,
    PipelineState, ReadError, ServiceConfig, Session, SubmissionRequest, SubmitError, SubmitOutcome, Transport,
    TransportError, submit,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Submit one subject/background pair to the compositing service.
#[derive(Parser, Debug)]
#[command(name = "bgchanger-cli", version)]
struct Cli {
    /// Photo of the user to composite.
    #[arg(long)]
    subject: PathBuf,

    /// Scene to composite onto.
    #[arg(long)]
    background: PathBuf,

    /// Attire prompt.
    #[arg(long, default_value_t = FormParameters::<FileImage>::DEFAULT_PROMPT.to_owned())]
    prompt: String,

    /// Fraction of the frame top kept clear (intended 0.3-0.7).
    #[arg(long, default_value_t = FormParameters::<FileImage>::DEFAULT_IDOL_SAFE_ZONE_TOP)]
    idol_safe_zone_top: f64,

    /// Minimum group scale (intended 0.4-1.0).
    #[arg(long, default_value_t = FormParameters::<FileImage>::DEFAULT_MIN_GROUP_SCALE)]
    min_group_scale: f64,

    /// Maximum group scale (intended 0.7-1.0).
    #[arg(long, default_value_t = FormParameters::<FileImage>::DEFAULT_MAX_GROUP_SCALE)]
    max_group_scale: f64,

    /// User scale (intended 0.5-1.0).
    #[arg(long, default_value_t = FormParameters::<FileImage>::DEFAULT_USER_SCALE)]
    user_scale: f64,

    /// Horizontal placement: -1 (left), 0 (center) or 1 (right).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    horizontal_shift: i8,

    /// Color balance (intended 0.3-1.0).
    #[arg(long, default_value_t = FormParameters::<FileImage>::DEFAULT_COLOR_BALANCE)]
    color_balance: f64,

    /// Service base URL. Overrides `BGCHANGER_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds. Overrides `BGCHANGER_API_TIMEOUT_SECS`.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Where to write the composited PNG.
    #[arg(long, short, default_value = "composited.png")]
    output: PathBuf,
}

/// Errors that end a CLI run.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("submission was not started")]
    NotStarted,

    #[error("result image is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image file read from disk at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileImage {
    path: PathBuf,
    name: String,
}

impl FileImage {
    fn new(path: &Path) -> Self {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            path: path.to_owned(),
            name,
        }
    }
}

impl ImageSource for FileImage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<Vec<u8>, ReadError> {
        std::fs::read(&self.path)
            .map_err(|e| ReadError::new(format!("failed to read {}: {e}", self.path.display())))
    }
}

/// Blocking HTTP transport; the client enforces the timeout.
struct BlockingTransport {
    client: reqwest::blocking::Client,
    config: ServiceConfig,
}

impl BlockingTransport {
    fn new(config: ServiceConfig) -> Result<Self, CliError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(CliError::Client)?;
        Ok(Self { client, config })
    }

    fn classify(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::TimedOut(self.config.timeout())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl Transport for BlockingTransport {
    async fn send(&self, request: SubmissionRequest) -> Result<String, TransportError> {
        let url = self.config.edit_url();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        tracing::info!(%url, status = status.as_u16(), "compositing service responded");
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response.text().map_err(|e| self.classify(&e))
    }
}

/// Resolve service settings, flags first, then the environment.
fn service_config(cli: &Cli) -> Result<ServiceConfig, ConfigError> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| std::env::var(ENV_BASE_URL).ok());
    let timeout = cli
        .timeout_secs
        .map(|secs| secs.to_string())
        .or_else(|| std::env::var(ENV_TIMEOUT_SECS).ok());
    ServiceConfig::from_env_values(base_url.as_deref(), timeout.as_deref())
}

/// Form parameters described by the CLI flags.
///
/// Every value goes through [`FormStore`], so flags obey the same rules
/// as the web form: numbers must be finite and the shift one of -1, 0, 1.
fn form_from_cli(cli: &Cli) -> Result<FormParameters<FileImage>, FormError> {
    let mut store = FormStore::default();
    store.set_image(ImageSlot::Subject, FileImage::new(&cli.subject));
    store.set_image(ImageSlot::Background, FileImage::new(&cli.background));
    store.apply(Field::Prompt, FieldValue::Text(cli.prompt.clone()))?;
    for (field, value) in [
        (Field::IdolSafeZoneTop, cli.idol_safe_zone_top),
        (Field::MinGroupScale, cli.min_group_scale),
        (Field::MaxGroupScale, cli.max_group_scale),
        (Field::UserScale, cli.user_scale),
        (Field::HorizontalShift, f64::from(cli.horizontal_shift)),
        (Field::ColorBalance, cli.color_balance),
    ] {
        store.apply(field, FieldValue::Number(value))?;
    }
    Ok(store.snapshot())
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = service_config(cli)?;
    tracing::info!(
        base_url = config.base_url(),
        timeout = ?config.timeout(),
        "using compositing service"
    );
    let transport = BlockingTransport::new(config)?;

    let session = RefCell::new(Session::with_form(form_from_cli(cli)?));
    match futures::executor::block_on(submit(&session, &transport)) {
        SubmitOutcome::Displayed => {}
        SubmitOutcome::Ignored => return Err(CliError::NotStarted),
        SubmitOutcome::Failed(err) => return Err(err.into()),
    }

    let session = session.into_inner();
    let bytes = match session.state() {
        PipelineState::Displaying(image) => image.png_bytes()?,
        _ => return Err(CliError::NotStarted),
    };
    std::fs::write(&cli.output, &bytes).map_err(|source| CliError::Write {
        path: cli.output.clone(),
        source,
    })?;
    tracing::info!(path = %cli.output.display(), len = bytes.len(), "composited image written");
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bgchanger_cli=info,bgchanger_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Submit(err)) => {
            eprintln!("{}: {err}", err.user_message());
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
