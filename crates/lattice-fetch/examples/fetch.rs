//! Send one request through the default pipeline.
//!
//! ```text
//! cargo run --example fetch -- https://httpbin.org/get
//! cargo run --example fetch -- --config client.toml --method post --data '{"a":1}' /items
//! RUST_LOG=lattice_fetch=debug cargo run --example fetch -- --token secret /me
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use lattice_fetch::{
    ClientConfig, HttpClient, HttpMethod, JsonFileStore, LogAlert, RequestError, RequestOptions,
    ResponseData,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl From<Method> for HttpMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => HttpMethod::Get,
            Method::Post => HttpMethod::Post,
            Method::Put => HttpMethod::Put,
            Method::Delete => HttpMethod::Delete,
            Method::Patch => HttpMethod::Patch,
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Send one request through the lattice-fetch pipeline")]
struct Cli {
    /// Absolute URL, or a path joined onto the configured base URL
    url: String,

    /// TOML client configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP method
    #[arg(short, long, value_enum, default_value_t = Method::Get)]
    method: Method,

    /// JSON request body
    #[arg(short, long)]
    data: Option<String>,

    /// Store this bearer token before sending
    #[arg(long)]
    token: Option<String>,

    /// File the token is persisted in
    #[arg(long, default_value = "lattice-credentials.json")]
    store: PathBuf,

    /// Override the request timeout
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Do not show an alert if the request fails
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), RequestError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };

    let client = HttpClient::builder()
        .config(config)
        .storage(JsonFileStore::new(&cli.store))
        .alert_presenter(LogAlert)
        .build()?;

    if let Some(token) = &cli.token {
        client.set_token(token).await;
    }

    let mut options = RequestOptions::new().method(cli.method.into());
    if let Some(data) = &cli.data {
        let value: serde_json::Value = serde_json::from_str(data)?;
        options = options.data(value);
    }
    if let Some(ms) = cli.timeout_ms {
        options = options.timeout(Duration::from_millis(ms));
    }
    if cli.quiet {
        options = options.suppress_error_alert();
    }

    let response = client.request(&cli.url, options).await?;

    tracing::info!(
        status = response.status,
        url = %response.url,
        content_type = response.content_type().unwrap_or("-"),
        "Response received"
    );
    match &response.data {
        ResponseData::Json(value) => {
            let pretty = serde_json::to_string_pretty(value)?;
            println!("{pretty}");
        }
        ResponseData::Text(text) => println!("{text}"),
    }

    Ok(())
}
