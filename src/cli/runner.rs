//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs, OutputFormat};
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::fetch::HttpPageFetcher;
use crate::pager::{PageOutcome, SessionStats};
use crate::session::Session;
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch(args) => self.fetch(args).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file, or defaults when none was given
    fn load_config(&self) -> Result<FeedConfig> {
        match &self.cli.config {
            Some(path) => FeedConfig::from_file(path),
            None => Ok(FeedConfig::default()),
        }
    }

    /// Fetch every page and print the items
    async fn fetch(&self, args: &FetchArgs) -> Result<()> {
        let config = apply_overrides(self.load_config()?, args)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Fetching {} ({} mode)", config.http.base_url, config.mode)
            }
        }));

        let session = Self::accumulate(&config, args.max_pages).await?;
        let state = session.state();

        for item in &state.items {
            self.output_message(&json!({
                "type": "RECORD",
                "record": item
            }));
        }
        self.output_message(&json!({
            "type": "STATS",
            "stats": stats_json(&session.stats(), state.len(), state.has_more)
        }));

        match state.error {
            Some(message) => Err(Error::Other(message)),
            None => Ok(()),
        }
    }

    /// Run a session for `config` until the feed is exhausted, a fetch
    /// fails, or `max_pages` pages have been loaded.
    pub async fn accumulate(
        config: &FeedConfig,
        max_pages: Option<usize>,
    ) -> Result<Session<Value, Value>> {
        let fetcher = HttpPageFetcher::new(config.http_fetcher_config()?)?;
        let session = Session::new(config.session_config::<Value>(fetcher))?;

        let mut outcome = session.activate().await;
        let mut pages = 1;
        while let PageOutcome::Loaded { has_more: true, .. } = outcome {
            if max_pages.is_some_and(|max| pages >= max) {
                info!(pages, "Reached page limit");
                break;
            }
            outcome = session.load_next_page().await;
            pages += 1;
        }

        info!(?outcome, items = session.state().len(), "Session finished");
        Ok(session)
    }

    /// Validate a config file
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("No config file specified (use --config)"))?;
        let config = FeedConfig::from_file(path)?;

        if !config.http.base_url.is_empty() {
            let fetcher = HttpPageFetcher::new(config.http_fetcher_config()?)?;
            info!(endpoint = %fetcher.endpoint(), "Endpoint resolved");
        }

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Config '{}' is valid: {} mode, limit {}",
                    path.display(),
                    config.mode,
                    config.limit
                )
            }
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Apply command-line overrides on top of a loaded config
fn apply_overrides(mut config: FeedConfig, args: &FetchArgs) -> Result<FeedConfig> {
    if let Some(url) = &args.url {
        config.http.base_url = url.clone();
    }
    if let Some(path) = &args.path {
        config.http.path = path.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        config.http.headers.insert(name, value);
    }

    config.validate()?;
    Ok(config)
}

/// Split `Name: value`
fn parse_header(header: &str) -> Result<(String, String)> {
    let (name, value) = header
        .split_once(':')
        .ok_or_else(|| Error::invalid_value("header", format!("expected 'Name: value', got '{header}'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_value("header", "name cannot be empty"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn stats_json(stats: &SessionStats, items: usize, has_more: bool) -> Value {
    json!({
        "items": items,
        "has_more": has_more,
        "pages_fetched": stats.pages_fetched,
        "items_received": stats.items_received,
        "duplicates_dropped": stats.duplicates_dropped,
        "errors": stats.errors,
        "stale_discarded": stats.stale_discarded,
        "last_fetch_ms": stats.last_fetch.map(|d| d.as_millis() as u64),
    })
}
