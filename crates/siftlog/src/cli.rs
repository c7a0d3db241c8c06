//! Command-line interface.
//!
//! ```bash
//! siftlog --store records.log '{"age": {"$gt": 21}}'
//! siftlog --config siftlog.yaml --sort '{"age": -1}' --projection '{"name": 1}'
//! siftlog --store records.log --text-field name --text-scope fields '{"$text": "ann"}'
//! ```
//!
//! Results are written to stdout as one JSON object per line, or as a single
//! pretty-printed array with `--pretty`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};

use crate::config::{Config, DEFAULT_CONFIG_FILE, TextScopeSetting};
use crate::engine::Engine;
use crate::query::Query;
use crate::shape::EndRule;

/// Siftlog - query a tagged JSON record log
///
/// Filters the records of a log with a JSON query, then optionally sorts and
/// projects them.
#[derive(Parser, Debug)]
#[command(name = "siftlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Query as a JSON object
    #[arg(default_value = "{}")]
    pub query: String,

    /// Configuration file (defaults to ./siftlog.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Record log to query (overrides the configured store)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Field eligible for full-text search (repeatable, comma-separated)
    #[arg(short = 't', long = "text-field", value_delimiter = ',')]
    pub text_fields: Vec<String>,

    /// Which fields `$text` searches
    #[arg(long, value_enum)]
    pub text_scope: Option<TextScopeArg>,

    /// End rule as JSON, e.g. '{"sort": {"age": -1}, "projection": {"name": 1}}'
    #[arg(short, long)]
    pub end_rule: Option<String>,

    /// Sort directive as JSON, e.g. '{"age": -1}'
    #[arg(long)]
    pub sort: Option<String>,

    /// Projection directive as JSON, e.g. '{"name": 1}'
    #[arg(short, long)]
    pub projection: Option<String>,

    /// Print a pretty JSON array instead of one object per line
    #[arg(long)]
    pub pretty: bool,
}

/// CLI form of the text scope setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextScopeArg {
    /// Search every string field
    All,
    /// Search only the text fields
    Fields,
}

impl From<TextScopeArg> for TextScopeSetting {
    fn from(arg: TextScopeArg) -> Self {
        match arg {
            TextScopeArg::All => Self::All,
            TextScopeArg::Fields => Self::Fields,
        }
    }
}

impl Cli {
    /// Parse command-line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Run the query and write the results to stdout.
    ///
    /// # Errors
    ///
    /// Fails on invalid arguments, unreadable configuration or store, and
    /// malformed store entries.
    pub async fn execute(&self) -> Result<()> {
        let config = self.resolve_config().await?;
        let query: Query = self.query.parse().context("failed to parse query")?;
        let end_rule = self.end_rule()?;

        let engine = Engine::from_config(&config);
        let results = engine
            .find(&query, end_rule.as_ref())
            .await
            .with_context(|| format!("query against {} failed", config.store.display()))?;

        let stdout = std::io::stdout();
        write_results(&mut stdout.lock(), results, self.pretty)?;
        Ok(())
    }

    /// Combine the configuration file (if any) with command-line overrides.
    async fn resolve_config(&self) -> Result<Config> {
        let mut config = match self.config.as_deref() {
            Some(path) => Some(load_config(path).await?),
            None => discover_config(Path::new(DEFAULT_CONFIG_FILE)).await?,
        };

        if let Some(store) = &self.store {
            config
                .get_or_insert_with(|| Config::new(store.clone()))
                .store
                .clone_from(store);
        }
        let Some(mut config) = config else {
            bail!("no store given: pass --store or provide {DEFAULT_CONFIG_FILE}");
        };

        if !self.text_fields.is_empty() {
            config.text_fields.clone_from(&self.text_fields);
        }
        if let Some(scope) = self.text_scope {
            config.text_scope = scope.into();
        }
        Ok(config)
    }

    /// Build the end rule from `--end-rule`, `--sort` and `--projection`.
    fn end_rule(&self) -> Result<Option<EndRule>> {
        let mut rule = match &self.end_rule {
            Some(text) => Some(text.parse::<EndRule>().context("failed to parse --end-rule")?),
            None => None,
        };

        if let Some(sort) = &self.sort {
            let sort: Value = serde_json::from_str(sort).context("--sort is not valid JSON")?;
            let extra = EndRule::from_value(serde_json::json!({ "sort": sort }))?;
            rule = Some(rule.unwrap_or_default().merge(extra));
        }
        if let Some(projection) = &self.projection {
            let projection: Value =
                serde_json::from_str(projection).context("--projection is not valid JSON")?;
            let extra = EndRule::from_value(serde_json::json!({ "projection": projection }))?;
            rule = Some(rule.unwrap_or_default().merge(extra));
        }
        Ok(rule)
    }
}

/// Load `candidate` if it exists. Any error other than absence is reported.
async fn discover_config(candidate: &Path) -> Result<Option<Config>> {
    let exists = tokio::fs::try_exists(candidate)
        .await
        .with_context(|| format!("failed to check for config {}", candidate.display()))?;
    if exists {
        load_config(candidate).await.map(Some)
    } else {
        Ok(None)
    }
}

async fn load_config(path: &Path) -> Result<Config> {
    Config::load(path)
        .await
        .with_context(|| format!("failed to load config {}", path.display()))
}

/// Write results as JSON lines, or as one pretty array.
fn write_results<W: Write>(out: &mut W, results: Vec<Map<String, Value>>, pretty: bool) -> Result<()> {
    if pretty {
        let array = Value::Array(results.into_iter().map(Value::Object).collect());
        serde_json::to_writer_pretty(&mut *out, &array)?;
        writeln!(out)?;
    } else {
        for record in results {
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
