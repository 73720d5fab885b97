//! Command-line interface.

use std::env;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use wikiup_confluence::{
    Auth, ClientConfig, ConfluenceClient, DocumentOutcome, PublishConfig, Publisher, RunSummary,
};
use wikiup_source::{resolve_inputs, select_files};

use crate::error::CliError;
use crate::output::Output;

/// Environment prefix scanned for extra request headers.
const HEADER_ENV_PREFIX: &str = "CONFLUENCE_HEADER_";

/// Publish Markdown documents with a `wiki` front-matter block to Confluence.
#[derive(Debug, Parser)]
#[command(name = "wikiup", version, about)]
pub(crate) struct Cli {
    /// Markdown files or directories to publish. When empty, the changed
    /// files of the last commit are taken from the git repository.
    files: Vec<PathBuf>,

    /// Git repository consulted when no files are given.
    #[arg(long, default_value = ".", value_name = "REPO")]
    git: PathBuf,

    /// Confluence base URL, e.g. https://confluence.example.com.
    #[arg(long = "api_url", env = "CONFLUENCE_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Username for basic authentication.
    #[arg(long, env = "CONFLUENCE_USERNAME", value_name = "USER")]
    username: Option<String>,

    /// Password for basic authentication, or a bearer token when no
    /// username is given.
    #[arg(
        long,
        env = "CONFLUENCE_PASSWORD",
        hide_env_values = true,
        value_name = "SECRET"
    )]
    password: Option<String>,

    /// Space key for documents that do not name one themselves.
    #[arg(long, env = "CONFLUENCE_SPACE", value_name = "KEY")]
    space: Option<String>,

    /// Parent page id for newly created pages.
    #[arg(long = "ancestor_id", env = "CONFLUENCE_ANCESTOR_ID", value_name = "ID")]
    ancestor_id: Option<String>,

    /// Label applied to every published page.
    #[arg(
        long = "global_label",
        env = "CONFLUENCE_GLOBAL_LABEL",
        value_name = "LABEL"
    )]
    global_label: Option<String>,

    /// Extra request header as NAME=VALUE. Repeatable.
    #[arg(long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Select, render and report as usual but skip every write to Confluence.
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Enable info-level log output.
    #[arg(long)]
    pub(crate) verbose: bool,
}

impl Cli {
    /// Execute the publish run and print its summary.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is unusable or no input
    /// mode can be resolved. Per-document failures do not error here;
    /// they are part of the returned summary.
    pub(crate) fn execute(self, output: &Output) -> Result<RunSummary, CliError> {
        let api_url = self.api_url.ok_or_else(|| {
            CliError::Validation("no API URL: pass --api_url or set CONFLUENCE_API_URL".to_owned())
        })?;
        let auth = resolve_auth(self.username, self.password)?;
        let headers = collect_headers(&self.headers)?;

        let input = resolve_inputs(self.files, &self.git)?;
        let files = select_files(&input)?;
        if files.is_empty() {
            output.warning("No Markdown files to publish.");
            return Ok(RunSummary::default());
        }
        info!("Publishing {} file(s) to {api_url}", files.len());

        let client = ConfluenceClient::new(ClientConfig {
            base_url: api_url,
            auth,
            headers,
            dry_run: self.dry_run,
        });
        let publisher = Publisher::new(
            &client,
            PublishConfig {
                space: self.space,
                ancestor_id: self.ancestor_id,
                global_label: self.global_label,
            },
        );
        let summary = publisher.publish_all(&files);
        print_summary(output, &summary, self.dry_run);
        Ok(summary)
    }
}

/// Map username/password settings onto an authentication scheme.
///
/// A password without a username is treated as a bearer token.
fn resolve_auth(username: Option<String>, password: Option<String>) -> Result<Auth, CliError> {
    match (username, password) {
        (Some(username), Some(password)) => Ok(Auth::Basic { username, password }),
        (None, Some(token)) => Ok(Auth::Bearer { token }),
        (Some(_), None) => Err(CliError::Validation(
            "no password: --username also needs --password or CONFLUENCE_PASSWORD".to_owned(),
        )),
        (None, None) => Err(CliError::Validation(
            "no credentials: set CONFLUENCE_USERNAME and CONFLUENCE_PASSWORD, \
             or CONFLUENCE_PASSWORD alone for token auth"
                .to_owned(),
        )),
    }
}

/// Collect extra request headers from the environment and `--header` flags.
///
/// Flags win over `CONFLUENCE_HEADER_<NAME>` variables of the same name.
fn collect_headers(flags: &[String]) -> Result<Vec<(String, String)>, CliError> {
    // Environment iteration order is unspecified; sort for stable requests.
    let mut headers: Vec<(String, String)> = env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(HEADER_ENV_PREFIX)
                .map(|name| (name.to_owned(), value))
        })
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    for flag in flags {
        let Some((name, value)) = flag.split_once('=') else {
            return Err(CliError::Validation(format!(
                "invalid header {flag:?}: expected NAME=VALUE"
            )));
        };
        headers.retain(|(existing, _)| existing != name);
        headers.push((name.to_owned(), value.to_owned()));
    }
    Ok(headers)
}

/// Print the run summary, one line per document.
fn print_summary(output: &Output, summary: &RunSummary, dry_run: bool) {
    output.separator();
    if dry_run {
        output.highlight("DRY RUN - nothing was written to Confluence");
    }
    for report in &summary.reports {
        let path = report.path.display();
        match &report.result {
            Ok(DocumentOutcome::Created(page)) => {
                output.success(&format!("created  {path} (page {})", page.id));
            }
            Ok(DocumentOutcome::Updated(page)) => {
                output.success(&format!("updated  {path} (page {})", page.id));
            }
            Ok(DocumentOutcome::Skipped) => {
                output.info(&format!("skipped  {path}"));
            }
            Err(err) => {
                output.error(&format!("failed   {path}: {err}"));
            }
        }
    }
    output.separator();
    let counts = format!(
        "{} created, {} updated, {} skipped, {} failed",
        summary.created(),
        summary.updated(),
        summary.skipped(),
        summary.failed()
    );
    if summary.has_failures() {
        output.error(&counts);
    } else {
        output.success(&counts);
    }
}
