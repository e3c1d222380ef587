//! # CLI
//!
//! This module defines the command-line interface of `pangenome` using `clap`.
//!
//! It is responsible for parsing user input, validating request bodies against the service
//! records, and merging the optional config file with flags and environment variables.
use anyhow::Context;
use clap::{Parser, Subcommand};
use pangenome_api_core::{
    AuthToken, ClientConfig,
    models::{
        ComputeSummaryFromPG, SearchComparisonGenomesFromCG, SearchFamiliesFromCG,
        SearchFunctionsFromCG, SearchGenomesFromPG, SearchOrthologsFromPG,
    },
};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pangenome", version, about = "PanGenomeAPI command line client")]
pub struct Cli {
    /// The service endpoint (e.g. https://kbase.us/services/pangenome_api)
    #[arg(long, global = true, env = "PANGENOME_API_URL")]
    pub url: Option<String>,

    /// Authorization token sent with every call
    #[arg(long, global = true, env = "KB_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// JSON file with a client configuration. Flags override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read timeout in milliseconds, 0 waits indefinitely
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Allow the token to be sent over plaintext http
    #[arg(long, global = true)]
    pub allow_insecure_http: bool,

    /// Accept any server certificate, including self-signed ones
    #[arg(long, global = true)]
    pub trust_all_certificates: bool,

    /// Send request bodies with chunked transfer encoding
    #[arg(long, global = true)]
    pub streaming: bool,

    /// Route calls to a specific release of the service (e.g. "beta", "dev")
    #[arg(long, global = true)]
    pub service_version: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the ortholog families of a pangenome
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// pangenome search-orthologs --body '{"pangenome_ref": "7/1/1", "query": "kinase", "limit": 10}'
    /// ```
    SearchOrthologs {
        #[arg(long, value_parser = parse_record::<SearchOrthologsFromPG>)]
        body: SearchOrthologsFromPG,
    },
    /// Search the genome features of a pangenome
    SearchGenomes {
        #[arg(long, value_parser = parse_record::<SearchGenomesFromPG>)]
        body: SearchGenomesFromPG,
    },
    /// Search the families of a genome comparison
    SearchFamilies {
        #[arg(long, value_parser = parse_record::<SearchFamiliesFromCG>)]
        body: SearchFamiliesFromCG,
    },
    /// Search the functions of a genome comparison
    SearchFunctions {
        #[arg(long, value_parser = parse_record::<SearchFunctionsFromCG>)]
        body: SearchFunctionsFromCG,
    },
    /// Search the genomes of a genome comparison
    SearchComparisonGenomes {
        #[arg(long, value_parser = parse_record::<SearchComparisonGenomesFromCG>)]
        body: SearchComparisonGenomesFromCG,
    },
    /// Compute family and gene counts for a pangenome
    Summary {
        #[arg(long, value_parser = parse_record::<ComputeSummaryFromPG>)]
        body: ComputeSummaryFromPG,
    },
    /// Report the service status
    Status,
}

impl Cli {
    /// Builds the client configuration: config file first, then flags and environment.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid config file '{}'", path.display()))?
            }
            None => ClientConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(AuthToken::new(token.clone()));
        }
        if let Some(timeout) = self.timeout_ms {
            config.read_timeout_ms = Some(timeout);
        }
        if let Some(version) = &self.service_version {
            config.service_version = Some(version.clone());
        }
        config.insecure_http_allowed |= self.allow_insecure_http;
        config.trust_all_certificates |= self.trust_all_certificates;
        config.streaming_mode |= self.streaming;

        anyhow::ensure!(
            !config.url.is_empty(),
            "No service URL given, use --url, PANGENOME_API_URL or a config file"
        );

        Ok(config)
    }
}

fn parse_record<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_str(value).map_err(|e| format!("Invalid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_search_body() {
        let cli = Cli::try_parse_from([
            "pangenome",
            "--url",
            "https://kbase.us/services/pangenome_api",
            "search-genomes",
            "--body",
            r#"{"pangenome_ref": "7/1/1", "limit": 10}"#,
        ])
        .unwrap();

        let Commands::SearchGenomes { body } = cli.command else {
            panic!("expected search-genomes");
        };
        assert_eq!(body.pangenome_ref().map(String::as_str), Some("7/1/1"));
        assert_eq!(body.limit(), Some(&10));
    }

    #[test]
    fn test_rejects_mistyped_body() {
        let result = Cli::try_parse_from([
            "pangenome",
            "search-orthologs",
            "--body",
            r#"{"limit": "ten"}"#,
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "https://kbase.us/services/pangenome_api", "read_timeout_ms": 1000, "service_version": "release"}}"#
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "pangenome",
            "--config",
            file.path().to_str().unwrap(),
            "--service-version",
            "dev",
            "--allow-insecure-http",
            "status",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.url, "https://kbase.us/services/pangenome_api");
        assert_eq!(config.read_timeout_ms, Some(1000));
        assert_eq!(config.service_version.as_deref(), Some("dev"));
        assert!(config.insecure_http_allowed);
        assert!(!config.streaming_mode);
    }

    #[test]
    fn test_missing_url() {
        let cli = Cli {
            url: None,
            token: None,
            config: None,
            timeout_ms: None,
            allow_insecure_http: false,
            trust_all_certificates: false,
            streaming: false,
            service_version: None,
            command: Commands::Status,
        };

        assert!(cli.client_config().is_err());
    }
}
