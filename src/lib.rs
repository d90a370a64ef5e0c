pub mod action;
pub mod aggregate;
pub mod command_tree;
pub mod config;
pub mod emit;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod path;
pub mod registry;
pub mod resolve;
pub mod swagger;
pub mod types;

use std::path::Path;

pub use config::GeneratorConfig;
pub use error::{FetchError, GenerateError};
pub use fetch::{DefaultFetcher, DocumentFetcher};
pub use output::{FileWriter, ModuleWriter};
pub use resolve::{GenerationSession, Generator};

/// Generates a PowerShell module from the Swagger 1.2 description at
/// `document_uri` and writes it to `output`.
///
/// Configuration not given here (API base override, fetch token, extra
/// passthrough models) is read from the environment.
pub fn create_powershell_module(document_uri: &str, cmdlet_prefix: &str, output: &Path) -> Result<(), GenerateError> {
    let config = GeneratorConfig::new(cmdlet_prefix).with_env();
    let fetcher = DefaultFetcher::new(config.auth_token.clone(), config.headers.clone()).map_err(|source| {
        GenerateError::Retrieval {
            uri: document_uri.to_string(),
            source,
        }
    })?;
    Generator::new(config, fetcher).create_module(document_uri, output, &mut FileWriter)
}
