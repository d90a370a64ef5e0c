//! Recursive resolution of a description and module generation.
//!
//! Resolution is depth-first: sibling `apis` entries are handled in document
//! order and a referenced document is resolved in full before the next
//! sibling. Everything lands in one [`GenerationSession`], so sub-documents
//! share a single namespace for models and (action, subject) pairs.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::aggregate::{Aggregator, group_descriptors};
use crate::command_tree::{CommandDescriptor, CommandTree, classify_operation};
use crate::config::GeneratorConfig;
use crate::emit::{Emit, assemble, constructor};
use crate::error::GenerateError;
use crate::fetch::DocumentFetcher;
use crate::output::ModuleWriter;
use crate::path::decompose;
use crate::registry::ModelRegistry;
use crate::swagger::{ApiDocument, ApiEntry, OperationSpec, api_base, is_http, parse_document_uri, sub_document_uri};

/// Accumulated state of one top-level generation.
#[derive(Debug, Default)]
pub struct GenerationSession {
    descriptors: Vec<CommandDescriptor>,
    registry: ModelRegistry,
    depth: usize,
    active: Vec<String>,
    completed: HashSet<String>,
    base_uri: Option<String>,
}

impl GenerationSession {
    pub fn descriptors(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Nesting level of the document currently being resolved.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn base_uri(&self) -> &str {
        self.base_uri.as_deref().unwrap_or_default()
    }

    pub fn command_tree(&self, prefix: &str) -> CommandTree {
        CommandTree::from_groups(self.base_uri(), prefix, &group_descriptors(&self.descriptors))
    }
}

pub struct Generator<F> {
    config: GeneratorConfig,
    fetcher: F,
}

impl<F: DocumentFetcher> Generator<F> {
    pub fn new(config: GeneratorConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolves the document at `document_uri` and everything it references.
    pub fn resolve(&self, document_uri: &str) -> Result<GenerationSession, GenerateError> {
        let uri = parse_document_uri(document_uri)?;
        let mut session = GenerationSession::default();
        self.resolve_document(&mut session, &uri)?;
        debug_assert_eq!(session.depth, 0);
        info!(
            commands = session.descriptors.len(),
            declarations = session.registry.declarations().len(),
            "description resolved"
        );
        Ok(session)
    }

    /// Resolves and renders the whole module text.
    pub fn generate(&self, document_uri: &str) -> Result<String, GenerateError> {
        let session = self.resolve(document_uri)?;
        Ok(self.render(&session))
    }

    /// Resolves, renders and hands the module to `writer` once.
    pub fn create_module<W: ModuleWriter>(
        &self,
        document_uri: &str,
        output: &Path,
        writer: &mut W,
    ) -> Result<(), GenerateError> {
        let text = self.generate(document_uri)?;
        writer.write(output, &text).map_err(|source| GenerateError::Write {
            path: output.display().to_string(),
            source,
        })?;
        info!(path = %output.display(), "module written");
        Ok(())
    }

    /// Declarations, then model constructors, then merged commands, with
    /// type tokens normalized.
    pub fn render(&self, session: &GenerationSession) -> String {
        let prefix = &self.config.cmdlet_prefix;
        let constructors: Vec<_> = session.registry.models().map(|m| constructor(prefix, m)).collect();
        let commands = Aggregator::new(prefix, session.base_uri()).build_all(&session.descriptors);

        let pieces = session
            .registry
            .declarations()
            .iter()
            .map(|d| d as &dyn Emit)
            .chain(constructors.iter().map(|f| f as &dyn Emit))
            .chain(commands.iter().map(|f| f as &dyn Emit));
        self.config.normalizer().normalize_source(&assemble(pieces))
    }

    fn session_base(&self, root: &Url) -> String {
        if let Some(base) = &self.config.api_base_override {
            return base.clone();
        }
        let base = api_base(root);
        if !is_http(root) {
            warn!(%base, "root document is not served over http, generated calls target this base unless an API base override is set");
        }
        base
    }

    fn resolve_document(&self, session: &mut GenerationSession, uri: &Url) -> Result<(), GenerateError> {
        let key = uri.as_str().to_string();
        if session.active.contains(&key) {
            return Err(GenerateError::CyclicReference { uri: key });
        }
        if session.completed.contains(&key) {
            debug!(%uri, "document already resolved, skipping");
            return Ok(());
        }
        if session.base_uri.is_none() {
            session.base_uri = Some(self.session_base(uri));
        }

        info!(%uri, depth = session.depth, "resolving description document");
        let text = self.fetcher.fetch(uri).map_err(|source| GenerateError::Retrieval {
            uri: key.clone(),
            source,
        })?;
        let doc = ApiDocument::parse(uri, &text)?;
        doc.check_version(uri)?;

        session.registry.register_models(&doc.models);

        session.active.push(key.clone());
        for entry in doc.api_entries(uri)? {
            match entry {
                ApiEntry::Reference { path } => {
                    let child = sub_document_uri(uri, &path);
                    session.depth += 1;
                    let result = self.resolve_document(session, &child);
                    session.depth -= 1;
                    result?;
                }
                ApiEntry::Endpoint { path, operations } => {
                    collect_endpoint(session, doc.base_path(), &path, &operations)?;
                }
            }
        }
        session.active.pop();
        session.completed.insert(key);
        Ok(())
    }
}

fn collect_endpoint(
    session: &mut GenerationSession,
    base_path: &str,
    path: &str,
    operations: &[OperationSpec],
) -> Result<(), GenerateError> {
    let Some(decomposed) = decompose(path) else {
        warn!(path, "path names no subject, skipping its operations");
        return Ok(());
    };
    let endpoint = format!("{base_path}{path}");
    for operation in operations {
        let descriptor = classify_operation(&decomposed, &endpoint, operation)?;
        debug!(
            endpoint = %descriptor.endpoint,
            action = ?descriptor.action,
            subject = %descriptor.subject,
            parameter_set = %descriptor.parameter_set_name,
            "classified operation"
        );
        session.descriptors.push(descriptor);
    }
    Ok(())
}
