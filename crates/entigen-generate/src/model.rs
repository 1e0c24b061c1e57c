use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directory holding generated library code, relative to the output directory.
pub const GENERATED_DIR: &str = "src/lib/generated";
/// Directory holding generated routes, relative to the output directory.
pub const ROUTES_DIR: &str = "src/routes";

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Project directory artifacts are written under.
    pub out_dir: PathBuf,
    /// Name of the client-side database the storage handle opens.
    pub db_name: String,
    /// Emit the generic CRUD routes and the layout files.
    pub generate_routes: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            db_name: "app-db".to_string(),
            generate_routes: true,
        }
    }
}

/// Category of a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    Schema,
    EntityClass,
    Component,
    Route,
    Database,
}

/// UI component generated for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Detail,
    ListItem,
    Select,
    List,
    Delete,
}

impl ComponentKind {
    /// Components every entity gets regardless of relations.
    pub const BASELINE: [ComponentKind; 3] = [
        ComponentKind::Detail,
        ComponentKind::ListItem,
        ComponentKind::Select,
    ];

    /// File and import suffix (`Post` + `ListItem`).
    pub fn suffix(self) -> &'static str {
        match self {
            ComponentKind::Detail => "Detail",
            ComponentKind::ListItem => "ListItem",
            ComponentKind::Select => "Select",
            ComponentKind::List => "List",
            ComponentKind::Delete => "Delete",
        }
    }
}

/// A single generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeArtifact {
    /// `/`-separated path relative to the output directory.
    pub target_path: String,
    pub kind: ArtifactKind,
    pub dependencies: Vec<String>,
    pub content: String,
}

impl CodeArtifact {
    pub fn new(target_path: impl Into<String>, kind: ArtifactKind, content: String) -> Self {
        Self {
            target_path: target_path.into(),
            kind,
            dependencies: Vec::new(),
            content,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// A write that did not reach the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFailure {
    pub path: String,
    pub error: String,
}

/// Report for a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub artifacts_total: usize,
    pub artifacts_written: usize,
    pub failures: Vec<WriteFailure>,
}

impl GenerationReport {
    pub fn new(artifacts_total: usize) -> Self {
        Self {
            artifacts_total,
            ..Self::default()
        }
    }

    pub fn record_written(&mut self) {
        self.artifacts_written += 1;
    }

    pub fn record_failure(&mut self, path: impl Into<String>, error: impl ToString) {
        self.failures.push(WriteFailure {
            path: path.into(),
            error: error.to_string(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
