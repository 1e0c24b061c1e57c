use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use entigen_core::{Schema, parse_schema, validate_schema};

use crate::emitters;
use crate::errors::{GenerationError, Result};
use crate::model::{CodeArtifact, GENERATED_DIR, GenerateOptions, GenerationReport, ROUTES_DIR};
use crate::output::write_artifacts;
use crate::visitors::{ComponentVisitor, EntityClassVisitor, SchemaVisitor};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub artifacts: Vec<CodeArtifact>,
    pub report: GenerationReport,
}

/// Entry point for turning a schema into project files.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Derive every artifact for `schema` without touching the filesystem.
    ///
    /// Order: `schema.ts`, `tables.ts`, `data.ts`, `db.ts`, entity classes,
    /// components, then routes when enabled.
    pub fn preview(&self, schema: &Schema) -> Result<Vec<CodeArtifact>> {
        validate_schema(schema)?;

        let mut artifacts = vec![
            emitters::schema_file(schema),
            emitters::tables_file(schema),
            emitters::data_file(schema),
            emitters::db_file(&self.options.db_name),
        ];
        artifacts.extend(EntityClassVisitor::new().visit_schema(schema));
        artifacts.extend(ComponentVisitor::new(schema).visit_schema(schema));
        if self.options.generate_routes {
            artifacts.extend(emitters::route_files());
        }

        Ok(artifacts)
    }

    /// Parse a YAML schema document and generate it.
    pub async fn run_yaml(&self, yaml: &str) -> Result<GenerationResult> {
        let schema = parse_schema(yaml)?;
        info!(
            event = "schema.normalized",
            entities = schema.entities.len(),
            join_tables = schema.join_tables.len()
        );
        self.run(&schema).await
    }

    /// Derive and write every artifact for `schema`.
    pub async fn run(&self, schema: &Schema) -> Result<GenerationResult> {
        let start = Instant::now();
        let out_dir = self.options.out_dir.clone();

        info!(
            event = "generation.started",
            out_dir = %out_dir.display(),
            entities = schema.entities.len(),
            routes = self.options.generate_routes
        );

        let artifacts = self.preview(schema)?;
        info!(event = "artifacts.derived", artifacts = artifacts.len());

        self.prepare_directories(schema).await?;
        let report = write_artifacts(&out_dir, &artifacts).await;

        if !report.is_success() {
            for failure in &report.failures {
                warn!(
                    event = "generation.write_failed",
                    path = %failure.path,
                    error = %failure.error
                );
            }
            warn!(
                event = "generation.failed",
                written = report.artifacts_written,
                total = report.artifacts_total,
                failures = report.failures.len()
            );
            return Err(GenerationError::Failed(report));
        }

        info!(
            event = "generation.completed",
            written = report.artifacts_written,
            total = report.artifacts_total,
            duration_ms = start.elapsed().as_millis() as u64
        );

        Ok(GenerationResult {
            out_dir,
            artifacts,
            report,
        })
    }

    async fn prepare_directories(&self, schema: &Schema) -> Result<()> {
        for dir in self.directories(schema) {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    fn directories(&self, schema: &Schema) -> Vec<PathBuf> {
        let root = self.options.out_dir.as_path();
        let mut dirs = vec![
            join(root, GENERATED_DIR),
            join(root, &format!("{GENERATED_DIR}/classes")),
            join(root, &format!("{GENERATED_DIR}/components")),
        ];
        dirs.extend(schema.entities.values().map(|entity| {
            join(
                root,
                &format!("{GENERATED_DIR}/components/{}", entity.instance_name()),
            )
        }));
        if self.options.generate_routes {
            dirs.push(join(root, &format!("{ROUTES_DIR}/[table]/[id]")));
        }
        dirs
    }
}

fn join(root: &Path, relative: &str) -> PathBuf {
    crate::output::writer::resolve(root, relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_orders_schema_level_files_first() {
        let schema = parse_schema("Tag:\n  name: string\n").expect("parse schema");
        let artifacts = GenerationEngine::default()
            .preview(&schema)
            .expect("preview");

        let paths: Vec<&str> = artifacts
            .iter()
            .take(5)
            .map(|artifact| artifact.target_path.as_str())
            .collect();
        assert_eq!(
            paths,
            [
                "src/lib/generated/schema.ts",
                "src/lib/generated/tables.ts",
                "src/lib/generated/data.ts",
                "src/lib/generated/db.ts",
                "src/lib/generated/classes/Tag.svelte.ts",
            ]
        );
        assert_eq!(artifacts.len(), 4 + 1 + 3 + 6);
    }

    #[test]
    fn routes_can_be_disabled() {
        let schema = parse_schema("Tag:\n").expect("parse schema");
        let engine = GenerationEngine::new(GenerateOptions {
            generate_routes: false,
            ..GenerateOptions::default()
        });
        let artifacts = engine.preview(&schema).expect("preview");
        assert!(
            artifacts
                .iter()
                .all(|artifact| !artifact.target_path.starts_with("src/routes"))
        );
        assert!(
            !engine
                .directories(&schema)
                .iter()
                .any(|dir| dir.to_string_lossy().contains("routes"))
        );
    }

    #[test]
    fn invalid_schema_is_rejected_before_derivation() {
        let mut schema = parse_schema("Tag:\n").expect("parse schema");
        if let Some(tag) = schema.entities.get_mut("Tag") {
            tag.fields.shift_remove("id");
        }
        let err = GenerationEngine::default().preview(&schema).unwrap_err();
        assert!(matches!(err, GenerationError::Core(_)), "got {err:?}");
    }
}
