//! Schema registry: registration, lookup and on-disk definitions
//!
//! - Registration validates elision metadata and canonicalizes defaults
//! - Nested record references must already be registered (bottom-up)
//! - Registered schemas are immutable and shared as `Arc<Schema>`
//! - Definitions on disk live at `<dir>/schema_<name>_<version>.json`
//!
//! Registration takes `&mut self` and lookups take `&self`, so the usual
//! discipline is: build the registry once, then share it read-only (e.g.
//! behind a `OnceLock`) with every thread that constructs records.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Links, Schema, SchemaDefinition};
use super::validator::SchemaValidator;
use crate::observability::{log_event_with_fields, Event};

/// In-memory registry of schemas keyed by type name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition and returns the immutable schema.
    ///
    /// Registering an identical definition again returns the existing
    /// schema. A different definition under a taken name is rejected.
    ///
    /// # Errors
    ///
    /// - `InvalidSchema`: empty schema or field name
    /// - `ElideNonNullable`: elidable field whose type does not admit null
    /// - `UnknownRecordType`: nested reference to an unregistered schema
    /// - `InvalidDefault`: default the validator cannot coerce
    /// - `SchemaImmutable`: name already bound to another definition
    pub fn register(&mut self, definition: SchemaDefinition) -> SchemaResult<Arc<Schema>> {
        match self.build(definition) {
            Ok(schema) => self.insert(schema),
            Err(err) => {
                log_event_with_fields(
                    Event::SchemaRejected,
                    &[
                        ("code", err.code().code()),
                        ("schema", err.schema().unwrap_or("")),
                    ],
                );
                Err(err)
            }
        }
    }

    fn build(&self, mut definition: SchemaDefinition) -> SchemaResult<Schema> {
        definition.validate_structure()?;

        let mut links = Links::new();
        for (field_name, def) in &definition.fields {
            let mut refs = Vec::new();
            def.field_type.collect_record_refs(&mut refs);
            for target in refs {
                let nested = self
                    .schemas
                    .get(target)
                    .ok_or_else(|| SchemaError::unknown_record_type(&definition.name, field_name, target))?;
                links.insert(target.to_string(), Arc::clone(nested));
            }
        }

        let validator = SchemaValidator::new(&definition.name, &links);
        let mut canonical = Vec::new();
        for (field_name, def) in &definition.fields {
            if let Some(default) = &def.default {
                let value = validator
                    .validate(&def.field_type, default.clone(), field_name)
                    .map_err(|err| {
                        SchemaError::invalid_default(&definition.name, field_name, err.into_details())
                    })?;
                canonical.push((field_name.clone(), value));
            }
        }
        for (field_name, value) in canonical {
            if let Some(def) = definition.fields.get_mut(&field_name) {
                def.default = Some(value);
            }
        }

        Ok(Schema::new(definition, links))
    }

    fn insert(&mut self, schema: Schema) -> SchemaResult<Arc<Schema>> {
        if let Some(existing) = self.schemas.get(schema.name()) {
            if existing.definition().same_as(schema.definition()) {
                return Ok(Arc::clone(existing));
            }
            return Err(SchemaError::schema_immutable(schema.name()));
        }

        let schema = Arc::new(schema);
        log_event_with_fields(
            Event::SchemaRegistered,
            &[
                ("fields", schema.field_count().to_string().as_str()),
                ("schema", schema.name()),
                ("version", schema.version()),
            ],
        );
        self.schemas.insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Loads and registers every `*.json` definition in `dir`.
    ///
    /// Files are read in name order and registered in dependency order, so
    /// nested definitions may live in any file. A missing directory holds
    /// no definitions.
    pub fn load_all(&mut self, dir: &Path) -> SchemaResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_definition(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_definition(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut pending = Vec::with_capacity(paths.len());
        for path in &paths {
            pending.push(read_definition(path)?);
        }

        let loaded = pending.len();
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for definition in pending {
                if definition
                    .record_refs()
                    .iter()
                    .all(|target| self.schemas.contains_key(*target))
                {
                    self.register(definition)?;
                } else {
                    deferred.push(definition);
                }
            }
            if deferred.len() == before {
                // No progress: surfaces the unresolved reference
                let definition = deferred.remove(0);
                self.register(definition)?;
            }
            pending = deferred;
        }

        log_event_with_fields(
            Event::SchemaLoaded,
            &[
                ("dir", dir.display().to_string().as_str()),
                ("schemas", loaded.to_string().as_str()),
            ],
        );
        Ok(loaded)
    }

    /// Writes a definition to `dir` as `schema_<name>_<version>.json`.
    ///
    /// Existing files are never overwritten.
    pub fn save_definition(&self, dir: &Path, definition: &SchemaDefinition) -> SchemaResult<PathBuf> {
        let filename = format!("schema_{}_{}.json", definition.name, definition.version);
        let path = dir.join(&filename);

        if path.exists() {
            return Err(SchemaError::schema_immutable(&definition.name));
        }

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                SchemaError::malformed_definition(
                    dir.display().to_string(),
                    format!("Failed to create schema directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(definition).map_err(|e| {
            SchemaError::malformed_definition(
                path.display().to_string(),
                format!("Failed to serialize definition: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_definition(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }

    /// Gets a schema by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Gets a schema by name or fails with `UnknownSchema`.
    pub fn require(&self, name: &str) -> SchemaResult<Arc<Schema>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| SchemaError::unknown_schema(name))
    }

    /// Checks if a schema exists.
    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns all schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn read_definition(path: &Path) -> SchemaResult<SchemaDefinition> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::malformed_definition(path.display().to_string(), format!("Failed to read file: {}", e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        SchemaError::malformed_definition(path.display().to_string(), format!("Invalid JSON: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType, SchemaErrorCode};
    use crate::value::Value;
    use tempfile::TempDir;

    fn inner_definition() -> SchemaDefinition {
        SchemaDefinition::new("Inner")
            .field("e", FieldDef::required_int())
            .field("f", FieldDef::optional_int())
            .field("g", FieldDef::optional_string().elidable())
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SchemaRegistry::new();
        registry.register(inner_definition()).unwrap();

        let schema = registry.get("Inner");
        assert!(schema.is_some());
        assert_eq!(schema.unwrap().name(), "Inner");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = SchemaRegistry::new();
        let first = registry.register(inner_definition()).unwrap();
        let second = registry.register(inner_definition()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_schema_immutability() {
        let mut registry = SchemaRegistry::new();
        registry.register(inner_definition()).unwrap();

        let changed = inner_definition().field("h", FieldDef::optional_int());
        let result = registry.register(changed);
        assert_eq!(result.unwrap_err().code(), SchemaErrorCode::SchemaImmutable);
    }

    #[test]
    fn test_nested_reference_must_be_registered_first() {
        let mut registry = SchemaRegistry::new();
        let outer = SchemaDefinition::new("Outer").field("d", FieldDef::required_record("Inner"));

        let err = registry.register(outer.clone()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownRecordType);

        registry.register(inner_definition()).unwrap();
        let schema = registry.register(outer).unwrap();
        assert!(schema.linked("Inner").is_some());
    }

    #[test]
    fn test_default_is_stored_canonical() {
        let schema = Schema::register(SchemaDefinition::new("DefaultModel").field(
            "c",
            FieldDef::optional_array(FieldType::String)
                .elidable()
                .with_default(vec![1, 2, 3]),
        ))
        .unwrap();

        assert_eq!(
            schema.field("c").unwrap().default,
            Some(Value::from(vec!["1", "2", "3"]))
        );
    }

    #[test]
    fn test_uncoercible_default_rejected() {
        let err = Schema::register(SchemaDefinition::new("DefaultModel").field(
            "c",
            FieldDef::optional_array(FieldType::String)
                .elidable()
                .with_default(vec![Value::Null, Value::Int(1)]),
        ))
        .unwrap_err();

        assert_eq!(err.code(), SchemaErrorCode::InvalidDefault);
        assert_eq!(err.details().unwrap().field, "c[0]");
    }

    #[test]
    fn test_elidable_default_on_non_nullable_rejected() {
        let err = Schema::register(
            SchemaDefinition::new("M").field("x", FieldDef::required_int().elidable().with_default(3)),
        )
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ElideNonNullable);
    }

    #[test]
    fn test_plain_default_on_non_nullable_allowed() {
        let schema = Schema::register(
            SchemaDefinition::new("M").field("x", FieldDef::required_int().with_default("3")),
        )
        .unwrap();
        assert_eq!(schema.field("x").unwrap().default, Some(Value::Int(3)));
        assert!(!schema.field("x").unwrap().is_required());
    }

    #[test]
    fn test_require_unknown_schema() {
        let registry = SchemaRegistry::new();
        let err = registry.require("nonexistent").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownSchema);
    }

    #[test]
    fn test_save_and_load_in_dependency_order() {
        let temp_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::new();

        // "Alpha" sorts before "Inner" but depends on it
        let alpha = SchemaDefinition::new("Alpha").field("d", FieldDef::required_record("Inner"));
        registry.save_definition(temp_dir.path(), &alpha).unwrap();
        registry.save_definition(temp_dir.path(), &inner_definition()).unwrap();

        let mut loaded = SchemaRegistry::new();
        assert_eq!(loaded.load_all(temp_dir.path()).unwrap(), 2);
        assert!(loaded.exists("Alpha"));
        assert!(loaded.exists("Inner"));
    }

    #[test]
    fn test_save_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::new();
        registry.save_definition(temp_dir.path(), &inner_definition()).unwrap();
        let err = registry
            .save_definition(temp_dir.path(), &inner_definition())
            .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::SchemaImmutable);
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = SchemaRegistry::new();
        let loaded = registry.load_all(&temp_dir.path().join("absent")).unwrap();
        assert_eq!(loaded, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_unresolvable_reference_fails() {
        let temp_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::new();
        let orphan = SchemaDefinition::new("Orphan").field("d", FieldDef::required_record("Missing"));
        registry.save_definition(temp_dir.path(), &orphan).unwrap();

        let mut loaded = SchemaRegistry::new();
        let err = loaded.load_all(temp_dir.path()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownRecordType);
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let mut registry = SchemaRegistry::new();
        let err = registry.load_all(temp_dir.path()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedDefinition);
        assert!(err.is_fatal());
    }
}
