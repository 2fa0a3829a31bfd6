//! Defaults document binding.
//!
//! # Invariants
//! - At most one defaults document is bound at a time.
//! - A rejected bind leaves the previous binding untouched.

use crate::model::defaults::DefaultsDocument;
use crate::model::version::{DefaultsSchemaVersion, VersionSelector};
use crate::module::error::{DocumentKind, ModuleError, ModuleResult};

/// Zero-or-one defaults document for one module.
#[derive(Debug, Default)]
pub struct DefaultsBinding {
    current: Option<DefaultsDocument>,
}

impl DefaultsBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the binding after identity and schema checks.
    ///
    /// # Errors
    /// - `ModuleNameMismatch` when `doc` names another module.
    /// - `SchemaVersionMismatch` when `requested` conflicts with `doc`.
    pub fn bind(
        &mut self,
        module_name: &str,
        doc: DefaultsDocument,
        requested: VersionSelector<DefaultsSchemaVersion>,
    ) -> ModuleResult<DefaultsSchemaVersion> {
        if doc.module_name() != module_name {
            return Err(ModuleError::ModuleNameMismatch {
                document: DocumentKind::Defaults,
                expected: module_name.to_string(),
                found: doc.module_name().to_string(),
            });
        }

        let actual = doc.schema_version();
        let used = requested
            .resolve(actual)
            .map_err(|requested| ModuleError::SchemaVersionMismatch {
                document: DocumentKind::Defaults,
                requested: requested.as_u64(),
                actual: actual.as_u64(),
            })?;

        self.current = Some(doc);
        Ok(used)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn get(&self) -> Option<&DefaultsDocument> {
        self.current.as_ref()
    }
}
