//! Central schema registry for all Keel types.
//!
//! The `SchemaRegistry` builds JSON Schemas from keel-core types at construction
//! time using [`schemars::schema_for!`] and provides validation via `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;
use serde::de::DeserializeOwned;

use crate::error::SchemaError;

/// Central store of all JSON Schemas in Keel.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, schema_for!($ty).to_value());
    };
}

impl SchemaRegistry {
    /// Build a registry containing entity, import payload, response, and
    /// audit-detail schemas from keel-core.
    #[must_use]
    pub fn new() -> Self {
        use keel_core::{audit_detail, entities, responses};

        let mut schemas = HashMap::new();

        // --- Import / input payloads ---
        register!(schemas, "new_project", entities::NewProject);
        register!(schemas, "new_financial_record", entities::NewFinancialRecord);
        register!(schemas, "new_lead", entities::NewLead);
        register!(schemas, "new_team_member", entities::NewTeamMember);
        register!(schemas, "new_csat_entry", entities::NewCsatEntry);
        register!(schemas, "new_allocation", entities::NewAllocation);
        register!(schemas, "esat_submission", entities::EsatSubmission);

        // --- Entities ---
        register!(schemas, "project", entities::Project);
        register!(schemas, "financial_record", entities::FinancialRecord);
        register!(schemas, "lead", entities::Lead);
        register!(schemas, "team_member", entities::TeamMember);
        register!(schemas, "allocation", entities::Allocation);
        register!(schemas, "csat_entry", entities::CsatEntry);
        register!(schemas, "esat_survey", entities::EsatSurvey);
        register!(schemas, "esat_question", entities::EsatQuestion);
        register!(schemas, "daily_task", entities::DailyTask);
        register!(schemas, "document", entities::Document);
        register!(schemas, "document_version", entities::DocumentVersion);
        register!(schemas, "attachment", entities::Attachment);
        register!(schemas, "audit_entry", entities::AuditEntry);

        // --- Command responses ---
        register!(schemas, "dashboard", responses::Dashboard);
        register!(schemas, "import_report", responses::ImportReport);
        register!(
            schemas,
            "allocation_upsert_response",
            responses::AllocationUpsertResponse
        );

        // --- Audit details ---
        register!(
            schemas,
            "status_changed_detail",
            audit_detail::StatusChangedDetail
        );
        register!(
            schemas,
            "allocation_upsert_detail",
            audit_detail::AllocationUpsertDetail
        );

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate `instance` against `name`, then deserialize it.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::validate`], or `SchemaError::Deserialize`.
    pub fn parse<T: DeserializeOwned>(
        &self,
        name: &str,
        instance: serde_json::Value,
    ) -> Result<T, SchemaError> {
        self.validate(name, &instance)?;
        Ok(serde_json::from_value(instance)?)
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
