//! Label definition registry
//!
//! Immutable catalog of the label kinds a project allows, built once from the
//! project payload. Everything downstream resolves label names through this.

use std::collections::HashMap;

use crate::color::Rgb;
use crate::labels::{LabelDefinition, LabelKind, LabelScope};
use crate::schema::{DefinitionsPayload, SchemaError};

/// Name → definition catalog, immutable after project load.
#[derive(Debug, Clone)]
pub struct LabelDefinitionRegistry {
    definitions: Vec<LabelDefinition>,
    by_name: HashMap<String, usize>,
}

impl LabelDefinitionRegistry {
    /// Build the registry from the project payload, rejecting duplicate
    /// names and unparseable colors up front.
    pub fn from_payload(payload: DefinitionsPayload) -> Result<Self, SchemaError> {
        let mut by_name = HashMap::with_capacity(payload.label_definitions.len());
        for (i, def) in payload.label_definitions.iter().enumerate() {
            if Rgb::parse(&def.color).is_none() {
                return Err(SchemaError::InvalidColor {
                    name: def.name.clone(),
                    color: def.color.clone(),
                });
            }
            if by_name.insert(def.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateDefinition {
                    name: def.name.clone(),
                });
            }
        }
        Ok(Self {
            definitions: payload.label_definitions,
            by_name,
        })
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&LabelDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    /// Look up a definition, raising the schema error for unknown names.
    pub fn require(&self, name: &str) -> Result<&LabelDefinition, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownLabel {
            name: name.to_string(),
        })
    }

    /// All definitions in project order.
    pub fn definitions(&self) -> &[LabelDefinition] {
        &self.definitions
    }

    /// Definitions of a given scope, in project order.
    pub fn for_scope(&self, scope: LabelScope) -> impl Iterator<Item = &LabelDefinition> {
        self.definitions.iter().filter(move |d| d.scope == scope)
    }

    /// Names of the exclusive classification definitions sharing a scope.
    ///
    /// Activating one of these on a target displaces the others: they form
    /// the radio-button group for that scope.
    pub fn exclusive_group(&self, scope: LabelScope) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|d| d.scope == scope && d.kind == LabelKind::ClassificationSingle)
            .map(|d| d.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
