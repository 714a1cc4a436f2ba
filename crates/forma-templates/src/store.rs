//! Template store - read-only lookup over the exercise catalog
//!
//! The store is bulk-loaded at session or catalog-refresh time and
//! treated as read-only for the rest of the session. Lookup failure is
//! recoverable: the caller falls back to rep counting without form
//! analysis.

use std::collections::HashMap;

use forma_core::{CoreError, CoreResult, ExerciseId};
use tracing::debug;

use crate::template::{Difficulty, Equipment, ExerciseTemplate, MuscleGroup};

/// Search filter; `None` fields match everything
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateFilter {
    pub muscle_group: Option<MuscleGroup>,
    pub equipment: Option<Equipment>,
    pub difficulty: Option<Difficulty>,
}

impl TemplateFilter {
    pub fn muscle_group(group: MuscleGroup) -> Self {
        TemplateFilter {
            muscle_group: Some(group),
            ..Default::default()
        }
    }

    fn matches(&self, template: &ExerciseTemplate) -> bool {
        self.muscle_group
            .map(|g| template.muscle_groups.contains(&g))
            .unwrap_or(true)
            && self
                .equipment
                .map(|e| template.equipment == e)
                .unwrap_or(true)
            && self
                .difficulty
                .map(|d| template.difficulty == d)
                .unwrap_or(true)
    }
}

/// Read-only exercise catalog
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: HashMap<ExerciseId, ExerciseTemplate>,
}

impl TemplateStore {
    pub fn new() -> Self {
        TemplateStore::default()
    }

    /// Insert a template, validating it first
    pub fn insert(&mut self, template: ExerciseTemplate) -> CoreResult<()> {
        template.validate()?;
        debug!(id = %template.id, name = %template.name, "template loaded");
        self.templates.insert(template.id, template);
        Ok(())
    }

    /// Lookup by exercise id
    pub fn get(&self, id: ExerciseId) -> CoreResult<&ExerciseTemplate> {
        self.templates.get(&id).ok_or(CoreError::TemplateNotFound(id))
    }

    /// Filtered search; every returned record satisfies all supplied
    /// filters. Results are ordered by id for determinism.
    pub fn search(&self, filter: TemplateFilter) -> Vec<&ExerciseTemplate> {
        let mut hits: Vec<&ExerciseTemplate> = self
            .templates
            .values()
            .filter(|t| filter.matches(t))
            .collect();
        hits.sort_by_key(|t| t.id);
        hits
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseTemplate> {
        self.templates.values()
    }
}
