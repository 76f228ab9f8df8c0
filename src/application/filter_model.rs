use crate::domain::filters::{FilterField, FilterState, UnknownFilterField};

/// Two-phase filter input: edits land in the draft, queries only ever see
/// the committed snapshot.
#[derive(Debug, Clone, Default)]
pub struct FilterStateModel {
    draft: FilterState,
    committed: FilterState,
}

impl FilterStateModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &FilterState {
        &self.draft
    }

    pub fn committed(&self) -> &FilterState {
        &self.committed
    }

    pub fn set_field(&mut self, field: FilterField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn set_field_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<FilterField, UnknownFilterField> {
        let field: FilterField = name.parse()?;
        self.set_field(field, value);
        Ok(field)
    }

    pub fn clear_draft(&mut self) {
        self.draft = FilterState::default();
    }

    pub fn has_pending_changes(&self) -> bool {
        self.draft != self.committed
    }

    /// Replaces the committed snapshot with the whole draft.
    pub fn commit(&mut self) -> FilterState {
        self.committed = self.draft.clone();
        self.committed.clone()
    }
}
