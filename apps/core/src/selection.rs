use crate::registry::FileRegistry;

/// Radio group name shared by every rendered file control.
pub const GROUP_NAME: &str = "All_Files";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    UnknownId(String),
    OutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "no file control with id '{id}'"),
            Self::OutOfRange { index, len } => {
                write!(f, "file index out of range: {index} (len={len})")
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Single-select group mirroring the registry. The checked control is tracked by
/// position so duplicate names stay independently selectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
    checked: Option<usize>,
}

impl Selection {
    pub fn from_registry(registry: &FileRegistry) -> Self {
        let mut selection = Self::default();
        selection.render(registry);
        selection
    }

    /// Replaces every control. Ids count down from the registry length, and the
    /// replaced controls come back unchecked.
    pub fn render(&mut self, registry: &FileRegistry) {
        let total = registry.len();
        self.entries = registry
            .list()
            .iter()
            .enumerate()
            .map(|(position, name)| SelectionEntry {
                id: format!("{name}{}", total - position),
                label: name.clone(),
            })
            .collect();
        self.checked = None;
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn select(&mut self, id: &str) -> Result<&SelectionEntry, SelectionError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| SelectionError::UnknownId(id.to_string()))?;
        self.select_index(index)
    }

    pub fn select_index(&mut self, index: usize) -> Result<&SelectionEntry, SelectionError> {
        if index >= self.entries.len() {
            return Err(SelectionError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        self.checked = Some(index);
        Ok(&self.entries[index])
    }

    pub fn checked_index(&self) -> Option<usize> {
        self.checked
    }

    pub fn get_selected(&self) -> Option<&str> {
        self.checked
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.label.as_str())
    }
}
