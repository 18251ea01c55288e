pub const DEFAULT_CAPACITY: usize = 8;

pub const SEED_FILES: [&str; 4] = [
    "Materials Selection Guidelines.pdf",
    "Emergency Shutdown OnOff valves Spec.pdf",
    "shell and Tube Heat Exchanger Specification.pdf",
    "file1.pdf",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    EmptyName,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "file name is required"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Bounded list of known file names, newest first. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRegistry {
    files: Vec<String>,
    capacity: usize,
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::seeded(DEFAULT_CAPACITY, &SEED_FILES)
    }
}

impl FileRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            files: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Seeds keep their given order, so `seeds[0]` ends up at the front.
    pub fn seeded<S: AsRef<str>>(capacity: usize, seeds: &[S]) -> Self {
        let mut registry = Self::with_capacity(capacity);
        let capacity = registry.capacity;
        registry.files.extend(
            seeds
                .iter()
                .map(|seed| seed.as_ref().trim())
                .filter(|seed| !seed.is_empty())
                .take(capacity)
                .map(str::to_string),
        );
        registry
    }

    pub fn add_file(&mut self, name: &str) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        self.files.insert(0, name.to_string());
        if self.files.len() > self.capacity {
            self.files.pop();
        }
        Ok(())
    }

    pub fn list(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Name component of an uploaded path; the contents are never read.
pub fn upload_file_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
