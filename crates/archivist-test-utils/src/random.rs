use archivist_core::IndexSource;

/// Index source replaying a fixed sequence, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedIndexSource {
    values: Vec<usize>,
    position: usize,
}

impl ScriptedIndexSource {
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// Number of indices drawn so far.
    pub fn draws(&self) -> usize {
        self.position
    }
}

impl IndexSource for ScriptedIndexSource {
    fn next_index(&mut self, len: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value % len.max(1)
    }
}
