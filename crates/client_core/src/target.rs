use std::sync::Mutex;

use crate::error::TargetError;

/// The multi-select the fetched options are written into.
pub trait OptionListTarget {
    /// Clears every existing option, then appends one option per entry in
    /// order. Value and label are both the entry.
    fn replace_options(&self, options: &[String]) -> Result<(), TargetError>;

    fn current_options(&self) -> Result<Vec<String>, TargetError>;
}

#[derive(Debug, Default)]
pub struct MemoryOptionList {
    options: Mutex<Vec<String>>,
}

impl MemoryOptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: Mutex::new(options.into_iter().map(Into::into).collect()),
        }
    }
}

impl OptionListTarget for MemoryOptionList {
    fn replace_options(&self, options: &[String]) -> Result<(), TargetError> {
        let mut current = self
            .options
            .lock()
            .map_err(|_| TargetError::new("option list lock poisoned"))?;
        current.clear();
        current.extend(options.iter().cloned());
        Ok(())
    }

    fn current_options(&self) -> Result<Vec<String>, TargetError> {
        self.options
            .lock()
            .map(|options| options.clone())
            .map_err(|_| TargetError::new("option list lock poisoned"))
    }
}

impl<T: OptionListTarget + ?Sized> OptionListTarget for &T {
    fn replace_options(&self, options: &[String]) -> Result<(), TargetError> {
        (**self).replace_options(options)
    }

    fn current_options(&self) -> Result<Vec<String>, TargetError> {
        (**self).current_options()
    }
}
