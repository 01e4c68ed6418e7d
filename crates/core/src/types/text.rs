use crate::error::CoreError;

/// Text that is not empty once surrounding whitespace is ignored.
///
/// The original text is kept as supplied; only the blankness check trims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonBlank(String);

impl NonBlank {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonBlank {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(CoreError::BlankText);
        }
        Ok(NonBlank(value))
    }
}

impl TryFrom<&str> for NonBlank {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        NonBlank::try_from(value.to_string())
    }
}
