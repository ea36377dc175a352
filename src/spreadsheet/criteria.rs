use crate::error::BarcodeError;
use glob::Pattern;

/// Criteria for selecting data from a workbook.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name pattern; the first sheet is read when absent.
    pub(crate) sheet_name_pattern: Option<Pattern>,

    /// Treat error cells (`#N/A`, `#REF!`, ...) as empty instead of failing.
    pub(crate) error_as_null: bool,
}

impl Criteria {
    pub fn new(sheet_name_pattern: Option<&str>, error_as_null: bool) -> Result<Self, BarcodeError> {
        Ok(Criteria {
            sheet_name_pattern: sheet_name_pattern.map(Pattern::new).transpose()?,
            error_as_null,
        })
    }

    /// Checks if a sheet name matches the criteria pattern.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        self.sheet_name_pattern
            .as_ref()
            .map(|pattern| pattern.matches(sheet_name))
            .unwrap_or(true)
    }
}
