//! Sheet source port for locating and decoding answer-sheet images.

use crate::domain::SheetImage;
use crate::error::OmrError;

/// Port for loading answer sheets.
///
/// Listing is cheap; decoding happens in [`SheetSource::load`] so that each
/// batch worker decodes its own sheet.
pub trait SheetSource: Send + Sync {
    /// Names of the available sheets, in submission order.
    fn sheet_names(&self) -> Vec<String>;

    /// Decodes the sheet called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`OmrError::InvalidImage`] if the sheet cannot be read or decoded.
    fn load(&self, name: &str) -> Result<SheetImage, OmrError>;
}
