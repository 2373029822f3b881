//! Repository port for value-table persistence.

use std::path::Path;

use crate::{Result, q_learning::SavedQTable};

/// Port for persisting and loading trained value tables.
///
/// # Examples
///
/// ```no_run
/// use mazebench::ports::QTableRepository;
/// use mazebench::q_learning::SavedQTable;
/// use std::path::Path;
///
/// fn save_table<R: QTableRepository>(
///     repo: &R,
///     saved: &SavedQTable,
///     path: &Path,
/// ) -> mazebench::Result<()> {
///     repo.save(saved, path)
/// }
/// ```
pub trait QTableRepository {
    /// Save a value table.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, saved: &SavedQTable, path: &Path) -> Result<()>;

    /// Load a value table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when nothing is stored at `path`, or
    /// a serialization error when the stored bytes are invalid.
    fn load(&self, path: &Path) -> Result<SavedQTable>;
}
