//! Model serializer seam

use std::path::Path;

/// Capability for persisting an opaque model object.
///
/// The engine never inspects model contents; it only hands the serializer
/// a destination path inside the experiment directory. Any type with these
/// two operations works, there is no required hierarchy.
///
/// Failures cross this seam as [`anyhow::Error`] and surface from the
/// session as [`Error::ModelSerialization`](crate::Error::ModelSerialization).
pub trait ModelSerializer {
    /// The model type this serializer understands.
    type Model;

    /// Persist `model` at `path`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying format produces.
    fn save(&self, model: &Self::Model, path: &Path) -> anyhow::Result<()>;

    /// Load a model back from `path`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying format produces.
    fn load(&self, path: &Path) -> anyhow::Result<Self::Model>;
}
