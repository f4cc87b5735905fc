//! Loading the handler set at startup.

use std::path::Path;

use super::EventHandlers;
use crate::commands::Commander;
use crate::error::Result;

/// Produces the handler set from the configured handler source.
///
/// The loader gets a [`Commander`] so handlers can send commands back to
/// the host. Closures with the matching signature implement this trait.
pub trait HandlerLoader {
    /// Load handlers from `path`.
    fn load(&self, path: &Path, commander: Commander) -> Result<Box<dyn EventHandlers>>;
}

impl<F> HandlerLoader for F
where
    F: Fn(&Path, Commander) -> Result<Box<dyn EventHandlers>>,
{
    fn load(&self, path: &Path, commander: Commander) -> Result<Box<dyn EventHandlers>> {
        (self)(path, commander)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use crate::writer::WriterHandle;

    struct Nothing;
    impl EventHandlers for Nothing {}

    #[test]
    fn test_closure_loader() {
        let loader = |path: &Path, _commander: Commander| -> Result<Box<dyn EventHandlers>> {
            if path.ends_with("app.rs") {
                Ok(Box::new(Nothing))
            } else {
                Err(SdkError::HandlerLoad(path.display().to_string()))
            }
        };

        let (writer, _rx) = WriterHandle::channel(4);
        let commander = Commander::new(writer);

        assert!(loader.load(Path::new("/srv/app.rs"), commander.clone()).is_ok());
        assert!(matches!(
            loader.load(Path::new("/srv/other.rs"), commander),
            Err(SdkError::HandlerLoad(_))
        ));
    }
}
