//! Template source loading from local disk, and the bridge that plugs the
//! resolver and loader into a minijinja [`Environment`].

use std::borrow::Cow;
use std::io;
use std::path::Path;
use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind};

use crate::resolver::TemplateResolver;

/// Read the full contents of `path`.
///
/// Missing files, unreadable files and directories all fail with the
/// underlying I/O error.
pub fn load(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path)
}

/// Resolve `name` as a top-level template and decode it as UTF-8.
///
/// `Ok(None)` means the file does not exist, which minijinja reports as
/// [`ErrorKind::TemplateNotFound`].
pub fn load_template(resolver: &TemplateResolver, name: &str) -> Result<Option<String>, Error> {
    let path = resolver.resolve(Path::new(""), name);
    let bytes = match load(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(name, path = %path.display(), "template source not found");
            return Ok(None);
        }
        Err(err) => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template {}", path.display()),
            )
            .with_source(err))
        }
    };

    tracing::debug!(name, path = %path.display(), bytes = bytes.len(), "loaded template source");
    String::from_utf8(bytes).map(Some).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("template {} is not valid UTF-8", path.display()),
        )
        .with_source(err)
    })
}

/// Install `resolver` as the environment's loader and path-join callback.
///
/// Includes, imports and `extends` are resolved relative to the including
/// template, so nested templates can refer to siblings by bare name.
pub fn install(env: &mut Environment<'static>, resolver: Arc<TemplateResolver>) {
    let join_resolver = Arc::clone(&resolver);
    env.set_path_join_callback(move |name, parent| {
        let joined = join_resolver.resolve(Path::new(parent), name);
        Cow::Owned(joined.to_string_lossy().into_owned())
    });
    env.set_loader(move |name| load_template(&resolver, name));
}
