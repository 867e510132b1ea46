//! Version identifier to codec registry.

use crate::codec::SectionCodec;
use crate::errors::RegistryError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builder for a [`VersionRegistry`].
///
/// Validation is deferred to [`build`](Self::build) so registrations can be
/// chained.
#[derive(Default)]
pub struct RegistryBuilder {
    codecs: Vec<Arc<dyn SectionCodec>>,
    current: Option<String>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a codec under its own version identifier.
    pub fn register(mut self, codec: Arc<dyn SectionCodec>) -> Self {
        self.codecs.push(codec);
        self
    }

    /// Designates the version used for export.
    pub fn current(mut self, version: impl Into<String>) -> Self {
        self.current = Some(version.into());
        self
    }

    /// Validates the registrations and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if:
    /// - Two codecs share a version identifier (bindings are strictly 1:1)
    /// - No current version was designated
    /// - The current version is not registered
    pub fn build(self) -> Result<VersionRegistry, RegistryError> {
        let mut index = HashMap::with_capacity(self.codecs.len());
        for (position, codec) in self.codecs.iter().enumerate() {
            let version = codec.version().to_string();
            if index.insert(version.clone(), position).is_some() {
                return Err(RegistryError::DuplicateVersion(version));
            }
        }

        let current_version = self.current.ok_or(RegistryError::MissingCurrent)?;
        let current = *index
            .get(&current_version)
            .ok_or(RegistryError::UnknownCurrent(current_version))?;

        Ok(VersionRegistry {
            codecs: self.codecs,
            index,
            current,
        })
    }
}

/// Immutable mapping from version identifier to [`SectionCodec`], plus the
/// designated current exporter.
///
/// Built once at start-up and shared (typically behind an [`Arc`]) by every
/// import and export call.
///
/// # Example
///
/// ```rust
/// use idp_data_core::{ImportError, SectionCodec, VersionRegistry};
/// use idp_data_stream::TokenReader;
/// use std::sync::Arc;
///
/// struct Discard(&'static str);
///
/// impl SectionCodec for Discard {
///     fn version(&self) -> &str {
///         self.0
///     }
///
///     fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
///         Ok(reader.skip_value()?)
///     }
/// }
///
/// let registry = VersionRegistry::builder()
///     .register(Arc::new(Discard("v1")))
///     .register(Arc::new(Discard("v2")))
///     .current("v2")
///     .build()?;
///
/// assert!(registry.importer("v1").is_some());
/// assert!(registry.importer("V1").is_none());
/// assert_eq!(registry.exporter().version(), "v2");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct VersionRegistry {
    codecs: Vec<Arc<dyn SectionCodec>>,
    index: HashMap<String, usize>,
    current: usize,
}

impl VersionRegistry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up the importer for a section name.
    ///
    /// Absence is an expected outcome; it sends the section down the skip path.
    pub fn importer(&self, name: &str) -> Option<&dyn SectionCodec> {
        self.index.get(name).map(|&i| self.codecs[i].as_ref())
    }

    /// Returns true if `name` is a registered version identifier.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the current exporter.
    pub fn exporter(&self) -> &dyn SectionCodec {
        self.codecs[self.current].as_ref()
    }

    /// Returns the identifier of the current exporter.
    pub fn current_version(&self) -> &str {
        self.exporter().version()
    }

    /// Iterates registered identifiers in registration order.
    pub fn versions(&self) -> impl Iterator<Item = &str> + '_ {
        self.codecs.iter().map(|codec| codec.version())
    }
}

impl fmt::Debug for VersionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionRegistry")
            .field("versions", &self.versions().collect::<Vec<_>>())
            .field("current", &self.current_version())
            .finish()
    }
}
