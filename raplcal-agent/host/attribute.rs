//! Read-only attribute files grouped under one named object
//!
//! This is the host collaborator seen by the calibration core: an object is
//! created at startup, attributes are registered on it, each read fills a
//! page-sized buffer through the attribute's `show` callback, and the object
//! is torn down when the handle is dropped.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;

const FALLBACK_PAGE_SIZE: usize = 4096;

static PAGE_SIZE: Lazy<usize> = Lazy::new(|| {
    // SAFETY: sysconf has no preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size)
        .ok()
        .filter(|&s| s > 0)
        .unwrap_or(FALLBACK_PAGE_SIZE)
});

/// Size of the buffer handed to every `show` callback
pub fn page_size() -> usize {
    *PAGE_SIZE
}

type ShowFn = Box<dyn Fn(&mut [u8]) -> usize + Send + Sync>;

/// A read-only attribute: fills the buffer and returns the bytes written
pub struct Attribute {
    name: String,
    show: ShowFn,
}

impl Attribute {
    pub fn read_only<F>(name: impl Into<String>, show: F) -> Self
    where
        F: Fn(&mut [u8]) -> usize + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            show: Box::new(show),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute").field("name", &self.name).finish()
    }
}

/// Scoped handle on a named object and its attribute files
#[derive(Debug)]
pub struct AttributeGroup {
    name: String,
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeGroup {
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::info!("{}: init", name);
        Self {
            name,
            attributes: BTreeMap::new(),
        }
    }

    /// Register an attribute; a second attribute with the same name is refused
    pub fn add(&mut self, attribute: Attribute) -> bool {
        if self.attributes.contains_key(attribute.name()) {
            tracing::warn!(
                "{}: attribute {} already exists",
                self.name,
                attribute.name()
            );
            return false;
        }
        tracing::debug!("{}: created attribute {}", self.name, attribute.name());
        self.attributes.insert(attribute.name.clone(), attribute);
        true
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Invoke the `show` callback of `attribute`, `None` if it does not exist
    pub fn show(&self, attribute: &str, buf: &mut [u8]) -> Option<usize> {
        let attr = self.attributes.get(attribute)?;
        let written = (attr.show)(buf);
        Some(written.min(buf.len()))
    }

    /// Read an attribute into a fresh page-sized buffer
    pub fn read(&self, attribute: &str) -> Option<String> {
        let mut page = vec![0u8; page_size()];
        let len = self.show(attribute, &mut page)?;
        page.truncate(len);
        Some(String::from_utf8_lossy(&page).into_owned())
    }
}

impl Drop for AttributeGroup {
    fn drop(&mut self) {
        tracing::info!("{}: cleanup", self.name);
    }
}
