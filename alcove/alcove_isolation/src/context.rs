//! Isolated contexts.
//!
//! An isolated context loads one module package. Type loads resolve against
//! the images the context already loaded, then against the rest of the
//! package, and only then against the host.
//!
//! Every image the context loads is kept as a unit that points back at the
//! context. That cycle keeps a live context reachable on its own; `unload`
//! breaks it by handing the units to the [`Reclaimer`], which releases them
//! on a later sweep. Whether the context is actually freed then depends on
//! nobody else still holding one of its types or instances.

use std::sync::{Arc, Weak};
use std::time::Instant;

use alcove_core::error::{Error, IsolationError, Result};
use alcove_core::{BoundaryId, ContextId, ModuleImage};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::host::HostContext;
use crate::loaded::{LoadContext, LoadedType};
use crate::package::ModulePackage;
use crate::reclaimer::Reclaimer;

/// The state of an isolated context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Loads are accepted.
    Active,

    /// `unload` was called; the context only waits to be reclaimed.
    Unloaded,
}

/// An image loaded into a context. Holds the context strongly.
struct LoadedUnit {
    image: Arc<ModuleImage>,
    _context: Arc<IsolatedContext>,
}

struct Lifecycle {
    state: ContextState,
    created_at: Instant,
    last_state_change: Instant,
}

/// An unloadable context for one module.
pub struct IsolatedContext {
    id: ContextId,
    name: String,
    me: Weak<IsolatedContext>,
    package: ModulePackage,
    host: Arc<HostContext>,
    reclaimer: Arc<Reclaimer>,
    units: Mutex<Vec<LoadedUnit>>,
    lifecycle: Mutex<Lifecycle>,
}

impl IsolatedContext {
    /// Create a context for `package`.
    ///
    /// Nothing is loaded yet; the package only becomes the context's private
    /// resolution set.
    pub fn create(
        package: ModulePackage,
        host: Arc<HostContext>,
        reclaimer: Arc<Reclaimer>,
    ) -> Arc<Self> {
        let id = ContextId::new();
        let name = format!("module_context-{}", id.short());
        info!(
            "Initializing resolver for package '{}' in context {}",
            package.entry(),
            name
        );

        let now = Instant::now();
        Arc::new_cyclic(|me| Self {
            id,
            name,
            me: me.clone(),
            package,
            host,
            reclaimer,
            units: Mutex::new(Vec::new()),
            lifecycle: Mutex::new(Lifecycle {
                state: ContextState::Active,
                created_at: now,
                last_state_change: now,
            }),
        })
    }

    /// The current state.
    pub fn state(&self) -> ContextState {
        self.lifecycle.lock().state
    }

    /// When the context was created.
    pub fn created_at(&self) -> Instant {
        self.lifecycle.lock().created_at
    }

    /// When the context last changed state.
    pub fn last_state_change(&self) -> Instant {
        self.lifecycle.lock().last_state_change
    }

    /// Names of the images loaded so far.
    pub fn loaded_images(&self) -> Vec<String> {
        self.units
            .lock()
            .iter()
            .map(|unit| unit.image.name().to_string())
            .collect()
    }

    /// Load the package's entry image.
    pub fn load_entry(&self) -> Result<()> {
        let entry = self.package.entry().to_string();
        self.load_image(&entry).map(|_| ())
    }

    /// Load a shipped image by name. Loading an image twice is a no-op.
    pub fn load_image(&self, image_name: &str) -> Result<Arc<ModuleImage>> {
        self.ensure_active()?;

        let mut units = self.units.lock();
        if let Some(unit) = units.iter().find(|unit| unit.image.name() == image_name) {
            return Ok(Arc::clone(&unit.image));
        }

        let image = self
            .package
            .image(image_name)
            .cloned()
            .ok_or_else(|| IsolationError::ImageNotFound(image_name.to_string()))?;
        let context = self.strong()?;

        info!("Loading image '{}' into context {}", image_name, self.name);
        self.host.registry().register(
            self.boundary(),
            image.types().iter().map(|t| t.name().to_string()),
        );
        units.push(LoadedUnit {
            image: Arc::clone(&image),
            _context: context,
        });
        Ok(image)
    }

    /// Load a type by name. See [`LoadContext::load_type`].
    pub fn load_capability_type(&self, type_name: &str) -> Result<Arc<LoadedType>> {
        self.load_type(type_name)
    }

    /// Signal that the context is no longer needed.
    ///
    /// Idempotent and infallible. The context's units go to the reclaimer;
    /// memory is released only on a later sweep, and only if nothing outside
    /// still references the context.
    pub fn unload(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.state == ContextState::Unloaded {
                debug!("Context {} already unloaded", self.name);
                return;
            }
            lifecycle.state = ContextState::Unloaded;
            lifecycle.last_state_change = Instant::now();
        }

        let units = std::mem::take(&mut *self.units.lock());
        info!(
            "Unloading context {} ({} images handed to the reclaimer)",
            self.name,
            units.len()
        );
        self.host.registry().unregister(self.boundary());
        self.reclaimer.defer(format!("units of {}", self.name), units);
    }

    /// Whether `unload` has been called.
    pub fn is_unloaded(&self) -> bool {
        self.state() == ContextState::Unloaded
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_unloaded() {
            return Err(IsolationError::ContextUnloaded(self.name.clone()).into());
        }
        Ok(())
    }

    fn strong(&self) -> Result<Arc<IsolatedContext>> {
        self.me
            .upgrade()
            .ok_or_else(|| Error::Runtime(format!("context {} is being dropped", self.name)))
    }

    fn bind(&self, image: &ModuleImage, type_name: &str) -> Result<Arc<LoadedType>> {
        let descriptor = image.find(type_name).cloned().ok_or_else(|| {
            IsolationError::ModuleTypeNotFound {
                type_name: type_name.to_string(),
                context: self.name.clone(),
            }
        })?;
        let owner: Arc<dyn LoadContext> = self.strong()?;
        Ok(LoadedType::new(owner, image.name(), descriptor))
    }
}

impl LoadContext for IsolatedContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn boundary(&self) -> BoundaryId {
        BoundaryId::Context(self.id)
    }

    fn load_type(&self, type_name: &str) -> Result<Arc<LoadedType>> {
        self.ensure_active()?;

        // Already loaded images first.
        let loaded = self
            .units
            .lock()
            .iter()
            .find(|unit| unit.image.defines(type_name))
            .map(|unit| Arc::clone(&unit.image));
        if let Some(image) = loaded {
            return self.bind(&image, type_name);
        }

        // Then the rest of the private package.
        if let Some(image) = self.package.find_defining(type_name) {
            let name = image.name().to_string();
            let image = self.load_image(&name)?;
            return self.bind(&image, type_name);
        }

        // Finally whatever the host has loaded.
        if self
            .host
            .registry()
            .defines(BoundaryId::Host, type_name)
        {
            debug!(
                "Context {} delegates type '{}' to the host",
                self.name, type_name
            );
            return self.host.load_type(type_name);
        }

        Err(IsolationError::ModuleTypeNotFound {
            type_name: type_name.to_string(),
            context: self.name.clone(),
        }
        .into())
    }
}

impl Drop for IsolatedContext {
    fn drop(&mut self) {
        debug!("Context {} reclaimed", self.name);
    }
}

impl std::fmt::Debug for IsolatedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsolatedContext")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("images", &self.loaded_images())
            .finish()
    }
}
