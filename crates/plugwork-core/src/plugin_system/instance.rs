//! Plugin instances and their finalization state machine.
//!
//! Every active class gets exactly one [`PluginInstance`] per finalized API.
//! Finalization moves `NotStarted -> InProgress -> Done` under a per-instance
//! re-entrant lock, so concurrent callers run the hook once and a hook that
//! re-enters its own instance sees `InProgress` instead of recursing.
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::ReentrantMutex;

use crate::config::Env;
use crate::kernel::api::FinalizedApi;
use crate::kernel::error::Result;
use crate::plugin_system::class::PluginClass;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::{Metadata, PluginDeclaration};
use crate::plugin_system::traits::Plugin;

/// Finalization state of a plugin instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeState {
    NotStarted,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    state: FinalizeState,
    failed: bool,
}

impl Progress {
    const fn new() -> Self {
        Self {
            state: FinalizeState::NotStarted,
            failed: false,
        }
    }
}

/// Marks a running finalization as failed unless disarmed.
///
/// Held across the hook so that an unwinding hook leaves the instance failed
/// instead of looking like a finalization still in progress.
struct FailOnDrop<'a> {
    progress: &'a Cell<Progress>,
    class: &'a PluginClass,
    armed: bool,
}

impl<'a> FailOnDrop<'a> {
    fn new(progress: &'a Cell<Progress>, class: &'a PluginClass) -> Self {
        Self {
            progress,
            class,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FailOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.progress.set(Progress {
            state: FinalizeState::InProgress,
            failed: true,
        });
        if std::thread::panicking() {
            log::error!("Finalization of plugin {} panicked", self.class);
        }
    }
}

/// An attribute whose value is computed by the owning plugin's finalize hook.
///
/// Read it through [`PluginInstance::attr`] or [`FinalizeContext::attr`]; a
/// read before finalization triggers it. While the hook itself is running
/// the placeholder is returned instead.
pub struct FinalizeAttr<T> {
    name: &'static str,
    placeholder: T,
    value: OnceLock<T>,
}

impl<T> FinalizeAttr<T> {
    pub const fn new(name: &'static str, placeholder: T) -> Self {
        Self {
            name,
            placeholder,
            value: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn placeholder(&self) -> &T {
        &self.placeholder
    }

    /// Whether a real value has been assigned
    pub fn is_set(&self) -> bool {
        self.value.get().is_some()
    }

    fn get(&self) -> Option<&T> {
        self.value.get()
    }

    fn set(&self, value: T) -> std::result::Result<(), T> {
        self.value.set(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for FinalizeAttr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizeAttr")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .finish()
    }
}

/// The single instance of one active plugin class within a finalized API
pub struct PluginInstance {
    class: Arc<PluginClass>,
    metadata: Metadata,
    plugin: Box<dyn Plugin>,
    api: Weak<FinalizedApi>,
    env: Arc<Env>,
    finalize_lock: ReentrantMutex<Cell<Progress>>,
    locked: AtomicBool,
}

impl PluginInstance {
    pub(crate) fn new(declaration: &PluginDeclaration, api: Weak<FinalizedApi>, env: Arc<Env>) -> Self {
        Self {
            class: Arc::clone(&declaration.class),
            metadata: declaration.metadata.clone(),
            plugin: declaration.class.create(),
            api,
            env,
            finalize_lock: ReentrantMutex::new(Cell::new(Progress::new())),
            locked: AtomicBool::new(false),
        }
    }

    /// Run the finalize hook.
    ///
    /// Fails with `AlreadyFinalized` once done. A call made while the hook is
    /// already running on this thread returns immediately. A hook that returns
    /// an error or panics leaves the instance failed, and every later call
    /// gets `FinalizationFailed`.
    pub fn finalize(&self) -> Result<()> {
        let progress = self.finalize_lock.lock();
        let current = progress.get();
        match current.state {
            FinalizeState::Done => {
                return Err(PluginSystemError::AlreadyFinalized {
                    plugin: self.class.full_name(),
                }
                .into());
            }
            FinalizeState::InProgress if current.failed => {
                return Err(PluginSystemError::FinalizationFailed {
                    plugin: self.class.full_name(),
                }
                .into());
            }
            FinalizeState::InProgress => return Ok(()),
            FinalizeState::NotStarted => {}
        }

        progress.set(Progress {
            state: FinalizeState::InProgress,
            failed: false,
        });
        log::debug!("Finalizing plugin {}", self.class);

        let ctx = FinalizeContext { instance: self };
        let hook_guard = FailOnDrop::new(&progress, &self.class);
        if let Err(err) = self.plugin.on_finalize(&ctx) {
            drop(hook_guard);
            log::error!("Finalization of plugin {} failed: {}", self.class, err);
            return Err(err);
        }
        hook_guard.disarm();

        progress.set(Progress {
            state: FinalizeState::Done,
            failed: false,
        });
        if !self.env.mode().is_test() {
            self.locked.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// Finalize unless already done
    pub fn ensure_finalized(&self) -> Result<()> {
        let progress = self.finalize_lock.lock();
        if progress.get().state == FinalizeState::Done {
            return Ok(());
        }
        self.finalize()
    }

    pub fn state(&self) -> FinalizeState {
        self.finalize_lock.lock().get().state
    }

    pub fn is_finalized(&self) -> bool {
        self.state() == FinalizeState::Done
    }

    /// Whether attribute assignment is refused
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Read a finalize attribute, finalizing on first access.
    ///
    /// `attr` must belong to this instance's own plugin value. Finalization
    /// and error reporting apply to `self`, whatever plugin holds `attr`.
    pub fn attr<'a, T>(&'a self, attr: &'a FinalizeAttr<T>) -> Result<&'a T> {
        if let Some(value) = attr.get() {
            return Ok(value);
        }
        self.ensure_finalized()?;
        if let Some(value) = attr.get() {
            return Ok(value);
        }
        if self.state() == FinalizeState::InProgress {
            return Ok(attr.placeholder());
        }
        Err(PluginSystemError::UnsetFinalizedAttribute {
            attribute: attr.name().to_string(),
            plugin: self.class.full_name(),
        }
        .into())
    }

    /// Assign a finalize attribute from outside the hook.
    ///
    /// Refused once the instance is locked.
    pub fn assign<T>(&self, attr: &FinalizeAttr<T>, value: T) -> Result<()> {
        if self.is_locked() {
            return Err(PluginSystemError::PluginLocked {
                attribute: attr.name().to_string(),
                plugin: self.class.full_name(),
            }
            .into());
        }
        self.assign_unlocked(attr, value)
    }

    fn assign_unlocked<T>(&self, attr: &FinalizeAttr<T>, value: T) -> Result<()> {
        attr.set(value).map_err(|_| {
            PluginSystemError::AttributeAlreadySet {
                attribute: attr.name().to_string(),
                plugin: self.class.full_name(),
            }
            .into()
        })
    }

    /// Downcast the plugin value to its concrete type
    pub fn plugin<P: Plugin + 'static>(&self) -> Option<&P> {
        let plugin: &dyn Plugin = self.plugin.as_ref();
        plugin.as_any().downcast_ref::<P>()
    }

    pub fn class(&self) -> &Arc<PluginClass> {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn doc(&self) -> &str {
        self.class.doc()
    }

    /// First paragraph of the doc, or `<module.Name>` when undocumented
    pub fn summary(&self) -> String {
        let doc = self.class.doc().trim();
        match doc.split("\n\n").next().map(str::trim) {
            Some(first) if !first.is_empty() => first.to_string(),
            _ => format!("<{}>", self.class.full_name()),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The finalized API this instance belongs to, while it is alive
    pub fn api(&self) -> Option<Arc<FinalizedApi>> {
        self.api.upgrade()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }
}

impl fmt::Display for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.class.full_name())
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("class", &self.class)
            .field("state", &self.state())
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// What a finalize hook gets to see: its own instance and the frozen API
pub struct FinalizeContext<'a> {
    instance: &'a PluginInstance,
}

impl<'a> FinalizeContext<'a> {
    /// Publish the value of a finalize attribute
    pub fn assign<T>(&self, attr: &FinalizeAttr<T>, value: T) -> Result<()> {
        self.instance.assign_unlocked(attr, value)
    }

    /// Read one of this plugin's own finalize attributes. Unset attributes
    /// read as their placeholder.
    pub fn attr<'b, T>(&'b self, attr: &'b FinalizeAttr<T>) -> Result<&'b T> {
        self.instance.attr(attr)
    }

    pub fn instance(&self) -> &'a PluginInstance {
        self.instance
    }

    pub fn api(&self) -> Option<Arc<FinalizedApi>> {
        self.instance.api()
    }

    pub fn env(&self) -> &'a Env {
        self.instance.env()
    }
}
