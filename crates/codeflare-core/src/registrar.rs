//! Feature-module registration under a shared namespace.
//!
//! Each module receives a [`Registrar`] bound to the one process-wide
//! [`Registry`]. A module that fails part way is rolled back so it leaves no
//! partial registrations, and the remaining modules still install.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use crate::{
    error::RegistrationError,
    flags::FlagSchema,
    handler::Handler,
    registry::{RegistrationId, Registry},
};

/// Registration handle given to one feature module.
#[derive(Debug)]
pub struct Registrar<'a> {
    registry: &'a mut Registry,
    namespace: &'a str,
    registered: Vec<RegistrationId>,
}

impl<'a> Registrar<'a> {
    pub fn new(registry: &'a mut Registry, namespace: &'a str) -> Self {
        Self {
            registry,
            namespace,
            registered: Vec::new(),
        }
    }

    pub const fn namespace(&self) -> &str {
        self.namespace
    }

    /// Register `template` below the namespace, e.g. `"dashboard <dir>"`
    /// becomes `"codeflare dashboard <dir>"`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] as [`Registry::register`] does.
    pub fn listen(
        &mut self,
        template: &str,
        flags: FlagSchema,
        handler: Arc<dyn Handler>,
        help: impl Into<String>,
    ) -> Result<RegistrationId, RegistrationError> {
        let qualified = format!("{} {template}", self.namespace);
        self.listen_root(&qualified, flags, handler, help)
    }

    /// Register `template` verbatim, outside the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] as [`Registry::register`] does.
    pub fn listen_root(
        &mut self,
        template: &str,
        flags: FlagSchema,
        handler: Arc<dyn Handler>,
        help: impl Into<String>,
    ) -> Result<RegistrationId, RegistrationError> {
        let id = self.registry.register(template, flags, handler, help)?;
        self.registered.push(id);
        Ok(id)
    }

    fn rollback(self) -> usize {
        self.registered
            .into_iter()
            .filter(|&id| self.registry.unregister(id))
            .count()
    }
}

/// A unit of commands registered together.
pub trait FeatureModule {
    fn name(&self) -> &str;

    /// Register every command of this module.
    ///
    /// # Errors
    ///
    /// The first [`RegistrationError`] aborts this module only.
    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError>;
}

/// One module that could not be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFailure {
    pub module: String,
    pub error: RegistrationError,
}

/// Per-module outcome of [`install_modules`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub installed: Vec<String>,
    pub failures: Vec<ModuleFailure>,
}

impl StartupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Install every module into `registry` under `namespace`.
///
/// Never aborts: a failing module is rolled back, logged and reported, and
/// installation continues with the next one.
pub fn install_modules(
    registry: &mut Registry,
    namespace: &str,
    modules: &[Box<dyn FeatureModule>],
) -> StartupReport {
    let mut report = StartupReport::default();

    for module in modules {
        let mut registrar = Registrar::new(registry, namespace);
        match module.register(&mut registrar) {
            Ok(()) => {
                tracing::info!(module = module.name(), "installed feature module");
                report.installed.push(module.name().to_string());
            }
            Err(error) => {
                let removed = registrar.rollback();
                tracing::warn!(
                    module = module.name(),
                    error = %error,
                    rolled_back = removed,
                    "feature module failed to register"
                );
                report.failures.push(ModuleFailure {
                    module: module.name().to_string(),
                    error,
                });
            }
        }
    }

    report
}
