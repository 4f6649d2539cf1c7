//! Per-test fixture
//!
//! A [`TestBed`] owns one injector whose root scope uses the configured
//! digest bound, with the mock transport installed as `$httpBackend` and
//! the mock timeout as `$timeout`. Dropping it (or calling
//! [`TestBed::teardown`]) discards every instance and override it made.

use std::rc::Rc;

use stk_application::{Injector, Instance, Invokable, Locals, Provider, RegistrySnapshot, Scope};
use stk_domain::constants::{HTTP_BACKEND, ROOT_SCOPE, TIMEOUT};
use stk_domain::error::Result;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::config::loader::validate_app_config;
use crate::timeout::MockTimeout;
use crate::transport::MockTransport;

/// Fresh injector plus mocks for a single test
#[derive(Debug)]
pub struct TestBed {
    injector: Injector,
    config: AppConfig,
}

impl TestBed {
    /// Build a test bed with the default configuration
    pub fn new(registry: RegistrySnapshot) -> Result<Self> {
        Self::with_config(registry, AppConfig::default())
    }

    /// Build a test bed from an explicit configuration
    pub fn with_config(registry: RegistrySnapshot, config: AppConfig) -> Result<Self> {
        validate_app_config(&config)?;
        let mut injector = Injector::with_digest_ttl(registry, config.digest.ttl);
        injector.override_provider(MockTransport::provider())?;
        injector.override_provider(MockTimeout::provider())?;
        debug!(ttl = config.digest.ttl, "Test bed ready");
        Ok(Self { injector, config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn injector(&mut self) -> &mut Injector {
        &mut self.injector
    }

    /// Shadow a provider for this test only
    pub fn override_provider(&mut self, provider: Provider) -> Result<&mut Self> {
        self.injector.override_provider(provider)?;
        Ok(self)
    }

    /// Shadow a provider with a value for this test only
    pub fn override_value<T: 'static>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<&mut Self> {
        self.injector.override_value(name, value)?;
        Ok(self)
    }

    pub fn get<T: 'static>(&mut self, name: &str) -> Result<Rc<T>> {
        self.injector.get(name)
    }

    pub fn invoke(&mut self, invokable: &Invokable, locals: &Locals) -> Result<Instance> {
        self.injector.invoke(invokable, locals)
    }

    pub fn root_scope(&mut self) -> Result<Rc<Scope>> {
        self.injector.get(ROOT_SCOPE)
    }

    pub fn http_backend(&mut self) -> Result<Rc<MockTransport>> {
        self.injector.get(HTTP_BACKEND)
    }

    pub fn timeout(&mut self) -> Result<Rc<MockTimeout>> {
        self.injector.get(TIMEOUT)
    }

    /// Verify the transport was fully exercised and destroy the scope tree
    ///
    /// The tree is destroyed even when verification fails.
    pub fn teardown(mut self) -> Result<()> {
        let verified = if self.injector.is_instantiated(HTTP_BACKEND) {
            self.http_backend().and_then(|backend| {
                backend.verify_no_outstanding_expectation()?;
                backend.verify_no_outstanding_request()
            })
        } else {
            Ok(())
        };
        if let Err(err) = &verified {
            warn!(error = %err, "Test bed torn down with outstanding work");
        }
        if self.injector.is_instantiated(ROOT_SCOPE) {
            self.root_scope()?.destroy();
        }
        verified
    }
}
