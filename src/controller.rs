// src/controller.rs
//
// Fluent harness for exercising a single controller invocation.

use log::{debug, warn};
use serde_json::Value;

use crate::cfg::{AuthMode, HarnessConfig};
use crate::completion::{Completion, Settlement};
use crate::dispatch::{Controller, Dispatch};
use crate::error::HarnessError;
use crate::request::{PendingRequest, BODY, PARAMS, USER};
use crate::response::Response;

/// Create a harness for `handler` with the default configuration.
pub fn test_controller<C: Controller>(handler: C) -> TestController<C> {
    TestController::new(handler)
}

/// Accumulates a synthetic request, then invokes the handler once.
pub struct TestController<C: Controller> {
    handler: C,
    request: PendingRequest,
    config: HarnessConfig,
    dispatched: bool,
}

impl<C: Controller> TestController<C> {
    pub fn new(handler: C) -> Self {
        Self::with_config(handler, HarnessConfig::default())
    }

    pub fn with_config(handler: C, config: HarnessConfig) -> Self {
        debug!("Creating controller harness with {:?}", config);
        Self {
            handler,
            request: PendingRequest::new(),
            config,
            dispatched: false,
        }
    }

    /// Fails with `MissingHandler` when no handler is supplied.
    pub fn try_new(handler: Option<C>) -> Result<Self, HarnessError> {
        handler.map(Self::new).ok_or(HarnessError::MissingHandler)
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The request accumulated so far.
    pub fn pending(&self) -> &PendingRequest {
        &self.request
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    // ===== Request configuration =====

    /// Merge `data` into the top level of the request.
    pub fn req(&mut self, data: Value) -> &mut Self {
        self.request.merge(data);
        self
    }

    /// Set authenticated-user data, merged or replaced per the auth mode.
    pub fn auth(&mut self, data: Value) -> &mut Self {
        match self.config.auth_mode {
            AuthMode::Merge => self.request.merge_section(USER, data),
            AuthMode::Replace => {
                let mut user = serde_json::Map::new();
                user.insert(AuthMode::REPLACE_KEY.to_string(), data);
                self.request.replace(USER, Value::Object(user));
            }
        }
        self
    }

    pub fn params(&mut self, data: Value) -> &mut Self {
        self.request.merge_section(PARAMS, data);
        self
    }

    pub fn body(&mut self, data: Value) -> &mut Self {
        self.request.merge_section(BODY, data);
        self
    }

    pub fn get(&mut self, data: Value) -> &mut Self {
        self.params(data)
    }

    pub fn delete(&mut self, data: Value) -> &mut Self {
        self.get(data)
    }

    pub fn post(&mut self, data: Value) -> &mut Self {
        self.body(data)
    }

    pub fn put(&mut self, data: Value) -> &mut Self {
        self.post(data)
    }

    // ===== Configure-and-dispatch =====

    pub fn get_end<F>(&mut self, data: Value, callback: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce(Completion) + 'static,
    {
        self.get(data).end(callback)
    }

    pub fn delete_end<F>(&mut self, data: Value, callback: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce(Completion) + 'static,
    {
        self.delete(data).end(callback)
    }

    pub fn post_end<F>(&mut self, data: Value, callback: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce(Completion) + 'static,
    {
        self.post(data).end(callback)
    }

    pub fn put_end<F>(&mut self, data: Value, callback: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce(Completion) + 'static,
    {
        self.put(data).end(callback)
    }

    // ===== Dispatch =====

    /// Invoke the handler once, delivering how it settled to `callback`.
    pub fn end<F>(&mut self, callback: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce(Completion) + 'static,
    {
        if self.dispatched {
            warn!("Refusing to dispatch the same harness twice");
            return Err(HarnessError::AlreadyDispatched);
        }
        self.dispatched = true;

        let settlement = Settlement::new(self.config.convention, Box::new(callback));
        let errors = settlement.clone();

        let res = Dispatch::new(&self.handler)
            .params(self.request.section_or_empty(PARAMS))
            .body(self.request.section_or_empty(BODY))
            .extend_req(self.request.as_map().clone())
            .extend_res(Response::new(settlement))
            .err_next(move |err| {
                errors.fail(err);
            })
            .end();

        if !res.is_settled() {
            warn!("Handler settled without responding or forwarding an error");
        }
        if !res.advisories().is_empty() {
            debug!("Untested response methods called: {:?}", res.advisories());
        }

        Ok(self)
    }

    /// `end` with a callback that ignores the completion.
    pub fn dispatch(&mut self) -> Result<&mut Self, HarnessError> {
        self.end(|_| {})
    }
}
