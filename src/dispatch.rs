// src/dispatch.rs
//
// The dispatch primitive: builds a Request, hands it to the handler under test
// together with a Response stub, and routes errors to an error hook.

use eyre::{Report, Result};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::rc::Rc;

use crate::cfg::CallbackConvention;
use crate::request::Request;
use crate::response::Response;

/// A controller (route handler) that can be exercised by the harness.
pub trait Controller {
    fn handle(&self, req: &Request, res: &mut Response, next: &mut Next) -> Result<()>;
}

impl<F> Controller for F
where
    F: Fn(&Request, &mut Response, &mut Next) -> Result<()>,
{
    fn handle(&self, req: &Request, res: &mut Response, next: &mut Next) -> Result<()> {
        self(req, res, next)
    }
}

type ErrorHook = Rc<dyn Fn(Report)>;

/// The handler's `next` continuation.
pub struct Next {
    on_error: Option<ErrorHook>,
    calls: usize,
}

impl Next {
    fn new(on_error: Option<ErrorHook>) -> Self {
        Self { on_error, calls: 0 }
    }

    /// Forward `err` to the error hook.
    pub fn fail(&mut self, err: impl Into<Report>) {
        self.calls += 1;
        let err = err.into();
        match &self.on_error {
            Some(hook) => hook(err),
            None => warn!("next(err) called with no error hook installed: {}", err),
        }
    }

    /// Continue without an error. There is no downstream handler, so nothing settles.
    pub fn pass(&mut self) {
        self.calls += 1;
        debug!("next() called without an error; no downstream handler to run");
    }

    /// How many times the handler called `next`.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

/// Builder that performs a single invocation of a controller.
pub struct Dispatch<'a, C: Controller + ?Sized> {
    controller: &'a C,
    request: Request,
    response: Option<Response>,
    on_error: Option<ErrorHook>,
}

impl<'a, C: Controller + ?Sized> Dispatch<'a, C> {
    pub fn new(controller: &'a C) -> Self {
        Self {
            controller,
            request: Request::new(),
            response: None,
            on_error: None,
        }
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.request.set_params(params);
        self
    }

    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.request.set_body(body);
        self
    }

    /// Copy extra top-level fields (e.g. `user`) onto the request.
    pub fn extend_req(mut self, fields: Map<String, Value>) -> Self {
        self.request.extend(fields);
        self
    }

    /// Use `response` as the handler's response object.
    pub fn extend_res(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    /// Install the hook receiving errors from `next.fail(..)` or a failed handler.
    pub fn err_next<F>(mut self, hook: F) -> Self
    where
        F: Fn(Report) + 'static,
    {
        self.on_error = Some(Rc::new(hook));
        self
    }

    /// Invoke the controller. Returns the response so callers can inspect it.
    pub fn end(self) -> Response {
        let Dispatch {
            controller,
            request,
            response,
            on_error,
        } = self;

        let mut res = response.unwrap_or_else(|| Response::detached(CallbackConvention::default()));
        let mut next = Next::new(on_error.clone());

        debug!(
            "Dispatching with {} param(s) and {} body field(s)",
            request.params().len(),
            request.body().len()
        );

        if let Err(err) = controller.handle(&request, &mut res, &mut next) {
            debug!("Handler returned an error: {}", err);
            match &on_error {
                Some(hook) => hook(err),
                None => warn!("Handler failed with no error hook installed: {}", err),
            }
        }

        res
    }
}
