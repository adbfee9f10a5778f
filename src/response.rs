// src/response.rs
//
// Mock response object. Every framework response method is classified once in
// `ResponseMethod::kind`; the typed helpers all funnel through `Response::call`.

use eyre::{eyre, Result};
use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::cfg::CallbackConvention;
use crate::completion::{Callback, Settlement};

/// The response methods a handler may call, spelled as the framework spells them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseMethod {
    Append,
    Attachment,
    Cookie,
    ClearCookie,
    Format,
    Get,
    Json,
    Jsonp,
    Download,
    End,
    Links,
    Location,
    Redirect,
    Render,
    Send,
    SendFile,
    SendStatus,
    Set,
    Status,
    Type,
    Vary,
}

/// What calling a response method does to the dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Settles the dispatch with this tag.
    Captured(&'static str),
    /// Not asserted on: logs an advisory and returns the stub.
    ChainableNoop,
    /// Returns the stub, ignoring its arguments.
    StatusChain,
}

impl ResponseMethod {
    pub const ALL: [ResponseMethod; 21] = [
        ResponseMethod::Append,
        ResponseMethod::Attachment,
        ResponseMethod::Cookie,
        ResponseMethod::ClearCookie,
        ResponseMethod::Format,
        ResponseMethod::Get,
        ResponseMethod::Json,
        ResponseMethod::Jsonp,
        ResponseMethod::Download,
        ResponseMethod::End,
        ResponseMethod::Links,
        ResponseMethod::Location,
        ResponseMethod::Redirect,
        ResponseMethod::Render,
        ResponseMethod::Send,
        ResponseMethod::SendFile,
        ResponseMethod::SendStatus,
        ResponseMethod::Set,
        ResponseMethod::Status,
        ResponseMethod::Type,
        ResponseMethod::Vary,
    ];

    pub fn kind(&self) -> MethodKind {
        use MethodKind::*;
        match self {
            // format negotiates, and the stub always reports it as jsonp
            ResponseMethod::Format => Captured("jsonp"),
            ResponseMethod::Json => Captured("json"),
            ResponseMethod::Jsonp => Captured("jsonp"),
            ResponseMethod::Download => Captured("download"),
            ResponseMethod::End => Captured("end"),
            ResponseMethod::Location => Captured("location"),
            ResponseMethod::Redirect => Captured("redirect"),
            ResponseMethod::Render => Captured("render"),
            ResponseMethod::Send => Captured("send"),
            ResponseMethod::SendFile => Captured("sendFile"),
            ResponseMethod::SendStatus => Captured("sendStatus"),
            ResponseMethod::Append
            | ResponseMethod::Attachment
            | ResponseMethod::Cookie
            | ResponseMethod::ClearCookie
            | ResponseMethod::Get
            | ResponseMethod::Links
            | ResponseMethod::Set
            | ResponseMethod::Type
            | ResponseMethod::Vary => ChainableNoop,
            ResponseMethod::Status => StatusChain,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseMethod::Append => "append",
            ResponseMethod::Attachment => "attachment",
            ResponseMethod::Cookie => "cookie",
            ResponseMethod::ClearCookie => "clearCookie",
            ResponseMethod::Format => "format",
            ResponseMethod::Get => "get",
            ResponseMethod::Json => "json",
            ResponseMethod::Jsonp => "jsonp",
            ResponseMethod::Download => "download",
            ResponseMethod::End => "end",
            ResponseMethod::Links => "links",
            ResponseMethod::Location => "location",
            ResponseMethod::Redirect => "redirect",
            ResponseMethod::Render => "render",
            ResponseMethod::Send => "send",
            ResponseMethod::SendFile => "sendFile",
            ResponseMethod::SendStatus => "sendStatus",
            ResponseMethod::Set => "set",
            ResponseMethod::Status => "status",
            ResponseMethod::Type => "type",
            ResponseMethod::Vary => "vary",
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self.kind(), MethodKind::Captured(_))
    }
}

impl fmt::Display for ResponseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResponseMethod {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        serde_plain::from_str(s).map_err(|e| {
            error!("Unknown response method '{}': {}", s, e);
            eyre!("Unknown response method '{}'", s)
        })
    }
}

/// Stand-in for a framework response, created fresh for each dispatch.
pub struct Response {
    settlement: Settlement,
    advised: Vec<ResponseMethod>,
    seen: HashSet<ResponseMethod>,
}

impl Response {
    pub fn new(settlement: Settlement) -> Self {
        Self {
            settlement,
            advised: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// A response bound directly to a completion callback.
    pub fn with_callback(convention: CallbackConvention, callback: Callback) -> Self {
        Self::new(Settlement::new(convention, callback))
    }

    /// A response whose captured calls settle nothing observable.
    pub fn detached(convention: CallbackConvention) -> Self {
        Self::new(Settlement::detached(convention))
    }

    pub fn settlement(&self) -> &Settlement {
        &self.settlement
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_settled()
    }

    /// Chainable methods invoked so far, in first-call order.
    pub fn advisories(&self) -> &[ResponseMethod] {
        &self.advised
    }

    /// Invoke `method` with `args`, as a handler would.
    pub fn call(&mut self, method: ResponseMethod, args: Vec<Value>) -> &mut Self {
        match method.kind() {
            MethodKind::Captured(tag) => {
                self.settlement.respond(method, tag, args);
            }
            MethodKind::ChainableNoop => {
                if self.seen.insert(method) {
                    warn!(
                        "The method \"{}\" isn't asserted on by the controller harness, so it won't be tested",
                        method
                    );
                    self.advised.push(method);
                }
            }
            MethodKind::StatusChain => {
                debug!("Ignoring {} call with {} argument(s)", method, args.len());
            }
        }
        self
    }

    /// Invoke a method by its framework name.
    pub fn call_named(&mut self, name: &str, args: Vec<Value>) -> Result<&mut Self> {
        let method: ResponseMethod = name.parse()?;
        Ok(self.call(method, args))
    }

    // ===== Status chain =====

    pub fn status(&mut self, code: u16) -> &mut Self {
        self.call(ResponseMethod::Status, vec![Value::from(code)])
    }

    // ===== Captured =====

    pub fn format(&mut self, handlers: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Format, vec![handlers.into()])
    }

    pub fn json(&mut self, body: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Json, vec![body.into()])
    }

    pub fn jsonp(&mut self, body: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Jsonp, vec![body.into()])
    }

    pub fn download(&mut self, path: &str) -> &mut Self {
        self.call(ResponseMethod::Download, vec![Value::from(path)])
    }

    pub fn end(&mut self) -> &mut Self {
        self.call(ResponseMethod::End, Vec::new())
    }

    /// `res.end(data)`
    pub fn end_with(&mut self, data: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::End, vec![data.into()])
    }

    pub fn location(&mut self, path: &str) -> &mut Self {
        self.call(ResponseMethod::Location, vec![Value::from(path)])
    }

    pub fn redirect(&mut self, url: &str) -> &mut Self {
        self.call(ResponseMethod::Redirect, vec![Value::from(url)])
    }

    pub fn redirect_with_status(&mut self, status: u16, url: &str) -> &mut Self {
        self.call(ResponseMethod::Redirect, vec![Value::from(status), Value::from(url)])
    }

    pub fn render(&mut self, view: &str, locals: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Render, vec![Value::from(view), locals.into()])
    }

    pub fn send(&mut self, body: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Send, vec![body.into()])
    }

    pub fn send_file(&mut self, path: &str) -> &mut Self {
        self.call(ResponseMethod::SendFile, vec![Value::from(path)])
    }

    pub fn send_status(&mut self, code: u16) -> &mut Self {
        self.call(ResponseMethod::SendStatus, vec![Value::from(code)])
    }

    // ===== Chainable no-ops =====

    pub fn append(&mut self, field: &str, value: &str) -> &mut Self {
        self.call(ResponseMethod::Append, vec![Value::from(field), Value::from(value)])
    }

    pub fn attachment(&mut self, filename: &str) -> &mut Self {
        self.call(ResponseMethod::Attachment, vec![Value::from(filename)])
    }

    pub fn cookie(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Cookie, vec![Value::from(name), value.into()])
    }

    pub fn clear_cookie(&mut self, name: &str) -> &mut Self {
        self.call(ResponseMethod::ClearCookie, vec![Value::from(name)])
    }

    pub fn get(&mut self, field: &str) -> &mut Self {
        self.call(ResponseMethod::Get, vec![Value::from(field)])
    }

    pub fn links(&mut self, links: impl Into<Value>) -> &mut Self {
        self.call(ResponseMethod::Links, vec![links.into()])
    }

    pub fn set(&mut self, field: &str, value: &str) -> &mut Self {
        self.call(ResponseMethod::Set, vec![Value::from(field), Value::from(value)])
    }

    /// `res.type(...)`; renamed since `type` is reserved.
    pub fn content_type(&mut self, mime: &str) -> &mut Self {
        self.call(ResponseMethod::Type, vec![Value::from(mime)])
    }

    pub fn vary(&mut self, field: &str) -> &mut Self {
        self.call(ResponseMethod::Vary, vec![Value::from(field)])
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("settled", &self.is_settled())
            .field("advised", &self.advised)
            .finish()
    }
}
