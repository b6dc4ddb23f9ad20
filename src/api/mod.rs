//! REST client layer for the library server
//!
//! Every network call is described by an [`ApiRequest`] and executed by the
//! [`gateway::ApiGateway`], the only component that talks to the network.

pub mod endpoints;
pub mod gateway;
pub mod transport;

use reqwest::Method;
use serde::Serialize;

use crate::error::{ApiError, AppResult};

pub use gateway::ApiGateway;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Whether a request needs the bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// Description of one REST call, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
    pub access: Access,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>, access: Access) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            access,
        }
    }

    pub fn post(path: impl Into<String>, access: Access) -> Self {
        Self {
            method: Method::POST,
            ..Self::get(path, access)
        }
    }

    /// Append a query parameter
    pub fn query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize>(mut self, body: &B) -> AppResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Unknown(format!("Could not encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn requires_auth(&self) -> bool {
        self.access == Access::Authenticated
    }
}
