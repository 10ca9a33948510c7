//! Axum extractors for filtered request inputs
//!
//! `Filtered<T>` reads the query string and body of a request and hands the
//! handler a [`FilteredRequest`] bound to the filters `T` declares.
//! `Sanitized<T>` goes one step further and resolves `all()` up front.

use super::request::{FilteredRequest, input_map_from_pairs};
use super::sanitizer::InputSanitizer;
use super::{FieldFilters, FilterRegistry, InputMap};
use crate::core::error::{RequestError, SanitizeError};
use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request};
use axum::http::{Method, Uri, header};
use axum::Form;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Handlers (form requests) that declare input filters
///
/// ```rust,ignore
/// struct SignupForm;
///
/// impl FormFilters for SignupForm {
///     fn filters() -> Arc<FieldFilters> {
///         static FILTERS: OnceLock<Arc<FieldFilters>> = OnceLock::new();
///         FILTERS
///             .get_or_init(|| Arc::new(FieldFilters::new().field("email", "StringTrim")))
///             .clone()
///     }
/// }
/// ```
pub trait FormFilters: Send + Sync + 'static {
    /// The field filters for this form
    fn filters() -> Arc<FieldFilters>;

    /// Registry used to resolve filter names
    fn registry() -> Arc<FilterRegistry> {
        FilterRegistry::shared()
    }

    /// Sanitizer bound to this form's filters
    fn sanitizer() -> InputSanitizer {
        InputSanitizer::new(Self::registry(), Self::filters())
    }
}

/// Axum extractor giving lazy, filtered access to request inputs
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn signup(form: Filtered<SignupForm>) -> Result<Json<Value>, SanitizeError> {
///     let email = form.input(Some("email"), None)?;
///     Ok(Json(email))
/// }
/// ```
pub struct Filtered<T>(pub FilteredRequest, pub PhantomData<T>);

impl<T> Filtered<T> {
    pub fn new(request: FilteredRequest) -> Self {
        Self(request, PhantomData)
    }

    pub fn into_inner(self) -> FilteredRequest {
        self.0
    }
}

impl<T> std::ops::Deref for Filtered<T> {
    type Target = FilteredRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Filtered<T>
where
    S: Send + Sync,
    T: FormFilters,
{
    type Rejection = SanitizeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = read_query(req.uri())?;
        let body = read_body(req, state).await?;
        Ok(Filtered::new(FilteredRequest::new(body, query, T::sanitizer())))
    }
}

/// Axum extractor yielding the already-sanitized input map
///
/// Equivalent to extracting `Filtered<T>` and calling `all()`; a filter
/// failure rejects the request.
pub struct Sanitized<T>(pub InputMap, pub PhantomData<T>);

impl<T> Sanitized<T> {
    pub fn new(inputs: InputMap) -> Self {
        Self(inputs, PhantomData)
    }

    pub fn into_inner(self) -> InputMap {
        self.0
    }
}

impl<T> std::ops::Deref for Sanitized<T> {
    type Target = InputMap;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Sanitized<T>
where
    S: Send + Sync,
    T: FormFilters,
{
    type Rejection = SanitizeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Filtered(request, ..) = Filtered::<T>::from_request(req, state).await?;
        Ok(Sanitized::new(request.all()?))
    }
}

fn read_query(uri: &Uri) -> Result<InputMap, RequestError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|e| {
        RequestError::InvalidQuery {
            message: e.body_text(),
        }
    })?;
    Ok(input_map_from_pairs(pairs))
}

async fn read_body<S>(req: Request, state: &S) -> Result<InputMap, RequestError>
where
    S: Send + Sync,
{
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    // GET and HEAD forms are read from the query string by `Form`
    if content_type == "application/x-www-form-urlencoded"
        && req.method() != Method::GET
        && req.method() != Method::HEAD
    {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| RequestError::InvalidBody {
                message: e.body_text(),
            })?;
        return Ok(input_map_from_pairs(pairs));
    }

    let is_json = content_type == "application/json" || content_type.ends_with("+json");
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| RequestError::InvalidBody {
            message: e.body_text(),
        })?;

    if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(InputMap::new());
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RequestError::InvalidBody {
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(RequestError::InvalidBody {
            message: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
