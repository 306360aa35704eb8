//! JSON page payloads.
//!
//! A page carries its title (`pagina`), the CSRF token for any form on it,
//! field errors with the submitted values (`errores`, `datos`) and whatever
//! data the view needs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bienes_auth::FieldError;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::CsrfToken;

#[derive(Debug, Serialize)]
pub struct Page {
    #[serde(skip)]
    status: StatusCode,
    pagina: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    csrf_token: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errores: Vec<FieldError>,
    #[serde(skip_serializing_if = "Value::is_null")]
    datos: Value,
    #[serde(flatten)]
    data: Map<String, Value>,
}

impl Page {
    pub fn new(pagina: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            pagina: pagina.into(),
            csrf_token: None,
            errores: Vec::new(),
            datos: Value::Null,
            data: Map::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn csrf(mut self, token: &CsrfToken) -> Self {
        self.csrf_token = Some(token.0.clone());
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.data
            .insert(key.to_owned(), serde_json::to_value(value).unwrap_or_default());
        self
    }

    /// Attach field errors; the page is answered with 422.
    pub fn errors(mut self, errores: Vec<FieldError>) -> Self {
        self.errores = errores;
        self.status = StatusCode::UNPROCESSABLE_ENTITY;
        self
    }

    /// Echo the submitted values back to the form.
    pub fn datos(mut self, datos: impl Serialize) -> Self {
        self.datos = serde_json::to_value(datos).unwrap_or_default();
        self
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_serializes_flat() {
        let page = Page::new("Crear Propiedad")
            .csrf(&CsrfToken("abc".into()))
            .with("total", 3)
            .errors(vec![FieldError::new("titulo", "obligatorio")])
            .datos(serde_json::json!({ "titulo": "" }));

        assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["pagina"], "Crear Propiedad");
        assert_eq!(value["csrf_token"], "abc");
        assert_eq!(value["total"], 3);
        assert_eq!(value["errores"][0]["field"], "titulo");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn empty_sections_are_omitted() {
        let value = serde_json::to_value(Page::new("Inicio")).unwrap();
        assert!(value.get("errores").is_none());
        assert!(value.get("datos").is_none());
        assert!(value.get("csrf_token").is_none());
    }
}
