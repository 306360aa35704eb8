//! Form validation for listings and messages.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entities::{ListingDraft, ListingForm};
use bienes_auth::FieldError;

pub const MAX_DESCRIPTION_LEN: usize = 300;
pub const MIN_MESSAGE_LEN: usize = 10;

static PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]*$").expect("page pattern is valid"));

/// Parse the `pagina` query value. Anything but a positive integer is `None`.
pub fn parse_page(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    if !PAGE_RE.is_match(raw) {
        return None;
    }
    raw.parse().ok()
}

pub fn validate_listing_form(form: &ListingForm) -> Result<ListingDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let titulo = form.titulo.trim();
    if titulo.is_empty() {
        errors.push(FieldError::new("titulo", "El Titulo del anuncio es obligatorio."));
    }

    let descripcion = form.descripcion.trim();
    if descripcion.is_empty() {
        errors.push(FieldError::new("descripcion", "La descripcion no puede ir vacia."));
    } else if descripcion.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(FieldError::new("descripcion", "La descripcion es muy larga."));
    }

    let categoria_id = reference(&form.categoria, "categoria", "Seleccione una categoria", &mut errors);
    let precio_id = reference(&form.precio, "precio", "Seleccione un rango de precios", &mut errors);
    let habitaciones = count(
        &form.habitaciones,
        "habitaciones",
        "Seleccione la cantidad de habitaciones",
        &mut errors,
    );
    let estacionamiento = count(
        &form.estacionamiento,
        "estacionamiento",
        "Seleccione la cantidad de estacionamientos",
        &mut errors,
    );
    let wc = count(&form.wc, "wc", "Seleccione la cantidad de banios", &mut errors);

    let lat = form.lat.trim();
    let lng = form.lng.trim();
    if lat.is_empty() || lng.is_empty() {
        errors.push(FieldError::new("lat", "Ubica la propiedad en el mapa"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ListingDraft {
        titulo: titulo.to_owned(),
        descripcion: descripcion.to_owned(),
        categoria_id,
        precio_id,
        habitaciones,
        estacionamiento,
        wc,
        calle: form.calle.trim().to_owned(),
        lat: lat.to_owned(),
        lng: lng.to_owned(),
    })
}

/// Validate a message body, returning it trimmed.
pub fn validate_message(body: &str) -> Result<&str, FieldError> {
    let body = body.trim();
    if body.chars().count() < MIN_MESSAGE_LEN {
        return Err(FieldError::new(
            "mensaje",
            "El mensaje no puede ir vacio o es muy corto.",
        ));
    }
    Ok(body)
}

fn reference(raw: &str, field: &str, msg: &str, errors: &mut Vec<FieldError>) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => {
            errors.push(FieldError::new(field, msg));
            0
        }
    }
}

fn count(raw: &str, field: &str, msg: &str, errors: &mut Vec<FieldError>) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => value,
        _ => {
            errors.push(FieldError::new(field, msg));
            0
        }
    }
}
