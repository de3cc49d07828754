//! HTTP status code classification.
//!
//! Pure range arithmetic on the standard status bands. Codes outside
//! 100..=599 belong to no class and have an empty reason phrase; nothing in
//! this module fails.

use http::StatusCode;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const ACCEPTED: u16 = 202;
pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const REQUEST_TIMEOUT: u16 = 408;
pub const CONFLICT: u16 = 409;
pub const UNPROCESSABLE_ENTITY: u16 = 422;
pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const NOT_IMPLEMENTED: u16 = 501;
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// Semantic band of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
}

/// Classify `code`, or `None` when it falls outside every standard band.
pub fn classify(code: u16) -> Option<StatusClass> {
    match code {
        100..=199 => Some(StatusClass::Informational),
        200..=299 => Some(StatusClass::Success),
        300..=399 => Some(StatusClass::Redirect),
        400..=499 => Some(StatusClass::ClientError),
        500..=599 => Some(StatusClass::ServerError),
        _ => None,
    }
}

pub fn is_informational(code: u16) -> bool {
    classify(code) == Some(StatusClass::Informational)
}

pub fn is_success(code: u16) -> bool {
    classify(code) == Some(StatusClass::Success)
}

pub fn is_redirect(code: u16) -> bool {
    classify(code) == Some(StatusClass::Redirect)
}

pub fn is_client_error(code: u16) -> bool {
    classify(code) == Some(StatusClass::ClientError)
}

pub fn is_server_error(code: u16) -> bool {
    classify(code) == Some(StatusClass::ServerError)
}

pub fn is_error(code: u16) -> bool {
    is_client_error(code) || is_server_error(code)
}

/// Canonical reason phrase for `code`, or `""` when the code is unknown.
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_class_for_every_standard_code() {
        for code in 100..=599u16 {
            let flags = [
                is_informational(code),
                is_success(code),
                is_redirect(code),
                is_client_error(code),
                is_server_error(code),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "code {code}");
            assert_eq!(
                is_error(code),
                is_client_error(code) || is_server_error(code),
                "code {code}"
            );
        }
    }

    #[test]
    fn band_edges() {
        assert!(is_client_error(404));
        assert!(!is_client_error(500));
        assert!(is_server_error(501));
        assert!(!is_server_error(404));
        assert!(is_redirect(301));
        assert!(!is_redirect(200));
        assert!(is_error(500));
        assert!(!is_error(200));
    }

    #[test]
    fn unknown_codes_have_no_class() {
        assert_eq!(classify(99), None);
        assert_eq!(classify(600), None);
        assert_eq!(classify(800), None);
        assert!(!is_error(800));
    }

    #[test]
    fn reason_phrases() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(422), "Unprocessable Entity");
        assert_eq!(reason_phrase(800), "");
        assert_eq!(reason_phrase(0), "");
    }
}
