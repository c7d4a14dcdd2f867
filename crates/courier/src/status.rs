//! Status code names.

use http::StatusCode;

/// Registered reason phrase for a status code.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    StatusCode::from_u16(code).ok()?.canonical_reason()
}

/// Status class of a code (`1` for 1xx through `5` for 5xx).
pub fn class(code: u16) -> Option<u8> {
    match code {
        100..=599 => Some((code / 100) as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(100), Some("Continue"));
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(307), Some("Temporary Redirect"));
        assert_eq!(reason_phrase(404), Some("Not Found"));
        assert_eq!(reason_phrase(599), None);
        assert_eq!(reason_phrase(42), None);
    }

    #[test]
    fn test_class() {
        assert_eq!(class(101), Some(1));
        assert_eq!(class(503), Some(5));
        assert_eq!(class(99), None);
    }
}
