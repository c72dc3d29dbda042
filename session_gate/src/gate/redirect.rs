use http::header::{ACCEPT_RANGES, CONTENT_LENGTH, ETAG, LAST_MODIFIED, LOCATION};
use http::{HeaderValue, Response, StatusCode, Version};

use crate::errors::GateError;

/// 302 for HTTP/1.0 and older clients, 307 for everything newer.
pub fn redirect_status(version: Version) -> StatusCode {
    if version == Version::HTTP_09 || version == Version::HTTP_10 {
        StatusCode::FOUND
    } else {
        StatusCode::TEMPORARY_REDIRECT
    }
}

/// Turn `response` into a redirect to `location`.
///
/// Sets the status and `Location`, and drops the representation headers
/// (`Accept-Ranges`, `Last-Modified`, `Content-Length`, `ETag`) so caches do not
/// mistake the redirect for the protected resource.
pub fn apply_redirect<B>(
    response: &mut Response<B>,
    status: StatusCode,
    location: &str,
) -> Result<(), GateError> {
    let location = HeaderValue::from_str(location).map_err(|e| {
        GateError::HeaderError(format!("Invalid redirect target '{location}': {e}"))
    })?;

    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(LOCATION, location);
    for name in [ACCEPT_RANGES, LAST_MODIFIED, CONTENT_LENGTH, ETAG] {
        headers.remove(name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_status_by_version() {
        assert_eq!(redirect_status(Version::HTTP_09), StatusCode::FOUND);
        assert_eq!(redirect_status(Version::HTTP_10), StatusCode::FOUND);
        assert_eq!(
            redirect_status(Version::HTTP_11),
            StatusCode::TEMPORARY_REDIRECT
        );
        assert_eq!(
            redirect_status(Version::HTTP_2),
            StatusCode::TEMPORARY_REDIRECT
        );
        assert_eq!(
            redirect_status(Version::HTTP_3),
            StatusCode::TEMPORARY_REDIRECT
        );
    }

    #[test]
    fn test_apply_redirect_sets_location_and_clears_cache_headers() {
        let mut response = Response::builder()
            .status(StatusCode::OK)
            .header(ACCEPT_RANGES, "bytes")
            .header(LAST_MODIFIED, "Wed, 21 Oct 2015 07:28:00 GMT")
            .header(CONTENT_LENGTH, "1234")
            .header(ETAG, "\"33a64df5\"")
            .header("X-Request-Id", "keep-me")
            .body(())
            .unwrap();

        apply_redirect(&mut response, StatusCode::TEMPORARY_REDIRECT, "/auth").unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/auth");
        assert!(response.headers().get(ACCEPT_RANGES).is_none());
        assert!(response.headers().get(LAST_MODIFIED).is_none());
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
        assert!(response.headers().get(ETAG).is_none());
        assert_eq!(response.headers()["X-Request-Id"], "keep-me");
    }

    #[test]
    fn test_apply_redirect_absolute_target() {
        let mut response = Response::new(());
        apply_redirect(
            &mut response,
            StatusCode::FOUND,
            "https://login.example.com/?next=%2Fadmin",
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "https://login.example.com/?next=%2Fadmin"
        );
    }

    #[test]
    fn test_apply_redirect_rejects_unrepresentable_target() {
        let mut response = Response::new(());
        let result = apply_redirect(&mut response, StatusCode::FOUND, "/auth\r\nSet-Cookie: x=1");

        assert!(matches!(result, Err(GateError::HeaderError(_))));
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(LOCATION).is_none());
    }
}
