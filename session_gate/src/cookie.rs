use http::HeaderMap;
use http::header::COOKIE;

use crate::storage::SessionToken;

/// Find the value of the first cookie called `name` across every `Cookie`
/// header line, in header order and then left to right within a line.
///
/// The value is returned exactly as sent: no unquoting and no percent-decoding.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a [u8]> {
    headers
        .get_all(COOKIE)
        .iter()
        .find_map(|line| find_in_line(line.as_bytes(), name.as_bytes()))
}

/// Same as [`find_cookie`], copied out as a [`SessionToken`].
pub fn extract_session_token(headers: &HeaderMap, name: &str) -> Option<SessionToken> {
    let value = find_cookie(headers, name);
    if value.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", name);
    }
    value.map(SessionToken::new)
}

fn find_in_line<'a>(line: &'a [u8], name: &[u8]) -> Option<&'a [u8]> {
    line.split(|&b| b == b';').find_map(|pair| {
        let pair = pair.trim_ascii();
        let eq = pair.iter().position(|&b| b == b'=')?;
        let (key, value) = pair.split_at(eq);
        (key.trim_ascii_end() == name).then(|| value[1..].trim_ascii_start())
    })
}
