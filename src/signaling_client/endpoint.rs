use url::Url;

use crate::{protocol::types::PeerRole, signaling_client::signaling_client_error::SignalingClientError};

/// `<base>?roomId=..&token=..&role=..`
///
/// # Errors
///
/// [`SignalingClientError::InvalidEndpoint`] when `base` is not an absolute
/// `ws`/`wss` URL.
pub fn build_endpoint(
    base: &str,
    room_id: &str,
    token: &str,
    role: PeerRole,
) -> Result<Url, SignalingClientError> {
    let mut url = Url::parse(base).map_err(|e| SignalingClientError::InvalidEndpoint(format!("{base}: {e}")))?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(SignalingClientError::InvalidEndpoint(format!(
            "{base}: scheme must be ws or wss"
        )));
    }
    url.query_pairs_mut()
        .append_pair("roomId", room_id)
        .append_pair("token", token)
        .append_pair("role", role.as_str());
    Ok(url)
}
