//! Callback address resolution.
//!
//! Computes the URL the remote execution context must invoke to deliver an
//! async result. The address must be reachable from wherever the script
//! actually runs: the same machine, the LAN, or a physical device on its
//! own network segment.

use std::net::{IpAddr, UdpSocket};

use url::Url;

use crate::error::{Error, Result};
use crate::session::SessionState;
use crate::transport::PageUrlSource;

/// Path the inbound callback endpoint is mounted on.
pub fn async_response_path(session_id: &str) -> String {
    format!("/wd/hub/session/{session_id}/receive_async_response")
}

/// Resolves the callback URL for an async script submission.
///
/// Defaults to the plain http callback endpoint. Upgrades to the https
/// endpoint only when the current page is https *and* the callback server
/// has published both https fields; the page-URL probe is best-effort and
/// any failure keeps the defaults. On a real device with no custom callback
/// address configured, the hostname is rewritten to this host's outbound IP
/// so the device can route back to us.
pub async fn resolve_callback_url(
    session: &SessionState,
    page: &dyn PageUrlSource,
    session_id: Option<&str>,
) -> Result<Url> {
    let config = session.config();
    let mut protocol = "http";
    let mut address = config.effective_callback_address().to_owned();
    let mut port = config.effective_callback_port();

    match page.current_url().await {
        Ok(current) => {
            let is_https = Url::parse(&current)
                .map(|url| url.scheme() == "https")
                .unwrap_or(false);
            if is_https {
                if let Some((https_address, https_port)) = session.https_callback() {
                    protocol = "https";
                    address = https_address;
                    port = https_port;
                }
            }
        }
        Err(err) => {
            tracing::debug!(
                target = "relay.resolver",
                error = %err,
                "could not read current page url, keeping http callback defaults"
            );
        }
    }

    let session_id = session_id.unwrap_or_else(|| session.session_id());
    let mut response_url = Url::parse(&format!(
        "{protocol}://{address}:{port}{}",
        async_response_path(session_id)
    ))?;

    if config.real_device {
        if response_url.host_str() == Some(config.address.as_str()) {
            tracing::debug!(
                target = "relay.resolver",
                "real device and no custom callback address set, rewriting callback host to local ip"
            );
            let ip = local_outbound_ip()?;
            response_url
                .set_host(Some(&ip.to_string()))
                .map_err(|err| Error::InvalidCallbackUrl(err.to_string()))?;
        } else {
            tracing::debug!(
                target = "relay.resolver",
                "custom callback address set, leaving as is"
            );
        }
    }

    tracing::debug!(target = "relay.resolver", url = %response_url, "resolved async response url");
    Ok(response_url)
}

/// This host's outbound interface address.
///
/// Connecting a UDP socket performs the routing lookup without sending any
/// traffic; the local address of the connected socket is the interface a
/// separate device can reach us on.
pub fn local_outbound_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.connect(("8.8.8.8", 80))?;
    Ok(socket.local_addr()?.ip())
}
