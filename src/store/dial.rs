use crate::config::StoreOptionsValidated;
use tokio::time::Instant;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, Endpoint};

/// `dial()` connects to the first reachable endpoint. Each round tries every endpoint once, each
/// attempt bounded by the minimum connect timeout; failed rounds back off with jitter. Gives up
/// when the dial timeout would elapse, returning the last round's failure per endpoint.
pub(crate) async fn dial(
    logger: &slog::Logger,
    endpoints: &[(String, Endpoint)],
    options: &StoreOptionsValidated,
) -> Result<Channel, Vec<String>> {
    let backoff = options.connect_backoff();
    let give_up_at = Instant::now() + options.dial_timeout;
    let mut failed_rounds = 0;

    loop {
        let mut failures = Vec::with_capacity(endpoints.len());
        for (address, endpoint) in endpoints {
            let now = Instant::now();
            if now >= give_up_at {
                failures.push(format!("{}: dial timeout elapsed", address));
                continue;
            }

            let attempt_timeout = options.min_connect_timeout.min(give_up_at - now);
            match tokio::time::timeout(attempt_timeout, endpoint.connect()).await {
                Ok(Ok(channel)) => {
                    slog::info!(logger, "Connected"; "endpoint" => address.as_str());
                    return Ok(channel);
                }
                Ok(Err(e)) => failures.push(format!("{}: {}", address, e)),
                Err(_) => failures.push(format!("{}: no connection within {:?}", address, attempt_timeout)),
            }
        }

        let delay = backoff.delay(failed_rounds);
        failed_rounds += 1;
        if Instant::now() + delay >= give_up_at {
            return Err(failures);
        }

        slog::warn!(
            logger,
            "No endpoint reachable, retrying";
            "round" => failed_rounds,
            "retry_in" => ?delay,
            "last_errors" => failures.join("; ")
        );
        tokio::time::sleep(delay).await;
    }
}

/// `parse_endpoint()` accepts `host:port` or a full URL; bare addresses are dialed over plain HTTP/2.
pub(crate) fn parse_endpoint(address: &str) -> Result<(String, Endpoint), uri::InvalidUri> {
    let url = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let endpoint = Endpoint::from_shared(url.clone())?;
    Ok((url, endpoint))
}
