fn main() {
    println!("Run `cargo test -p caster-compat` to execute caster compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use tiny_ntrip_protocol::{Credentials, NtripRequest, ProtocolError};
    use tiny_ntrip_relay::{
        AttemptOutcome, Forwarder, Relay, RelayConfig, RelayError, TcpConnector,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a recorded caster response or its decoded payload.
    fn load_fixture(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// One-shot caster on loopback: accepts a single client, reads its
    /// request, writes `parts` with `pause` in between and hangs up.
    /// Resolves to the request it received.
    async fn fake_caster(parts: Vec<Vec<u8>>, pause: Duration) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.ends_with(b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "client hung up before finishing the request");
                request.extend_from_slice(&buf[..n]);
            }

            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(pause).await;
                }
                socket.write_all(part).await.unwrap();
            }
            socket.shutdown().await.unwrap();
            String::from_utf8(request).unwrap()
        });

        (port, handle)
    }

    fn relay_config(port: u16, credentials: Option<Credentials>) -> RelayConfig {
        let mut config = RelayConfig::new(NtripRequest {
            mount: "RTCM3".into(),
            host: "127.0.0.1".into(),
            port,
            credentials,
        });
        config.interval = Duration::from_millis(10);
        config
    }

    fn relay(config: RelayConfig) -> Relay<TcpConnector, Vec<u8>> {
        Relay::new(config, TcpConnector, Forwarder::new(Some(Vec::new()))).unwrap()
    }

    #[tokio::test]
    async fn chunked_stream_with_basic_auth() {
        let (port, caster) = fake_caster(vec![load_fixture("chunked_rtcm.http")], Duration::ZERO).await;
        let mut relay = relay(relay_config(port, Some(Credentials::new("rover", "secret"))));

        let outcome = relay.attempt().await;
        assert!(matches!(outcome, AttemptOutcome::Terminated), "{outcome:?}");

        let request = caster.await.unwrap();
        assert!(request.starts_with("GET /RTCM3 HTTP/1.1\r\n"));
        assert!(request.contains(&format!("Host: 127.0.0.1:{port}\r\n")));
        assert!(request.contains("Ntrip-Version: Ntrip/2.0\r\n"));
        assert!(request.contains("Authorization: Basic cm92ZXI6c2VjcmV0\r\n"));

        assert_eq!(
            relay.forwarder().sink().unwrap(),
            &load_fixture("chunked_rtcm.payload")
        );
    }

    #[tokio::test]
    async fn chunked_stream_split_mid_chunk() {
        let response = load_fixture("chunked_rtcm.http");
        let split = response.len() - 20;
        let parts = vec![response[..split].to_vec(), response[split..].to_vec()];
        let (port, _caster) = fake_caster(parts, Duration::from_millis(50)).await;
        let mut relay = relay(relay_config(port, None));

        let outcome = relay.attempt().await;
        assert!(matches!(outcome, AttemptOutcome::Terminated), "{outcome:?}");
        assert_eq!(
            relay.forwarder().sink().unwrap(),
            &load_fixture("chunked_rtcm.payload")
        );
    }

    #[tokio::test]
    async fn raw_stream_is_relayed_until_hangup() {
        let (port, _caster) = fake_caster(vec![load_fixture("icy_raw.http")], Duration::ZERO).await;
        let mut relay = relay(relay_config(port, None));

        let outcome = relay.attempt().await;
        assert!(
            matches!(outcome, AttemptOutcome::Failed(RelayError::Read(_))),
            "{outcome:?}"
        );
        assert_eq!(
            relay.forwarder().sink().unwrap(),
            &load_fixture("icy_raw.payload")
        );
    }

    #[tokio::test]
    async fn unauthorized_is_rejected_before_the_body() {
        let (port, _caster) = fake_caster(vec![load_fixture("unauthorized.http")], Duration::ZERO).await;
        let mut relay = relay(relay_config(port, Some(Credentials::new("rover", "wrong"))));

        match relay.attempt().await {
            AttemptOutcome::Failed(RelayError::Protocol(ProtocolError::UnexpectedStatus(line))) => {
                assert_eq!(line, "HTTP/1.1 401 Unauthorized")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(relay.forwarder().sink().unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_port_is_a_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut relay = relay(relay_config(port, None));
        let outcome = relay.attempt().await;
        assert!(
            matches!(outcome, AttemptOutcome::Failed(RelayError::Io(_))),
            "{outcome:?}"
        );
    }
}
