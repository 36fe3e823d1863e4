//! Best-effort service banner grabbing
//!
//! One fresh connection per open port, one bounded read of whatever the
//! service volunteers. Absence of a banner is a normal outcome, never an
//! error, so the return type is an `Option`.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

const BANNER_BUF_LEN: usize = 1024;

/// Read the unsolicited greeting from a service, if it sends one.
///
/// Returns `None` on connect failure, read timeout, or an empty greeting.
/// The connection is owned by this call and dropped on every exit path.
pub async fn grab_banner(host: Ipv4Addr, port: u16, read_timeout: Duration) -> Option<String> {
    let addr = SocketAddr::from((host, port));

    let mut stream = match timeout(read_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        _ => return None,
    };

    let mut buf = [0u8; BANNER_BUF_LEN];
    let n = match timeout(read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) => n,
        _ => return None,
    };

    if n == 0 {
        return None;
    }

    let text = String::from_utf8_lossy(&buf[..n]).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reads_the_greeting_a_service_sends() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"SSH-2.0-OpenSSH_8.2\r\n").await.unwrap();
        });

        let banner = grab_banner(Ipv4Addr::LOCALHOST, port, Duration::from_secs(2)).await;
        assert_eq!(banner.as_deref(), Some("SSH-2.0-OpenSSH_8.2"));
    }

    #[tokio::test]
    async fn silent_service_yields_no_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            // Accept and hold the connection without writing anything
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let banner = grab_banner(Ipv4Addr::LOCALHOST, port, Duration::from_millis(200)).await;
        assert_eq!(banner, None);
    }

    #[test]
    fn refused_connection_yields_no_banner() {
        tokio_test::block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);

            let banner = grab_banner(Ipv4Addr::LOCALHOST, port, Duration::from_millis(200)).await;
            assert_eq!(banner, None);
        });
    }

    #[tokio::test]
    async fn immediate_close_yields_no_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let banner = grab_banner(Ipv4Addr::LOCALHOST, port, Duration::from_millis(500)).await;
        assert_eq!(banner, None);
    }
}
