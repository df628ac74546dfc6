//! Reading one HTTP/1.1 request off a stream: head up to the blank line, then exactly
//! `Content-Length` body bytes, however many reads that takes.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound on head plus body. Profiles of heavy players run to a few hundred KiB.
pub const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;

const READ_CHUNK: usize = 16_384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("invalid Content-Length '{0}'")]
    BadContentLength(String),
    #[error("connection closed after {received} of {expected} body bytes")]
    Truncated { received: usize, expected: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads a request of at most `limit` bytes. `Ok(None)` when the peer closed without sending anything.
pub async fn read_request<R>(reader: &mut R, limit: usize) -> Result<Option<RawRequest>, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0_u8; READ_CHUNK];

    let (head_end, body_start) = loop {
        if let Some(bounds) = find_head_end(&buffer) {
            break bounds;
        }
        if buffer.len() > limit {
            return Err(RequestError::TooLarge { limit });
        }
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            // Peer half-closed without a blank line: everything received is head.
            break (buffer.len(), buffer.len());
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let length = content_length(&head)?;
    let expected_end = body_start
        .checked_add(length)
        .filter(|&end| end <= limit)
        .ok_or(RequestError::TooLarge { limit })?;

    while buffer.len() < expected_end {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Err(RequestError::Truncated {
                received: buffer.len() - body_start,
                expected: length,
            });
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    Ok(Some(RawRequest {
        method: request_line.next().unwrap_or("GET").to_string(),
        path: request_line.next().unwrap_or("/").to_string(),
        body: String::from_utf8_lossy(&buffer[body_start..expected_end]).into_owned(),
    }))
}

/// `(end of head, start of body)`; bare `\n\n` is accepted for hand-typed requests.
fn find_head_end(buffer: &[u8]) -> Option<(usize, usize)> {
    if let Some(at) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((at, at + 4));
    }
    buffer.windows(2).position(|w| w == b"\n\n").map(|at| (at, at + 2))
}

/// Header names compare case-insensitively; a missing header means no body.
fn content_length(head: &str) -> Result<usize, RequestError> {
    for line in head.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let value = value.trim();
            return value
                .parse()
                .map_err(|_| RequestError::BadContentLength(value.to_string()));
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn reads_body_split_across_many_reads() {
        let body = "x".repeat(50_000);
        let request = format!("POST /api/metrics HTTP/1.1\r\ncontent-length: {}\r\n\r\n{body}", body.len());
        let (mut client, mut server) = tokio::io::duplex(1_024);
        let writer = tokio::spawn(async move {
            client.write_all(request.as_bytes()).await.unwrap();
        });

        let parsed = read_request(&mut server, MAX_REQUEST_BYTES).await.unwrap().unwrap();
        writer.await.unwrap();
        assert_eq!(parsed.method, "POST");
        assert_eq!(parsed.path, "/api/metrics");
        assert_eq!(parsed.body.len(), 50_000);
    }

    #[tokio::test]
    async fn request_without_length_has_empty_body() {
        let mut raw: &[u8] = b"GET /api/health HTTP/1.1\nHost: localhost\n\n";
        let parsed = read_request(&mut raw, MAX_REQUEST_BYTES).await.unwrap().unwrap();
        assert_eq!(parsed.path, "/api/health");
        assert!(parsed.body.is_empty());

        let mut empty: &[u8] = b"";
        assert!(read_request(&mut empty, MAX_REQUEST_BYTES).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_and_short_bodies_are_rejected() {
        let mut raw: &[u8] = b"POST /api/metrics HTTP/1.1\r\nContent-Length: 4096\r\n\r\n{}";
        assert!(matches!(
            read_request(&mut raw, 1_024).await,
            Err(RequestError::TooLarge { limit: 1_024 })
        ));

        let mut raw: &[u8] = b"POST /api/metrics HTTP/1.1\r\nContent-Length: 10\r\n\r\n{}";
        assert!(matches!(
            read_request(&mut raw, MAX_REQUEST_BYTES).await,
            Err(RequestError::Truncated { received: 2, expected: 10 })
        ));

        let mut raw: &[u8] = b"POST /api/metrics HTTP/1.1\r\nContent-Length: lots\r\n\r\n";
        assert!(matches!(
            read_request(&mut raw, MAX_REQUEST_BYTES).await,
            Err(RequestError::BadContentLength(_))
        ));
    }
}
