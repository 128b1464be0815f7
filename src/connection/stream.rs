use log::{debug, warn};
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ConnectionConfig;
use crate::errors::{Error, ProtocolError, SocketError, TlsError};
use crate::messages::ssl_request;
use crate::tls::build_connector;

pin_project! {
    #[project = StreamInnerProj]
    #[derive(Debug)]
    pub enum StreamInner {
        Plain {
            #[pin]
            stream: TcpStream,
        },
        Tls {
            #[pin]
            stream: tokio_native_tls::TlsStream<TcpStream>,
        },
    }
}

impl AsyncWrite for StreamInner {
    fn poll_write(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<Result<usize, std::io::Error>> {
        let this = self.project();
        match this {
            StreamInnerProj::Plain { stream } => stream.poll_write(cx, buf),
            StreamInnerProj::Tls { stream } => stream.poll_write(cx, buf),
        }
    }

    fn poll_flush(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), std::io::Error>> {
        let this = self.project();
        match this {
            StreamInnerProj::Plain { stream } => stream.poll_flush(cx),
            StreamInnerProj::Tls { stream } => stream.poll_flush(cx),
        }
    }

    fn poll_shutdown(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), std::io::Error>> {
        let this = self.project();
        match this {
            StreamInnerProj::Plain { stream } => stream.poll_shutdown(cx),
            StreamInnerProj::Tls { stream } => stream.poll_shutdown(cx),
        }
    }
}

impl AsyncRead for StreamInner {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        let this = self.project();
        match this {
            StreamInnerProj::Plain { stream } => stream.poll_read(cx, buf),
            StreamInnerProj::Tls { stream } => stream.poll_read(cx, buf),
        }
    }
}

impl StreamInner {
    /// Synchronous best-effort write, used only for the Terminate message on
    /// drop. Only possible on a plain stream; bytes written to the raw socket
    /// under a TLS session would corrupt it.
    pub(crate) fn try_write_raw(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            StreamInner::Plain { stream } => stream.try_write(buf),
            StreamInner::Tls { .. } => Ok(0),
        }
    }
}

/// Write the bytes and flush.
pub(crate) async fn write_all_flush<S>(stream: &mut S, bytes: &[u8]) -> Result<(), Error>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(bytes).await.map_err(SocketError::Write)?;
    stream.flush().await.map_err(SocketError::Flush)?;
    Ok(())
}

/// Open the transport: TCP connect, then the optional SSLRequest dance and
/// TLS handshake. On `'N'` (or the server closing the stream instead of
/// answering) the connect attempt fails without ever starting a handshake.
pub(crate) async fn connect_stream(config: &ConnectionConfig) -> Result<StreamInner, Error> {
    let addr = config.server_addr();
    let mut stream = TcpStream::connect(&addr).await.map_err(|err| {
        warn!("Could not connect to server: {err}");
        SocketError::Connect { addr: addr.clone(), source: err }
    })?;

    if let Err(err) = stream.set_nodelay(true) {
        warn!("Could not set TCP_NODELAY on {addr}: {err}");
    }

    let tls_config = match &config.tls {
        None => return Ok(StreamInner::Plain { stream }),
        Some(tls_config) => tls_config,
    };

    // Request a TLS connection
    write_all_flush(&mut stream, &ssl_request()).await?;

    let response = match stream.read_u8().await {
        Ok(response) => response,
        // Closing the stream instead of answering is how very old servers
        // decline the upgrade.
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TlsError::RejectedByServer.into());
        }
        Err(err) => return Err(SocketError::Read(err).into()),
    };

    match response {
        // Server accepts TLS
        b'S' => {
            debug!("TLS upgrade accepted by {addr}, starting handshake");
            let connector = build_connector(tls_config).await?;
            let stream = connector
                .connect(&config.host, stream)
                .await
                .map_err(TlsError::HandshakeFailed)?;
            Ok(StreamInner::Tls { stream })
        }
        // Server declines TLS
        b'N' => Err(TlsError::RejectedByServer.into()),
        // Something else?
        other => Err(ProtocolError::Unexpected {
            tag: other as char,
            phase: "TLS negotiation",
        }
        .into()),
    }
}
