//! NetConnector - TCP/UDP transport for wire events
//!
//! Framing:
//! - JSON: one document per event, newline terminated
//! - Bincode: 4-byte big-endian length prefix, then the payload
//!
//! UDP sends one datagram per event with the same framing.

use std::io::{self, ErrorKind};

use bytes::{BufMut, BytesMut};
use contracts::{
    Connection, Connector, NetworkConfig, Protocol, SendError, WireEvent, WireFormat,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream, UdpSocket};
use tracing::{debug, instrument, trace};

/// Connector for the bundled TCP/UDP transport
#[derive(Debug, Clone)]
pub struct NetConnector {
    format: WireFormat,
    max_datagram_size: usize,
}

impl Default for NetConnector {
    fn default() -> Self {
        Self::new(WireFormat::default())
    }
}

impl NetConnector {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            max_datagram_size: 65000,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.format).with_max_datagram_size(config.max_datagram_size)
    }

    pub fn with_max_datagram_size(mut self, max_datagram_size: usize) -> Self {
        self.max_datagram_size = max_datagram_size;
        self
    }
}

impl Connector for NetConnector {
    type Conn = NetConnection;

    #[instrument(name = "net_connector_connect", skip(self))]
    async fn connect(&self, protocol: Protocol, address: &str) -> io::Result<NetConnection> {
        let socket = match protocol {
            Protocol::Tcp => {
                let stream = TcpStream::connect(address).await?;
                stream.set_nodelay(true)?;
                Socket::Tcp(stream)
            }
            Protocol::Udp => {
                let target = lookup_host(address).await?.next().ok_or_else(|| {
                    io::Error::new(
                        ErrorKind::AddrNotAvailable,
                        format!("no address resolved for '{}'", address),
                    )
                })?;
                let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
                let socket = UdpSocket::bind(bind_addr).await?;
                socket.connect(target).await?;
                Socket::Udp(socket)
            }
        };

        debug!(%protocol, address, "Transport session opened");

        Ok(NetConnection {
            socket,
            format: self.format,
            max_datagram_size: self.max_datagram_size,
        })
    }
}

enum Socket {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

/// Live TCP or UDP session
pub struct NetConnection {
    socket: Socket,
    format: WireFormat,
    max_datagram_size: usize,
}

impl Connection for NetConnection {
    async fn send(&mut self, event: &WireEvent) -> Result<(), SendError> {
        let frame = encode_frame(self.format, event)?;

        match &mut self.socket {
            Socket::Tcp(stream) => {
                probe_eof(stream)?;
                stream.write_all(&frame).await.map_err(classify)?;
            }
            Socket::Udp(socket) => {
                if frame.len() > self.max_datagram_size {
                    return Err(SendError::Encode(format!(
                        "datagram of {} bytes exceeds limit of {}",
                        frame.len(),
                        self.max_datagram_size
                    )));
                }
                socket.send(&frame).await.map_err(classify)?;
            }
        }

        trace!(service = %event.service, bytes = frame.len(), "Frame written");
        Ok(())
    }
}

/// Serialize one event into a complete frame
pub fn encode_frame(format: WireFormat, event: &WireEvent) -> Result<Vec<u8>, SendError> {
    match format {
        WireFormat::Json => {
            let mut buf = serde_json::to_vec(event)
                .map_err(|e| SendError::Encode(format!("json error: {}", e)))?;
            buf.push(b'\n');
            Ok(buf)
        }
        WireFormat::Bincode => {
            let payload = bincode::serialize(event)
                .map_err(|e| SendError::Encode(format!("bincode error: {}", e)))?;
            let len = u32::try_from(payload.len()).map_err(|_| {
                SendError::Encode(format!("frame too large: {} bytes", payload.len()))
            })?;
            let mut buf = BytesMut::with_capacity(4 + payload.len());
            buf.put_u32(len);
            buf.put_slice(&payload);
            Ok(buf.to_vec())
        }
    }
}

/// Detect a peer that already closed its end before writing into it.
///
/// Collectors do not send unsolicited data, so anything readable is either
/// EOF or ignorable bytes.
fn probe_eof(stream: &TcpStream) -> Result<(), SendError> {
    let mut buf = [0u8; 512];
    loop {
        match stream.try_read(&mut buf) {
            Ok(0) => return Err(SendError::PeerClosed),
            Ok(_) => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(classify(e)),
        }
    }
}

fn classify(e: io::Error) -> SendError {
    match e.kind() {
        ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::NotConnected
        | ErrorKind::UnexpectedEof
        | ErrorKind::WriteZero => SendError::PeerClosed,
        _ => SendError::Io(e),
    }
}
