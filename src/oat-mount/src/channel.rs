// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Byte transport for one command/response exchange at a time.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};

use oat_core::{Command, MountResult};

/// A duplex byte channel carrying framed commands and line replies.
///
/// The protocol is half-duplex by discipline even though the transport
/// is not: the driver pairs every reply-bearing [`send`](Channel::send)
/// with exactly one [`receive_line`](Channel::receive_line) before the
/// next send.
#[async_trait]
pub trait Channel: Send {
    /// Write the command's bytes verbatim and flush.
    async fn send(&mut self, command: &Command) -> MountResult<()>;

    /// Read one reply line.
    ///
    /// Returns the accumulated text once a `'\n'` arrives or the read
    /// timeout elapses, with trailing CR/LF stripped. A timed-out or
    /// empty read is returned verbatim; whether that is an error is the
    /// decoder's call.
    async fn receive_line(&mut self) -> MountResult<String>;
}

/// [`Channel`] over a local serial port.
pub struct SerialChannel {
    port: SerialStream,
    read_timeout: Duration,
}

impl SerialChannel {
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(800);

    pub fn open(path: &str, baud: u32) -> MountResult<Self> {
        let port = tokio_serial::new(path, baud)
            .open_native_async()
            .map_err(std::io::Error::other)?;
        Ok(Self {
            port,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        })
    }

    /// Run the platform's port preparation, then open.
    pub fn open_prepared(
        path: &str,
        baud: u32,
        preparer: &dyn crate::prepare::PortPreparer,
    ) -> MountResult<Self> {
        preparer.prepare(path)?;
        Self::open(path, baud)
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

#[async_trait]
impl Channel for SerialChannel {
    async fn send(&mut self, command: &Command) -> MountResult<()> {
        // Drop any stale bytes so the next read sees only this
        // command's reply.
        let _ = self.port.clear(ClearBuffer::Input);
        self.port.write_all(command.as_bytes()).await?;
        self.port.flush().await?;
        Ok(())
    }

    async fn receive_line(&mut self) -> MountResult<String> {
        let mut buf = Vec::new();
        let read = async {
            loop {
                let mut byte = [0u8; 1];
                self.port.read_exact(&mut byte).await?;
                if byte[0] == b'\n' {
                    break;
                }
                buf.push(byte[0]);
            }
            Ok::<(), std::io::Error>(())
        };
        match timeout(self.read_timeout, read).await {
            Ok(result) => result?,
            // Status replies and '#'-terminated payloads usually arrive
            // without a newline; the timeout is how those reads end.
            Err(_elapsed) => {}
        }
        while matches!(buf.last(), Some(b'\r')) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}
