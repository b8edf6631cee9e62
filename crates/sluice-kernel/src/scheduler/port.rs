//! Ports: the input and output endpoints of a running stage.
//!
//! A port is exactly one of:
//!
//! - `Unused`: discarded; sends are dropped, receives see end of stream;
//! - `Fd`: an OS byte stream, usable as a child process's stdio;
//! - `Chan`: one end of an unbuffered in-process value channel.
//!
//! A [`Junction`] allocates the two ends that join adjacent pipeline stages.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, OwnedFd};
use std::process::Stdio;
use std::sync::Arc;

use sluice_types::{Span, StreamKind};
use thiserror::Error;

use crate::error::EvalError;
use crate::value::Value;

use super::value_channel::{value_channel, ChannelClosed, ValueReceiver, ValueSender};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("cannot {op} on {kind} port")]
    WrongKind { op: &'static str, kind: StreamKind },
    #[error("cannot {0} on this end of a value channel")]
    WrongDirection(&'static str),
    #[error(transparent)]
    Closed(#[from] ChannelClosed),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Port failures carry no position; the form boundary attaches one with
/// [`EvalError::or_span`].
impl From<PortError> for EvalError {
    fn from(e: PortError) -> Self {
        EvalError::user(Span::default(), e.to_string())
    }
}

/// An OS descriptor shared by every copy of the port.
///
/// The descriptor closes when the last copy is dropped, which is what gives a
/// pipe reader its end of file.
#[derive(Debug, Clone)]
pub struct FdPort {
    fd: Arc<OwnedFd>,
}

impl FdPort {
    pub fn new(fd: OwnedFd) -> Self {
        Self { fd: Arc::new(fd) }
    }

    /// A duplicate of this process's stdin.
    pub fn stdin() -> io::Result<Self> {
        io::stdin().as_fd().try_clone_to_owned().map(Self::new)
    }

    /// A duplicate of this process's stdout.
    pub fn stdout() -> io::Result<Self> {
        io::stdout().as_fd().try_clone_to_owned().map(Self::new)
    }

    /// Duplicate the descriptor for a child process's stdio.
    pub fn try_clone_stdio(&self) -> io::Result<Stdio> {
        self.fd.try_clone().map(Stdio::from)
    }

    fn dup_file(&self) -> io::Result<File> {
        self.fd.try_clone().map(File::from)
    }

    /// Write all of `bytes`, off the async workers.
    pub async fn write_all(&self, bytes: Vec<u8>) -> io::Result<()> {
        let mut file = self.dup_file()?;
        tokio::task::spawn_blocking(move || file.write_all(&bytes))
            .await
            .map_err(io::Error::other)?
    }

    /// Read until end of file, off the async workers.
    pub async fn read_to_end(&self) -> io::Result<Vec<u8>> {
        let mut file = self.dup_file()?;
        tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map(|_| buf)
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[derive(Debug, Clone)]
pub enum ChanPort {
    Sender(ValueSender),
    Receiver(ValueReceiver),
}

#[derive(Debug, Clone, Default)]
pub enum Port {
    #[default]
    Unused,
    Fd(FdPort),
    Chan(ChanPort),
}

impl Port {
    pub fn kind(&self) -> StreamKind {
        match self {
            Port::Unused => StreamKind::Unused,
            Port::Fd(_) => StreamKind::Fd,
            Port::Chan(_) => StreamKind::Chan,
        }
    }

    pub fn as_fd(&self) -> Option<&FdPort> {
        match self {
            Port::Fd(fd) => Some(fd),
            _ => None,
        }
    }

    /// Emit a value. Byte streams get its text followed by a newline.
    pub async fn send(&self, value: Value) -> Result<(), PortError> {
        match self {
            Port::Unused => Ok(()),
            Port::Fd(fd) => Ok(fd.write_all(format!("{value}\n").into_bytes()).await?),
            Port::Chan(ChanPort::Sender(tx)) => Ok(tx.send(value).await?),
            Port::Chan(ChanPort::Receiver(_)) => Err(PortError::WrongDirection("send")),
        }
    }

    /// Take the next value; `None` at end of stream.
    pub async fn recv(&self) -> Result<Option<Value>, PortError> {
        match self {
            Port::Unused => Ok(None),
            Port::Fd(_) => Err(PortError::WrongKind { op: "receive values", kind: StreamKind::Fd }),
            Port::Chan(ChanPort::Receiver(rx)) => Ok(rx.recv().await),
            Port::Chan(ChanPort::Sender(_)) => Err(PortError::WrongDirection("receive")),
        }
    }
}

/// The two ends joining stage `i` to stage `i + 1`.
#[derive(Debug)]
pub struct Junction {
    /// Becomes the producing stage's output.
    pub output: Port,
    /// Becomes the consuming stage's input.
    pub input: Port,
}

impl Junction {
    pub fn new(kind: StreamKind) -> nix::Result<Self> {
        match kind {
            StreamKind::Unused => Ok(Self { output: Port::Unused, input: Port::Unused }),
            StreamKind::Fd => {
                let (reader, writer) = os_pipe()?;
                Ok(Self {
                    output: Port::Fd(FdPort::new(writer)),
                    input: Port::Fd(FdPort::new(reader)),
                })
            }
            StreamKind::Chan => {
                let (tx, rx) = value_channel();
                Ok(Self {
                    output: Port::Chan(ChanPort::Sender(tx)),
                    input: Port::Chan(ChanPort::Receiver(rx)),
                })
            }
        }
    }
}

/// Pipe whose ends are not inherited across exec.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn os_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn os_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe()
}
