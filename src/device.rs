use futures::{FutureExt, SinkExt, StreamExt};
use std::{pin::Pin, time::Duration};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::SerialPortBuilderExt;
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::measurement::{Measurement, Reading};
use crate::proto::{
    codec::ProtocolCodec,
    command::{Autorange, Command, IntegrationTime, Mode, ReturnMode, MAX_GPIB_ADDRESS},
    response::Response,
    ProtoError, Result,
};
use crate::status::{Status, STATUS_LEN};
use crate::DEFAULT_TIMEOUT;

trait AsyncReadWrite<S>: futures::Sink<S> + futures::Stream {}

impl<T, S> AsyncReadWrite<S> for T where T: futures::Sink<S> + futures::Stream {}

#[allow(clippy::type_complexity)]
pub struct Device {
    stream: Pin<
        Box<
            dyn AsyncReadWrite<
                Command,
                Error = std::io::Error,
                Item = std::result::Result<Response, std::io::Error>,
            >,
        >,
    >,
    timeout: Duration,
    // Last known integration time, the instrument answers only after it.
    integration: Option<IntegrationTime>,
    // Queries need an explicit read request when a GPIB controller is in between.
    controller: bool,
}

impl Device {
    pub fn new(com: impl AsRef<str>, baudrate: u32) -> Result<Self> {
        #[allow(unused_mut)]
        let mut port = tokio_serial::new(com.as_ref(), baudrate).open_native_async()?;

        #[cfg(unix)]
        port.set_exclusive(false)?;

        Ok(Self::from_io(port))
    }

    /// Talks to the instrument over any byte stream, e.g. a TCP socket of
    /// a network GPIB controller.
    pub fn from_io<T>(io: T) -> Self
    where
        T: AsyncRead + AsyncWrite + 'static,
    {
        let stream = ProtocolCodec::default().framed(io);

        Self {
            stream: Box::pin(stream),
            timeout: DEFAULT_TIMEOUT,
            integration: None,
            controller: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_faked(replies: &[&[u8]]) -> (Self, crate::proto::fake::SentLog) {
        let (fake, sent) =
            crate::proto::fake::FakeBuffer::new(replies.iter().map(|r| r.to_vec()).collect());
        (Self::from_io(fake), sent)
    }

    /// Upper bound for waiting on an answer, on top of the integration time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn answer_timeout(&self) -> Duration {
        self.timeout + self.integration.map_or(Duration::ZERO, IntegrationTime::duration)
    }

    /// Addresses the instrument through a serial-to-GPIB controller.
    pub async fn select_gpib_address(&mut self, address: u8) -> Result<()> {
        if address > MAX_GPIB_ADDRESS {
            return Err(ProtoError::InvalidChoice {
                property: "GPIB address",
                value: address.to_string(),
            });
        }
        self.stream.send(Command::ControllerMode).await?;
        self.stream.send(Command::ControllerAddress(address)).await?;
        self.stream.send(Command::ControllerAuto(false)).await?;
        self.controller = true;
        debug!(address, "instrument addressed through GPIB controller");
        Ok(())
    }

    // Lines already received belong to queries that timed out.
    fn discard_pending(&mut self) {
        while let Some(Some(item)) = self.stream.next().now_or_never() {
            match item {
                Ok(response) => warn!(line = response.line(), "discarding stale answer"),
                Err(err) => {
                    warn!(%err, "discarding unreadable input");
                    break;
                }
            }
        }
    }

    /// Raw answer to the `P0` query.
    pub async fn raw_status(&mut self) -> Result<String> {
        self.discard_pending();
        self.stream.send(Command::Status).await?;
        if self.controller {
            self.stream.send(Command::ControllerRead).await?;
        }
        let timeout = self.answer_timeout();
        let answer = tokio::time::timeout(timeout, async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Response::Status(line))) => return Ok(line),
                    Some(Ok(response)) => {
                        warn!(line = response.line(), "discarding unsolicited line")
                    }
                    Some(Err(ioerr)) => return Err(ioerr.into()),
                    None => return Err(ProtoError::Abort),
                }
            }
        })
        .await;

        match answer {
            Ok(result) => result,
            Err(_elapsed) => {
                self.stream.send(Command::Abandon).await?;
                Err(ProtoError::Timeout)
            }
        }
    }

    pub async fn status(&mut self) -> Result<Status> {
        let raw = self.raw_status().await?;
        let status = Status::decode(&raw)?;
        self.integration = Some(status.integration_time);
        Ok(status)
    }

    pub async fn mode(&mut self) -> Result<Mode> {
        Ok(self.status().await?.mode)
    }

    pub async fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.stream.send(Command::SetMode(mode)).await?;
        Ok(())
    }

    pub async fn set_return_mode(&mut self, mode: ReturnMode) -> Result<()> {
        self.stream.send(Command::SetReturnMode(mode)).await?;
        Ok(())
    }

    pub async fn set_autorange(&mut self, autorange: impl Into<Autorange>) -> Result<()> {
        self.stream
            .send(Command::SetAutorange(autorange.into()))
            .await?;
        Ok(())
    }

    pub async fn set_integration_time(&mut self, time: IntegrationTime) -> Result<()> {
        self.stream.send(Command::SetIntegrationTime(time)).await?;
        self.integration = Some(time);
        Ok(())
    }

    pub async fn reading(&mut self) -> Result<Reading> {
        let raw = self.raw_status().await?;
        Reading::from_response(&raw)
    }

    /// Reading and, when the answer carries the status block, the mode it
    /// was taken in. Both come from a single query.
    pub async fn measurement(&mut self) -> Result<Measurement> {
        let raw = self.raw_status().await?;
        let reading = Reading::from_response(&raw)?;
        let mode = if raw.len() < STATUS_LEN {
            // Return mode "measurement only"
            None
        } else {
            let status = Status::decode(&raw)?;
            self.integration = Some(status.integration_time);
            Some(status.mode)
        };
        Ok(Measurement { reading, mode })
    }

    /// DC or AC voltage, depending on the active mode.
    pub async fn voltage(&mut self) -> Result<Reading> {
        self.reading().await
    }

    /// 2- or 4-wire resistance, depending on the active mode.
    pub async fn resistance(&mut self) -> Result<Reading> {
        self.reading().await
    }

    /// DC or AC current, depending on the active mode.
    pub async fn current(&mut self) -> Result<Reading> {
        self.reading().await
    }

    /// Temperature in celsius, fahrenheit or kelvin, depending on the active mode.
    pub async fn temperature(&mut self) -> Result<Reading> {
        self.reading().await
    }
}
