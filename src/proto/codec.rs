use bytes::{Buf, BytesMut};
use std::{
    fmt::{self, Write},
    io::{self},
};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use super::command::{Command, Setting, STATUS_REQUEST};
use super::response::Response;

#[derive(Default)]
pub struct ProtocolCodec {
    awaiting_reply: bool,
}

impl ProtocolCodec {
    // Invalid bytes become U+FFFD and fail later in the status decoder,
    // a decoder error would end the stream for good.
    fn convert_string(payload: impl AsRef<[u8]>) -> String {
        String::from_utf8_lossy(payload.as_ref()).into_owned()
    }
}

impl Decoder for ProtocolCodec {
    type Item = Response;
    // Decoding a line never fails on its content. Whether a status line
    // makes sense is decided by the status decoder.
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(n) = src.iter().position(|b| *b == b'\n') else {
                return Ok(None);
            };
            let mut line = src.split_to(n + 1);
            line.truncate(n);
            if line.last() == Some(&b'\r') {
                line.truncate(n - 1);
            }
            if line.is_empty() {
                continue;
            }
            let line = Self::convert_string(&line);
            debug!(response = %line, "received");

            let response = if self.awaiting_reply {
                self.awaiting_reply = false;
                Response::Status(line)
            } else {
                Response::Unsolicited(line)
            };
            return Ok(Some(response));
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(response) => Ok(Some(response)),
            None => {
                // Some adapters end the last line with EOI only.
                if buf.iter().all(|b| b.is_ascii_whitespace()) {
                    buf.advance(buf.len());
                    Ok(None)
                } else {
                    buf.extend_from_slice(b"\n");
                    self.decode(buf)
                }
            }
        }
    }
}

fn write_fmt_guarded(dst: &mut BytesMut, args: fmt::Arguments<'_>) -> Result<(), io::Error> {
    dst.write_fmt(args)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

impl Encoder<Command> for ProtocolCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let start = dst.len();
        match &item {
            Command::Abandon => {
                debug!(awaiting_reply = self.awaiting_reply, "dropping outstanding query");
                self.awaiting_reply = false;
                return Ok(());
            }
            Command::Status => write_fmt_guarded(dst, format_args!("{}", STATUS_REQUEST))?,
            Command::SetMode(mode) => write_fmt_guarded(dst, format_args!("{}", mode.code()))?,
            Command::SetReturnMode(mode) => {
                write_fmt_guarded(dst, format_args!("{}", mode.code()))?
            }
            Command::SetAutorange(autorange) => {
                write_fmt_guarded(dst, format_args!("{}", autorange.code()))?
            }
            Command::SetIntegrationTime(time) => {
                write_fmt_guarded(dst, format_args!("{}", time.code()))?
            }
            Command::ControllerMode => write_fmt_guarded(dst, format_args!("++mode 1"))?,
            Command::ControllerAddress(addr) => {
                write_fmt_guarded(dst, format_args!("++addr {}", addr))?
            }
            Command::ControllerAuto(auto) => {
                write_fmt_guarded(dst, format_args!("++auto {}", u8::from(*auto)))?
            }
            Command::ControllerRead => write_fmt_guarded(dst, format_args!("++read eoi"))?,
        }
        debug!(command = %String::from_utf8_lossy(&dst[start..]), "sending");
        dst.write_str("\n")
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        if item.is_query() {
            self.awaiting_reply = true;
        }
        Ok(())
    }
}
