/// A line received from the instrument, terminated by LF.
///
/// The Prema 6000 only talks when asked: the `P0` query yields one status
/// line. Anything arriving without an outstanding query is kept apart so
/// the device layer can reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Status(String),
    Unsolicited(String),
}

impl Response {
    pub fn line(&self) -> &str {
        match self {
            Response::Status(line) | Response::Unsolicited(line) => line,
        }
    }
}
