/// Success result of a dispatch call.
///
/// `data` is the response body deserialized into the caller's type;
/// `status_code` is the HTTP status of the successful attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseEnvelope<T> {
    pub data: T,
    pub success: bool,
    pub status_code: u16,
}

impl<T> ResponseEnvelope<T> {
    pub(crate) fn new(data: T, status_code: u16) -> Self {
        Self {
            data,
            success: true,
            status_code,
        }
    }

    /// Consumes the envelope and returns the payload.
    pub fn into_data(self) -> T {
        self.data
    }
}
