use std::vec::Vec;

/// Minimal `multipart/form-data` encoder, text fields and at most a few
/// binary file parts, enough for the payment endpoint.
pub(super) struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub(super) fn new() -> Self {
        let boundary = format!("----deliverystaff{:016x}", rand::random::<u64>());
        Self {
            boundary,
            body: Vec::new(),
        }
    }

    pub(super) fn text(mut self, name: &str, value: &str) -> Self {
        self._begin_part();
        let disposition = format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n");
        self.body.extend_from_slice(disposition.as_bytes());
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub(super) fn file(
        mut self,
        name: &str,
        file_name: &str,
        media_type: &str,
        payload: &[u8],
    ) -> Self {
        self._begin_part();
        let header = format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {media_type}\r\n\r\n"
        );
        self.body.extend_from_slice(header.as_bytes());
        self.body.extend_from_slice(payload);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn _begin_part(&mut self) {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    pub(super) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub(super) fn finish(mut self) -> (String, Vec<u8>) {
        let ctype = self.content_type();
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"--\r\n");
        (ctype, self.body)
    }
} // end of impl MultipartForm
