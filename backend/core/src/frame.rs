use serde::{Deserialize, Serialize};

/// A still frame ready to be shipped to an extraction provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFrame {
    pub mime_type: String,
    /// Standard base64, no data-URL prefix.
    pub data_base64: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedFrame {
    pub fn jpeg(data_base64: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data_base64: data_base64.into(),
            width,
            height,
        }
    }

    /// `data:<mime>;base64,<data>` form used by chat-completions style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let frame = EncodedFrame::jpeg("AAAA", 1, 1);
        assert_eq!(frame.data_url(), "data:image/jpeg;base64,AAAA");
    }
}
