// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The message record exchanged over a channel.

use rill::{cdr, DdsType, Result};
use serde::{Deserialize, Serialize};

/// The `{index, message}` payload unit carried by every channel sample.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub index: u32,
    pub message: String,
}

impl MessageRecord {
    pub fn new(index: u32, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

impl DdsType for MessageRecord {
    fn type_name() -> &'static str {
        "MessageRecord"
    }

    fn encode_cdr(&self, buf: &mut Vec<u8>) -> Result<()> {
        cdr::put_u32(buf, self.index);
        cdr::put_string(buf, &self.message);
        Ok(())
    }

    fn decode_cdr(buf: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let index = cdr::get_u32(buf, &mut pos)?;
        let message = cdr::get_string(buf, &mut pos)?;
        Ok(Self { index, message })
    }
}
