// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Chunk planning for multi-frame sign requests
//!
//! A sign request is split into an ordered sequence of [Frame]s, each sent in a
//! separate APDU with `P1 = position` and `P2 = count`:
//!
//! ```text
//! position:   1            2           ...       count
//!           +----------+ +-----------+         +-----------+
//!           | PATH     | | MSG[0..]  |   ...   | MSG[..]   |
//!           | (12 B)   | | (<=250 B) |         | (<=250 B) |
//!           +----------+ +-----------+         +-----------+
//! role:       INIT         ADD                   LAST
//! ```
//!
//! An empty message produces a single `INIT` frame.

use strum::Display;

use crate::{ApduError, CHUNK_SIZE};

/// Maximum number of frames, the frame count is carried in a single byte
pub const MAX_FRAMES: usize = u8::MAX as usize;

/// Maximum message length that can be planned
pub const MAX_MESSAGE_LEN: usize = (MAX_FRAMES - 1) * CHUNK_SIZE;

/// Frame role, derived from position and count
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum FrameRole {
    /// First frame, carries the BIP32 path
    Init,
    /// Interior message fragment
    Add,
    /// Final message fragment
    Last,
}

impl FrameRole {
    /// Resolve the role of a frame from its (1-based) position and the frame count
    pub const fn of(position: u8, count: u8) -> Self {
        if position <= 1 {
            FrameRole::Init
        } else if position >= count {
            FrameRole::Last
        } else {
            FrameRole::Add
        }
    }
}

/// A single frame in a sign exchange
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Frame<'a> {
    /// 1-based frame position
    pub position: u8,
    /// Total number of frames
    pub count: u8,
    /// Frame payload
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Fetch the role of this frame
    pub const fn role(&self) -> FrameRole {
        FrameRole::of(self.position, self.count)
    }

    /// Check whether this is the final frame of the exchange
    pub const fn is_last(&self) -> bool {
        self.position == self.count
    }
}

/// Frame plan for a path and message
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ChunkPlan<'a> {
    path: &'a [u8],
    message: &'a [u8],
    count: u8,
}

impl<'a> ChunkPlan<'a> {
    /// Plan frames for the provided (encoded) path and message
    pub fn new(path: &'a [u8], message: &'a [u8]) -> Result<Self, ApduError> {
        if path.len() > CHUNK_SIZE {
            return Err(ApduError::InvalidLength);
        }

        let count = 1 + message.len().div_ceil(CHUNK_SIZE);
        if count > MAX_FRAMES {
            return Err(ApduError::MessageTooLong(message.len()));
        }

        Ok(Self {
            path,
            message,
            count: count as u8,
        })
    }

    /// Fetch the total number of frames
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Iterate over planned frames in send order
    pub fn frames(&self) -> impl Iterator<Item = Frame<'a>> + 'a {
        let count = self.count;

        let init = Frame {
            position: 1,
            count,
            data: self.path,
        };

        let chunks = self
            .message
            .chunks(CHUNK_SIZE)
            .enumerate()
            .map(move |(i, data)| Frame {
                position: i as u8 + 2,
                count,
                data,
            });

        core::iter::once(init).chain(chunks)
    }
}
