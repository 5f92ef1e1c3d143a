//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    address::{AddressReq, AddressResp},
    chunk::{ChunkPlan, Frame, FrameRole},
    path::{Bip32Path, PathIndex},
    response::ApduResponse,
    sign::SignChunkReq,
    status::{StatusCode, StatusWord},
    version::{VersionReq, VersionResp},
    ApduError, ApduReq, ApduStatic,
};
