// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::path::Path;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Serialize;

/// Variable length hex-encoded bytes
#[derive(Clone, PartialEq, Debug)]
pub struct HexData(pub Vec<u8>);

impl std::str::FromStr for HexData {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches("0x");

        hex::decode(s).map(HexData)
    }
}

impl AsRef<[u8]> for HexData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Variable length base64-encoded bytes
#[derive(Clone, PartialEq, Debug)]
pub struct B64Data(pub Vec<u8>);

impl std::str::FromStr for B64Data {
    type Err = base64::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BASE64_STANDARD.decode(s).map(B64Data)
    }
}

impl AsRef<[u8]> for B64Data {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Write a result to a JSON file
pub fn write_output<T: Serialize>(file: &Path, value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(file, s)?;
    Ok(())
}
