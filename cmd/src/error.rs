/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    CouplingGraph(#[from] coupling_graph::Error),
    #[error("failed to read {}: {1}", .0.display())]
    ReadFile(PathBuf, std::io::Error),
    #[error("failed to decode {}: {1}", .0.display())]
    DecodeFile(PathBuf, serde_json::Error),
    #[error("failed to encode output: {0}")]
    Encode(serde_json::Error),
}
