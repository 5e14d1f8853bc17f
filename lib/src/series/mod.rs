/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

pub mod aligned;
pub mod change_points;
pub mod serial;

#[cfg(test)]
mod test;
