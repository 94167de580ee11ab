use thiserror::Error;

use crate::MIN_TAU;

/// Errors produced while building constraints or stepping a simulation.
#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "tau must be a finite value of at least {min}, was {tau}",
    min = MIN_TAU
  )]
  TauOutOfRange { tau: f32 },
  #[error("weight must be in the range [0, 1], was {0}")]
  InvalidWeight(f32),
  #[error("invalid agent: {reason}")]
  InvalidAgent { reason: &'static str },
  #[error("cannot build a velocity obstacle for this wall: {reason}")]
  MalformedWall { reason: &'static str },
  #[error("velocity obstacle domain does not match its resolution")]
  InconsistentDomain,
  #[error("pool size must be greater than zero")]
  InvalidPoolSize,
  #[error("failed to build the worker pool: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
  #[error("neighbour query failed: {0}")]
  NeighbourQuery(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks that `tau` is usable as a lookahead time.
pub(crate) fn validate_tau(tau: f32) -> Result<()> {
  if tau.is_finite() && tau >= MIN_TAU {
    Ok(())
  } else {
    Err(Error::TauOutOfRange { tau })
  }
}
