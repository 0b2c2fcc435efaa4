//! Which pin transitions are allowed.
//!
//! | existing    | requested  | outcome                 |
//! |-------------|------------|-------------------------|
//! | none        | recursive  | create recursive        |
//! | none        | direct     | create direct           |
//! | direct      | recursive  | upgrade to recursive    |
//! | direct      | direct     | refresh direct          |
//! | recursive   | recursive  | refresh recursive       |
//! | recursive   | direct     | conflict                |
//!
//! A recursive pin is never downgraded. "Refresh" rewrites the record under
//! the same classification, so new metadata replaces the old.

use crate::Cid;
use crate::error::{PinError, PinResult};
use crate::pins::PinType;

/// Store mutation chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    /// No record existed.
    Create(PinType),
    /// A direct record becomes recursive.
    Upgrade,
    /// The record keeps its classification.
    Refresh(PinType),
}

impl PinAction {
    /// Classification the record has after the mutation.
    pub fn pin_type(&self) -> PinType {
        match self {
            PinAction::Create(pin_type) | PinAction::Refresh(pin_type) => *pin_type,
            PinAction::Upgrade => PinType::Recursive,
        }
    }
}

/// Decides what to do with a request for `cid` given its current
/// classification.
pub fn plan(cid: &Cid, existing: Option<PinType>, recursive: bool) -> PinResult<PinAction> {
    let requested = if recursive {
        PinType::Recursive
    } else {
        PinType::Direct
    };

    match (existing, requested) {
        (None, requested) => Ok(PinAction::Create(requested)),
        (Some(PinType::Direct), PinType::Recursive) => Ok(PinAction::Upgrade),
        (Some(PinType::Recursive), PinType::Direct) => Err(PinError::Conflict { cid: *cid }),
        (Some(existing), _) => Ok(PinAction::Refresh(existing)),
    }
}
