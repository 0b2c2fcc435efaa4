//! Core pinset types and the pin-add pipeline.
//!
//! Pins mark content-addressed objects that garbage collection must keep.
//! This crate defines:
//!
//! - Content identifiers (`cid::Cid`)
//! - The pin model and the record store abstraction (`PinType`,
//!   `PinRecord`, `PinMetadata`, `PinStore`); backends live in
//!   `pinset_store_memory` and `pinset_store_redb`
//! - Target resolution (`PinTarget`, `PathResolver`, `CidPathResolver`,
//!   `AliasResolver`)
//! - The reader/writer lock shared with the garbage collector (`GcLock`)
//! - Input normalization (`PinSource`, `normalize`)
//! - The pipeline that applies pins (`PinManager::add_all`)
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use pinset_core::{AddOptions, Cid, CidPathResolver, GcLock, PinManager, PinStore};
//!
//! async fn pin_two(store: impl PinStore) -> Result<(), pinset_core::PinError> {
//!     let pins = PinManager::new(store, CidPathResolver, GcLock::new());
//!     let sources = vec![Cid::raw(b"a"), Cid::raw(b"b")];
//!     let pinned: Vec<Cid> = pins.add_all(sources, AddOptions::default()).try_collect().await?;
//!     assert_eq!(pinned.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod add;
pub mod cid;
pub mod error;
pub mod gc;
pub mod pins;
pub mod resolve;
pub mod source;

// Test utilities (behind feature flag)
#[cfg(feature = "testutil")]
pub mod testutil;

pub use add::{AddOptions, PinAction, PinManager, PinnedCids};
pub use cid::Cid;
pub use error::{PinError, PinResult};
pub use gc::{GcLock, GcReadGuard, GcWriteGuard};
pub use pins::{MetaValue, PinMetadata, PinRecord, PinStore, PinType};
pub use resolve::{AliasResolver, CidPathResolver, PathResolver, PinTarget, ResolveError};
pub use source::{PinDescriptor, PinInput, PinRequest, PinSource, normalize};
