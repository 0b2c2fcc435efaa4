//! Mapping pin targets to content identifiers.

use crate::Cid;
use crate::cid::CidError;
use std::collections::HashMap;
use std::fmt;

const IPFS_PREFIX: &str = "/ipfs/";
const IPFS_SCHEME: &str = "ipfs://";

/// What a pin request points at before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinTarget {
    Cid(Cid),
    Path(String),
}

impl fmt::Display for PinTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinTarget::Cid(cid) => write!(f, "{cid}"),
            PinTarget::Path(path) => f.write_str(path),
        }
    }
}

impl From<Cid> for PinTarget {
    fn from(value: Cid) -> Self {
        PinTarget::Cid(value)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("empty path")]
    EmptyPath,
    #[error("invalid root identifier in {path}: {source}")]
    InvalidRoot {
        path: String,
        #[source]
        source: CidError,
    },
    #[error("resolving {path} requires traversing {remainder}")]
    UnsupportedSubPath { path: String, remainder: String },
}

/// Turns a [`PinTarget`] into the identifier that gets pinned.
#[async_trait::async_trait]
pub trait PathResolver: std::fmt::Debug + Send + Sync + 'static {
    async fn resolve(&self, target: &PinTarget) -> anyhow::Result<Cid>;
}

#[async_trait::async_trait]
impl<T: PathResolver + ?Sized> PathResolver for std::sync::Arc<T> {
    async fn resolve(&self, target: &PinTarget) -> anyhow::Result<Cid> {
        (**self).resolve(target).await
    }
}

/// Resolves identifiers and identifier-rooted paths without touching any
/// content.
///
/// Accepted path forms are `<cid>`, `/ipfs/<cid>` and `ipfs://<cid>`, each
/// with an optional trailing slash. Anything below the root identifier would
/// need a DAG walk and is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CidPathResolver;

impl CidPathResolver {
    pub fn parse_path(path: &str) -> Result<Cid, ResolveError> {
        let trimmed = path.trim();
        let rest = trimmed
            .strip_prefix(IPFS_PREFIX)
            .or_else(|| trimmed.strip_prefix(IPFS_SCHEME))
            .unwrap_or(trimmed);

        let mut parts = rest.splitn(2, '/');
        let root = parts.next().unwrap_or_default();
        if root.is_empty() {
            return Err(ResolveError::EmptyPath);
        }
        let remainder = parts.next().unwrap_or_default().trim_matches('/');
        if !remainder.is_empty() {
            return Err(ResolveError::UnsupportedSubPath {
                path: path.to_owned(),
                remainder: remainder.to_owned(),
            });
        }

        Cid::parse(root).map_err(|source| ResolveError::InvalidRoot {
            path: path.to_owned(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl PathResolver for CidPathResolver {
    async fn resolve(&self, target: &PinTarget) -> anyhow::Result<Cid> {
        match target {
            PinTarget::Cid(cid) => Ok(*cid),
            PinTarget::Path(path) => Ok(Self::parse_path(path)?),
        }
    }
}

/// Fixed table of path aliases, falling back to [`CidPathResolver`].
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: HashMap<String, Cid>,
}

impl AliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, path: impl Into<String>, cid: Cid) -> Self {
        self.insert(path, cid);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, cid: Cid) {
        self.aliases.insert(path.into(), cid);
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl FromIterator<(String, Cid)> for AliasResolver {
    fn from_iter<I: IntoIterator<Item = (String, Cid)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl PathResolver for AliasResolver {
    async fn resolve(&self, target: &PinTarget) -> anyhow::Result<Cid> {
        if let PinTarget::Path(path) = target
            && let Some(cid) = self.aliases.get(path)
        {
            return Ok(*cid);
        }
        CidPathResolver.resolve(target).await
    }
}
