//! Accepted pin inputs and their normalization into [`PinRequest`]s.
//!
//! A [`PinSource`] is one identifier, one path, one descriptor, or a
//! sequence (eager, iterator or async stream) of those. [`normalize`] turns
//! any of them into a lazy stream of requests.
//!
//! A sequence is classified by its first element: if that is a bare
//! identifier or path, every later element must be one too; if it is a
//! descriptor, every later element must be a descriptor. An element that
//! does not match fails with [`PinError::InvalidInput`] when it is reached,
//! and the stream ends there. Requests produced before it are not retracted.

use crate::error::{PinError, PinResult};
use crate::pins::PinMetadata;
use crate::resolve::PinTarget;
use crate::Cid;
use futures::future::ready;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;

/// Canonical pin request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequest {
    pub target: PinTarget,
    pub recursive: bool,
    pub metadata: Option<PinMetadata>,
}

impl PinRequest {
    fn bare(target: PinTarget) -> Self {
        Self {
            target,
            recursive: true,
            metadata: None,
        }
    }
}

/// A pin target together with its options.
///
/// Exactly one of identifier or path is set; the constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinDescriptor {
    target: PinTarget,
    recursive: Option<bool>,
    metadata: Option<PinMetadata>,
}

impl PinDescriptor {
    pub fn cid(cid: Cid) -> Self {
        Self::for_target(PinTarget::Cid(cid))
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::for_target(PinTarget::Path(path.into()))
    }

    /// Builds a descriptor from loosely-typed parts, e.g. decoded from a
    /// request body. Both or neither of `cid` and `path` is rejected.
    pub fn new(cid: Option<Cid>, path: Option<String>) -> PinResult<Self> {
        match (cid, path) {
            (Some(cid), None) => Ok(Self::cid(cid)),
            (None, Some(path)) => Ok(Self::path(path)),
            (Some(_), Some(_)) => Err(PinError::invalid_input(
                "descriptor has both an identifier and a path",
            )),
            (None, None) => Err(PinError::invalid_input(
                "descriptor has neither an identifier nor a path",
            )),
        }
    }

    fn for_target(target: PinTarget) -> Self {
        Self {
            target,
            recursive: None,
            metadata: None,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    pub fn metadata(mut self, metadata: PinMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn into_request(self) -> PinRequest {
        PinRequest {
            target: self.target,
            recursive: self.recursive.unwrap_or(true),
            metadata: self.metadata,
        }
    }
}

/// One element of a pin source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinInput {
    Cid(Cid),
    Path(String),
    Descriptor(PinDescriptor),
}

impl From<Cid> for PinInput {
    fn from(value: Cid) -> Self {
        PinInput::Cid(value)
    }
}

impl From<&str> for PinInput {
    fn from(value: &str) -> Self {
        PinInput::Path(value.to_owned())
    }
}

impl From<String> for PinInput {
    fn from(value: String) -> Self {
        PinInput::Path(value)
    }
}

impl From<PinDescriptor> for PinInput {
    fn from(value: PinDescriptor) -> Self {
        PinInput::Descriptor(value)
    }
}

/// Everything the pin pipeline accepts as input.
pub enum PinSource {
    Cid(Cid),
    Path(String),
    Descriptor(PinDescriptor),
    List(Vec<PinInput>),
    Iter(Box<dyn Iterator<Item = PinInput> + Send>),
    Stream(BoxStream<'static, PinInput>),
}

impl PinSource {
    /// A source that pulls from `iter` only as requests are consumed.
    pub fn iter<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PinInput> + 'static,
        I::IntoIter: Send + 'static,
    {
        PinSource::Iter(Box::new(iter.into_iter().map(Into::<PinInput>::into)))
    }

    /// A source that awaits each element from `stream`.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream + Send + 'static,
        S::Item: Into<PinInput>,
    {
        PinSource::Stream(stream.map(Into::<PinInput>::into).boxed())
    }
}

impl fmt::Debug for PinSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinSource::Cid(cid) => f.debug_tuple("Cid").field(cid).finish(),
            PinSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            PinSource::Descriptor(d) => f.debug_tuple("Descriptor").field(d).finish(),
            PinSource::List(items) => f.debug_tuple("List").field(items).finish(),
            PinSource::Iter(_) => f.write_str("Iter(..)"),
            PinSource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Cid> for PinSource {
    fn from(value: Cid) -> Self {
        PinSource::Cid(value)
    }
}

impl From<&str> for PinSource {
    fn from(value: &str) -> Self {
        PinSource::Path(value.to_owned())
    }
}

impl From<String> for PinSource {
    fn from(value: String) -> Self {
        PinSource::Path(value)
    }
}

impl From<PinDescriptor> for PinSource {
    fn from(value: PinDescriptor) -> Self {
        PinSource::Descriptor(value)
    }
}

impl From<PinInput> for PinSource {
    fn from(value: PinInput) -> Self {
        match value {
            PinInput::Cid(cid) => PinSource::Cid(cid),
            PinInput::Path(path) => PinSource::Path(path),
            PinInput::Descriptor(d) => PinSource::Descriptor(d),
        }
    }
}

impl<T: Into<PinInput>> From<Vec<T>> for PinSource {
    fn from(value: Vec<T>) -> Self {
        PinSource::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PinInput>> FromIterator<T> for PinSource {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PinSource::List(iter.into_iter().map(Into::into).collect())
    }
}

/// Lazy stream of normalized requests.
pub type PinRequests = BoxStream<'static, PinResult<PinRequest>>;

/// Normalizes `source` into a lazy stream of requests.
///
/// Fails right away if `source` is `None`. Element shape errors surface
/// as the stream's last item.
pub fn normalize(source: Option<PinSource>) -> PinResult<PinRequests> {
    let source = source.ok_or_else(|| PinError::invalid_input("no pin source given"))?;

    let inputs: BoxStream<'static, PinInput> = match source {
        PinSource::Cid(cid) => stream::once(ready(PinInput::Cid(cid))).boxed(),
        PinSource::Path(path) => stream::once(ready(PinInput::Path(path))).boxed(),
        PinSource::Descriptor(d) => stream::once(ready(PinInput::Descriptor(d))).boxed(),
        PinSource::List(items) => stream::iter(items).boxed(),
        PinSource::Iter(iter) => stream::iter(iter).boxed(),
        PinSource::Stream(inputs) => inputs,
    };

    Ok(inputs
        .enumerate()
        .scan(Classifier::default(), |classifier, (index, input)| {
            ready(classifier.next(index, input))
        })
        .boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputShape {
    Bare,
    Descriptor,
}

impl InputShape {
    fn of(input: &PinInput) -> Self {
        match input {
            PinInput::Cid(_) | PinInput::Path(_) => InputShape::Bare,
            PinInput::Descriptor(_) => InputShape::Descriptor,
        }
    }

    fn normalize(self, index: usize, input: PinInput) -> PinResult<PinRequest> {
        match (self, input) {
            (InputShape::Bare, PinInput::Cid(cid)) => Ok(PinRequest::bare(PinTarget::Cid(cid))),
            (InputShape::Bare, PinInput::Path(path)) => {
                Ok(PinRequest::bare(PinTarget::Path(path)))
            }
            (InputShape::Descriptor, PinInput::Descriptor(d)) => Ok(d.into_request()),
            (InputShape::Bare, PinInput::Descriptor(_)) => Err(PinError::invalid_input(format!(
                "element {index} is a descriptor in a sequence of bare identifiers"
            ))),
            (InputShape::Descriptor, _) => Err(PinError::invalid_input(format!(
                "element {index} is a bare identifier in a sequence of descriptors"
            ))),
        }
    }
}

/// Remembers the shape of the first element and stops after a failure.
#[derive(Debug, Default)]
struct Classifier {
    shape: Option<InputShape>,
    failed: bool,
}

impl Classifier {
    fn next(&mut self, index: usize, input: PinInput) -> Option<PinResult<PinRequest>> {
        if self.failed {
            return None;
        }
        let shape = *self.shape.get_or_insert_with(|| InputShape::of(&input));
        let request = shape.normalize(index, input);
        self.failed = request.is_err();
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::MetaValue;
    use futures::TryStreamExt;

    fn src(source: impl Into<PinSource>) -> Option<PinSource> {
        Some(source.into())
    }

    async fn collect(source: impl Into<PinSource>) -> Vec<PinResult<PinRequest>> {
        normalize(src(source)).unwrap().collect().await
    }

    #[test]
    fn test_absent_source_fails_immediately() {
        let result = normalize(None);
        assert!(matches!(result, Err(PinError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_sources_yield_nothing() {
        assert!(collect(PinSource::List(vec![])).await.is_empty());
        assert!(collect(PinSource::iter(Vec::<Cid>::new())).await.is_empty());
        assert!(collect(PinSource::stream(stream::empty::<Cid>())).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_cid_is_recursive_without_metadata() {
        let cid = Cid::raw(b"one");
        let requests: Vec<_> = normalize(src(cid)).unwrap().try_collect().await.unwrap();
        assert_eq!(
            requests,
            vec![PinRequest {
                target: PinTarget::Cid(cid),
                recursive: true,
                metadata: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_single_path() {
        let requests: Vec<_> = normalize(src("/ipfs/x")).unwrap().try_collect().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target, PinTarget::Path("/ipfs/x".into()));
        assert!(requests[0].recursive);
    }

    #[tokio::test]
    async fn test_descriptor_keeps_explicit_false() {
        let cid = Cid::raw(b"d");
        let meta = PinMetadata::new().with("owner", "ops");
        let source = PinDescriptor::cid(cid).recursive(false).metadata(meta.clone());
        let requests: Vec<_> = normalize(src(source)).unwrap().try_collect().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].recursive);
        assert_eq!(
            requests[0].metadata.as_ref().and_then(|m| m.get("owner")),
            Some(&MetaValue::Text("ops".into()))
        );
    }

    #[tokio::test]
    async fn test_descriptor_defaults_to_recursive() {
        let requests: Vec<_> = normalize(src(PinDescriptor::path("p")))
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(requests[0].recursive);
    }

    #[test]
    fn test_descriptor_needs_exactly_one_target() {
        let cid = Cid::raw(b"x");
        assert!(PinDescriptor::new(Some(cid), None).is_ok());
        assert!(PinDescriptor::new(None, Some("p".into())).is_ok());
        assert!(matches!(
            PinDescriptor::new(Some(cid), Some("p".into())),
            Err(PinError::InvalidInput(_))
        ));
        assert!(matches!(
            PinDescriptor::new(None, None),
            Err(PinError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_sequence_preserves_order() {
        let cids: Vec<Cid> = (0..5u8).map(|i| Cid::raw([i])).collect();
        let requests: Vec<_> = normalize(src(cids.clone()))
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let targets: Vec<_> = requests.into_iter().map(|r| r.target).collect();
        let expected: Vec<_> = cids.into_iter().map(PinTarget::Cid).collect();
        assert_eq!(targets, expected);
    }

    #[tokio::test]
    async fn test_mixed_bare_then_descriptor_fails_at_second() {
        let first = Cid::raw(b"first");
        let inputs = vec![
            PinInput::from(first),
            PinInput::from(PinDescriptor::cid(Cid::raw(b"second"))),
            PinInput::from(Cid::raw(b"third")),
        ];
        let results = collect(PinSource::stream(stream::iter(inputs))).await;
        assert_eq!(results.len(), 2, "stream ends after the failing element");
        assert_eq!(results[0].as_ref().unwrap().target, PinTarget::Cid(first));
        assert!(matches!(results[1], Err(PinError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_mixed_descriptor_then_bare_fails_at_second() {
        let inputs = vec![
            PinInput::from(PinDescriptor::path("a")),
            PinInput::from("b"),
        ];
        let results = collect(PinSource::from(inputs)).await;
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(PinError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_iterator_is_pulled_lazily() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let iter = (0..10u8).map(move |i| {
            counter.fetch_add(1, Ordering::SeqCst);
            Cid::raw([i])
        });

        let mut requests = normalize(src(PinSource::iter(iter))).unwrap();
        requests.next().await.unwrap().unwrap();
        requests.next().await.unwrap().unwrap();
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }
}
