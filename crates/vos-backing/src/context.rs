use std::collections::BTreeMap;
use std::sync::Arc;

/// Why an object is being fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FetchCause {
    #[default]
    Unknown,
    /// A filesystem request from a mount.
    Fs,
    /// An explicit request over the service API.
    Thrift,
    /// A speculative prefetch.
    Prefetch,
}

#[derive(Clone, Debug, Default)]
struct ContextInner {
    cause: FetchCause,
    client_pid: Option<u32>,
    request_info: BTreeMap<String, String>,
}

/// Per-request metadata passed through every layer unmodified.
///
/// Cloning is cheap and yields a handle to the same context, so a fetch that
/// fans out into several backing calls can hand each of them its own copy.
#[derive(Clone, Debug, Default)]
pub struct FetchContext {
    inner: Arc<ContextInner>,
}

impl FetchContext {
    pub fn new(cause: FetchCause) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                cause,
                ..Default::default()
            }),
        }
    }

    /// Context for fetches nobody in particular asked for.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn with_client_pid(mut self, pid: u32) -> Self {
        Arc::make_mut(&mut self.inner).client_pid = Some(pid);
        self
    }

    pub fn with_request_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner)
            .request_info
            .insert(key.into(), value.into());
        self
    }

    pub fn cause(&self) -> FetchCause {
        self.inner.cause
    }

    pub fn client_pid(&self) -> Option<u32> {
        self.inner.client_pid
    }

    pub fn request_info(&self) -> &BTreeMap<String, String> {
        &self.inner.request_info
    }

    /// Returns `true` if both handles refer to the same context.
    pub fn same_as(&self, other: &FetchContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_context_has_unknown_cause() {
        let ctx = FetchContext::null();
        assert_eq!(ctx.cause(), FetchCause::Unknown);
        assert!(ctx.client_pid().is_none());
        assert!(ctx.request_info().is_empty());
    }

    #[test]
    fn builder_sets_fields() {
        let ctx = FetchContext::new(FetchCause::Fs)
            .with_client_pid(42)
            .with_request_info("endpoint", "readdir");
        assert_eq!(ctx.cause(), FetchCause::Fs);
        assert_eq!(ctx.client_pid(), Some(42));
        assert_eq!(ctx.request_info().get("endpoint").map(String::as_str), Some("readdir"));
    }

    #[test]
    fn clones_share_identity() {
        let ctx = FetchContext::new(FetchCause::Prefetch);
        let copy = ctx.clone();
        assert!(ctx.same_as(&copy));
        assert!(!ctx.same_as(&FetchContext::new(FetchCause::Prefetch)));
    }
}
