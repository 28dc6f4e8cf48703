//! Filter chains wrapping handler invocation.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::request::Request;
use crate::response::Response;

/// A boxed async request handler.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Boxes an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// A unit of request pre/post-processing.
///
/// A filter receives the request, the response being built and the rest
/// of the chain. Awaiting [`FilterChain::next`] runs the remaining filters
/// and then the handler; returning without calling it short-circuits the
/// request, and nothing after this filter runs.
///
/// # Example
///
/// ```ignore
/// struct RequireToken;
///
/// impl Filter for RequireToken {
///     fn apply<'a>(
///         &'a self,
///         req: &'a mut Request,
///         res: &'a mut Response,
///         chain: FilterChain<'a>,
///     ) -> BoxFuture<'a, ()> {
///         Box::pin(async move {
///             if req.get_header("Authorization").is_some() {
///                 chain.next(req, res).await;
///             } else {
///                 res.status = 401;
///             }
///         })
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Processes the request, optionally continuing the chain.
    fn apply<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        chain: FilterChain<'a>,
    ) -> BoxFuture<'a, ()>;
}

/// The remainder of a filter chain plus its target handler.
///
/// Filters are kept in up to three stages (router, service, route) and run
/// stage by stage in registration order. [`FilterChain::next`] consumes the
/// chain, so each filter and the handler are reached at most once per
/// request:
///
/// ```compile_fail
/// use oxide_rest::{FilterChain, Request, Response};
///
/// fn twice(chain: FilterChain<'_>, req: &mut Request, res: &mut Response) {
///     let _ = chain.next(req, res);
///     let _ = chain.next(req, res);
/// }
/// ```
pub struct FilterChain<'a> {
    stages: [&'a [Arc<dyn Filter>]; 3],
    index: usize,
    target: &'a Handler,
}

impl<'a> FilterChain<'a> {
    /// Creates a chain over a single list of filters.
    #[must_use]
    pub fn new(filters: &'a [Arc<dyn Filter>], target: &'a Handler) -> Self {
        Self::layered([filters, &[], &[]], target)
    }

    pub(crate) const fn layered(stages: [&'a [Arc<dyn Filter>]; 3], target: &'a Handler) -> Self {
        Self {
            stages,
            index: 0,
            target,
        }
    }

    /// Returns the number of filters not yet reached.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.stages.iter().map(|s| s.len()).sum::<usize>() - self.index
    }

    fn current(&self) -> Option<&'a Arc<dyn Filter>> {
        let mut index = self.index;
        for stage in self.stages {
            if let Some(filter) = stage.get(index) {
                return Some(filter);
            }
            index -= stage.len();
        }
        None
    }

    /// Runs the next filter, or the handler once every filter has run.
    ///
    /// Headers set on `res` before the handler runs survive unless the
    /// handler's response sets the same header, compared case-insensitively.
    pub fn next<'r>(self, req: &'r mut Request, res: &'r mut Response) -> BoxFuture<'r, ()>
    where
        'a: 'r,
    {
        match self.current() {
            Some(filter) => {
                let rest = Self {
                    index: self.index + 1,
                    ..self
                };
                filter.apply(req, res, rest)
            }
            None => {
                let target = self.target;
                Box::pin(async move {
                    let produced = target(req.clone()).await;
                    res.status = produced.status;
                    res.body = produced.body;
                    for (name, value) in produced.headers {
                        res.set_header(name, value);
                    }
                })
            }
        }
    }
}

/// What a synchronous filter decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Continue to the next filter/handler.
    Continue,
    /// Stop processing; the response is final.
    Stop,
}

/// A filter built from a synchronous closure.
///
/// The closure may edit the request and response, then decides whether the
/// chain continues.
pub struct FnFilter<F> {
    name: &'static str,
    f: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&mut Request, &mut Response) -> FilterAction + Send + Sync,
{
    /// Wraps a closure; `name` identifies the filter in logs.
    pub const fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&mut Request, &mut Response) -> FilterAction + Send + Sync,
{
    fn apply<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        chain: FilterChain<'a>,
    ) -> BoxFuture<'a, ()> {
        match (self.f)(req, res) {
            FilterAction::Continue => chain.next(req, res),
            FilterAction::Stop => {
                debug!(filter = self.name, status = res.status, "filter stopped the chain");
                Box::pin(async {})
            }
        }
    }
}

/// Filter that logs requests and their responses.
pub struct LoggingFilter;

impl Filter for LoggingFilter {
    fn apply<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        chain: FilterChain<'a>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            info!(method = %req.method, path = %req.path, "--> request");
            chain.next(req, res).await;
            info!(status = res.status, "<-- response");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Record {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Filter for Record {
        fn apply<'a>(
            &'a self,
            req: &'a mut Request,
            res: &'a mut Response,
            chain: FilterChain<'a>,
        ) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                self.log.lock().unwrap().push(self.label);
                chain.next(req, res).await;
            })
        }
    }

    fn recorder(label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<dyn Filter> {
        Arc::new(Record {
            label,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn test_chain_runs_stages_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let outer = vec![recorder("router", &log)];
        let middle = vec![recorder("service-1", &log), recorder("service-2", &log)];
        let inner = vec![recorder("route", &log)];
        let handler_log = Arc::clone(&log);
        let target = handler(move |_req| {
            let log = Arc::clone(&handler_log);
            async move {
                log.lock().unwrap().push("handler");
                Response::text("done")
            }
        });

        let chain = FilterChain::layered([&outer, &middle, &inner], &target);
        assert_eq!(chain.remaining(), 4);

        let mut req = Request::get("/");
        let mut res = Response::ok();
        chain.next(&mut req, &mut res).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["router", "service-1", "service-2", "route", "handler"]
        );
        assert_eq!(res.body_string(), Some("done".to_string()));
    }

    #[tokio::test]
    async fn test_fn_filter_stop_skips_handler() {
        let filters: Vec<Arc<dyn Filter>> = vec![Arc::new(FnFilter::new(
            "deny",
            |_req: &mut Request, res: &mut Response| {
                res.status = 403;
                FilterAction::Stop
            },
        ))];
        let target = handler(|_req| async { Response::text("unreachable") });

        let mut req = Request::get("/");
        let mut res = Response::ok();
        FilterChain::new(&filters, &target)
            .next(&mut req, &mut res)
            .await;

        assert_eq!(res.status, 403);
        assert!(res.body.is_empty());
    }

    #[tokio::test]
    async fn test_filter_headers_survive_handler() {
        let filters: Vec<Arc<dyn Filter>> = vec![Arc::new(FnFilter::new(
            "tag",
            |_req: &mut Request, res: &mut Response| {
                res.headers.insert("X-Filter".to_string(), "yes".to_string());
                FilterAction::Continue
            },
        ))];
        let target = handler(|req| async move { Response::text(req.path) });

        let mut req = Request::get("/echo");
        let mut res = Response::ok();
        FilterChain::new(&filters, &target)
            .next(&mut req, &mut res)
            .await;

        assert_eq!(res.get_header("X-Filter"), Some("yes"));
        assert_eq!(res.body_string(), Some("/echo".to_string()));
    }
    #[tokio::test]
    async fn test_handler_header_replaces_preset_ignoring_case() {
        let target = handler(|_req| async {
            Response::ok().header("content-type", "text/csv").body("a,b")
        });

        let mut req = Request::get("/");
        let mut res = Response::ok().header("Content-Type", "application/json");
        FilterChain::new(&[], &target).next(&mut req, &mut res).await;

        let content_types: Vec<_> = res
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(res.get_header("Content-Type"), Some("text/csv"));
    }
}
