#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use oxide_rest::{
    BoxFuture, DispatchError, Filter, FilterChain, Request, Resolved, Response, Router, Service,
};

pub async fn ok_handler(_req: Request) -> Response {
    Response::ok()
}

pub fn service(root: &str) -> Service {
    let mut ws = Service::new();
    ws.path(root)
        .unwrap_or_else(|e| panic!("Failed to set root: {root}\nError: {e}"));
    ws
}

pub fn router(services: impl IntoIterator<Item = Service>) -> Router {
    let mut router = Router::new();
    for service in services {
        router.add(service);
    }
    router
}

pub fn resolve<'a>(router: &'a Router, method: &str, path: &str) -> Resolved<'a> {
    router
        .resolve(method, path, None, None)
        .unwrap_or_else(|e| panic!("Failed to resolve: {method} {path}\nError: {e}"))
}

pub fn resolve_err(router: &Router, method: &str, path: &str) -> DispatchError {
    router
        .resolve(method, path, None, None)
        .expect_err(&format!("Expected dispatch error for: {method} {path}"))
}

/// Filter counting its invocations, optionally refusing to continue.
pub struct Counting {
    pub hits: Arc<AtomicUsize>,
    pub pass: bool,
}

impl Counting {
    pub fn passing(hits: &Arc<AtomicUsize>) -> Self {
        Self {
            hits: Arc::clone(hits),
            pass: true,
        }
    }

    pub fn blocking(hits: &Arc<AtomicUsize>) -> Self {
        Self {
            hits: Arc::clone(hits),
            pass: false,
        }
    }
}

impl Filter for Counting {
    fn apply<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        chain: FilterChain<'a>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if self.pass {
                chain.next(req, res).await;
            } else {
                res.status = 403;
            }
        })
    }
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(hits: &Arc<AtomicUsize>) -> usize {
    hits.load(Ordering::SeqCst)
}
