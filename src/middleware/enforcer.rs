use std::marker::PhantomData;

use rocket::{
    data::Data,
    request::{self, FromRequest, Request},
    route::{Handler, Outcome},
    Route,
};

/// Wraps a route handler so `G` must succeed before the handler is called.
pub struct Guarded<G> {
    inner: Box<dyn Handler>,
    _guard: PhantomData<fn() -> G>,
}

impl<G> Guarded<G> {
    pub fn new(inner: Box<dyn Handler>) -> Self {
        Self { inner, _guard: PhantomData }
    }
}

impl<G> Clone for Guarded<G> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

#[rocket::async_trait]
impl<G> Handler for Guarded<G>
where
    for<'a> G: FromRequest<'a> + Send + Sync + 'static,
{
    async fn handle<'r>(&self, req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r> {
        match req.guard::<G>().await {
            request::Outcome::Success(_) => {}
            request::Outcome::Error((status, _)) => return Outcome::error(status),
            request::Outcome::Forward(status) => return Outcome::forward(data, status),
        }

        self.inner.handle(req, data).await
    }
}

/// Puts every route in `routes` behind `G`.
pub fn with_guard<G>(routes: Vec<Route>) -> Vec<Route>
where
    for<'a> G: FromRequest<'a> + Send + Sync + 'static,
{
    routes
        .into_iter()
        .map(|mut route| {
            route.handler = Box::new(Guarded::<G>::new(route.handler.clone()));
            route
        })
        .collect()
}
