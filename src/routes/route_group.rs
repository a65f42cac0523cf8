use std::marker::PhantomData;

use rocket::{request::FromRequest, route::Route, Build, Rocket};

use crate::middleware::{with_guard, AdminGuard};

/// Routes mounted together behind the request guard `G`.
pub struct RouteGroupWithGuard<G> {
    prefix: String,
    routes: Vec<Route>,
    _guard: PhantomData<fn() -> G>,
}

impl<G> RouteGroupWithGuard<G>
where
    for<'a> G: FromRequest<'a> + Send + Sync + 'static,
{
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            routes: Vec::new(),
            _guard: PhantomData,
        }
    }

    pub fn add_routes(mut self, routes: Vec<Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn attach_to(self, rocket: Rocket<Build>) -> Rocket<Build> {
        rocket.mount(self.prefix, with_guard::<G>(self.routes))
    }
}

pub trait RocketExt {
    fn attach_admin_guard(self, routes: Vec<Route>) -> Self;
}

impl RocketExt for Rocket<Build> {
    fn attach_admin_guard(self, routes: Vec<Route>) -> Self {
        RouteGroupWithGuard::<AdminGuard>::new("/").add_routes(routes).attach_to(self)
    }
}
