use rocket::{
    async_trait,
    outcome::Outcome::{Error, Forward, Success},
    request::{FromRequest, Outcome, Request},
};

use crate::{meltdown::*, middleware::*};

/// Position of `<id>` in `/<collection>/<id>/...` routes mounted at `/`.
pub const ID_SEGMENT: usize = 1;

/// Fails a request guard with `error`. The rendered error is cached on the
/// request so the catcher for its status can answer with the same body.
pub fn reject<T>(req: &Request<'_>, error: MeltDown) -> Outcome<T, MeltDown> {
    error.log();

    let status = error.status_code();
    let detail = ApiErrorDetail::from(&error);
    req.local_cache(move || Some(detail));

    Error((status, error))
}

pub fn path_id(req: &Request<'_>) -> Result<i32, MeltDown> {
    match req.param::<i32>(ID_SEGMENT) {
        Some(Ok(id)) => Ok(id),
        Some(Err(e)) => Err(MeltDown::invalid_input(format!("id must be an integer ({})", e))),
        None => Err(MeltDown::missing_field("id")),
    }
}

pub struct AdminGuard(pub AuthUser);

#[async_trait]
impl<'r> FromRequest<'r> for AdminGuard {
    type Error = MeltDown;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.guard::<AuthUser>().await {
            Success(user) if user.is_admin() => Success(AdminGuard(user)),
            Success(user) => reject(req, MeltDown::new(MeltType::Forbidden, "admin role required").with_context("user_id", user.id.to_string())),
            Error(error) => Error(error),
            Forward(status) => Forward(status),
        }
    }
}

/// The caller is the user named by the `<id>` path segment, or an admin.
pub struct SelfOrAdmin(pub AuthUser);

#[async_trait]
impl<'r> FromRequest<'r> for SelfOrAdmin {
    type Error = MeltDown;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let user = match req.guard::<AuthUser>().await {
            Success(user) => user,
            Error(error) => return Error(error),
            Forward(status) => return Forward(status),
        };

        match path_id(req) {
            Ok(id) if user.can_modify(id) => Success(SelfOrAdmin(user)),
            Ok(id) => reject(req, MeltDown::insufficient_permissions().with_context("user_id", user.id.to_string()).with_context("target_id", id.to_string())),
            Err(error) => reject(req, error),
        }
    }
}
