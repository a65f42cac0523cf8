use std::future::Future;

use rocket::{
    async_trait,
    outcome::Outcome::{Error, Forward, Success},
    request::{FromRequest, Outcome, Request},
};

use crate::{database::deadline, meltdown::*, middleware::*};

/// A record with a single owning user.
pub trait Owned {
    const NAME: &'static str;

    fn owner_id(&self) -> i32;
}

/// An owned record that can be loaded by the id in the request path.
#[async_trait]
pub trait OwnedResource: Owned + Sized + Send + Sync + 'static {
    async fn find(id: i32) -> Result<Option<Self>, MeltDown>;
}

/// Loads the record through `lookup` and lets it through only for its owner or an admin.
pub async fn authorize<E, F, Fut>(user: &AuthUser, id: i32, lookup: F) -> Result<E, MeltDown>
where
    E: Owned,
    F: FnOnce(i32) -> Fut,
    Fut: Future<Output = Result<Option<E>, MeltDown>>,
{
    let record = lookup(id).await?.ok_or_else(|| MeltDown::record_not_found(E::NAME).with_context("id", id.to_string()))?;

    if user.can_modify(record.owner_id()) {
        Ok(record)
    } else {
        Err(MeltDown::insufficient_permissions()
            .with_context("resource", E::NAME)
            .with_context("id", id.to_string())
            .with_context("user_id", user.id.to_string()))
    }
}

/// Guard for `/<collection>/<id>` routes: the caller owns the record (or is an admin).
pub struct Permitted<E> {
    pub user: AuthUser,
    pub record: E,
}

#[async_trait]
impl<'r, E: OwnedResource> FromRequest<'r> for Permitted<E> {
    type Error = MeltDown;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let user = match req.guard::<AuthUser>().await {
            Success(user) => user,
            Error(error) => return Error(error),
            Forward(status) => return Forward(status),
        };

        let id = match path_id(req) {
            Ok(id) => id,
            Err(error) => return reject(req, error),
        };

        match deadline(authorize(&user, id, |id| E::find(id))).await {
            Ok(record) => Success(Permitted { user, record }),
            Err(error) => reject(req, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rocket::{
        catchers, delete,
        http::{Header, Status},
        local::asynchronous::Client,
        routes, State,
    };
    use serde_json::Value;

    use super::*;
    use crate::middleware::jwt::test_support::token_for;

    #[derive(Debug, PartialEq)]
    struct Widget {
        id: i32,
        owner: i32,
    }

    impl Owned for Widget {
        const NAME: &'static str = "Widget";

        fn owner_id(&self) -> i32 {
            self.owner
        }
    }

    #[async_trait]
    impl OwnedResource for Widget {
        async fn find(id: i32) -> Result<Option<Self>, MeltDown> {
            Ok((id == 1).then_some(Widget { id: 1, owner: 7 }))
        }
    }

    struct Deletes(AtomicUsize);

    #[delete("/widgets/<id>")]
    fn delete_widget(id: i32, permitted: Permitted<Widget>, deletes: &State<Deletes>) -> String {
        deletes.0.fetch_add(1, Ordering::SeqCst);
        format!("deleted {} as {}", id, permitted.user.id)
    }

    async fn client() -> Client {
        let rocket = rocket::build()
            .manage(Deletes(AtomicUsize::new(0)))
            .mount("/", routes![delete_widget])
            .register("/", catchers![unauthorized, forbidden, not_found, unprocessable_entity, internal_error]);
        Client::tracked(rocket).await.expect("valid rocket instance")
    }

    fn deletes(client: &Client) -> usize {
        client.rocket().state::<Deletes>().unwrap().0.load(Ordering::SeqCst)
    }

    fn bearer(user_id: i32, role: i32) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", token_for(user_id, role)))
    }

    #[rocket::async_test]
    async fn owner_and_admin_pass() {
        let owner = AuthUser { id: 7, role: 0 };
        let admin = AuthUser { id: 3, role: 1 };

        assert_eq!(authorize(&owner, 1, |id| Widget::find(id)).await.unwrap(), Widget { id: 1, owner: 7 });
        assert!(authorize(&admin, 1, |id| Widget::find(id)).await.is_ok());
    }

    #[rocket::async_test]
    async fn stranger_is_forbidden() {
        let stranger = AuthUser { id: 8, role: 0 };
        let error = authorize(&stranger, 1, |id| Widget::find(id)).await.unwrap_err();
        assert_eq!(error.status_code(), Status::Forbidden);
    }

    #[rocket::async_test]
    async fn missing_record_is_not_found() {
        let admin = AuthUser { id: 3, role: 1 };
        let error = authorize(&admin, 99, |id| Widget::find(id)).await.unwrap_err();
        assert_eq!(error.melt_type, MeltType::RecordNotFound);
        assert_eq!(error.status_code(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn lookup_errors_propagate() {
        let user = AuthUser { id: 7, role: 0 };
        let error = authorize::<Widget, _, _>(&user, 1, |_| async { Err(MeltDown::db_connection("down")) }).await.unwrap_err();
        assert_eq!(error.melt_type, MeltType::DatabaseConnection);
    }

    #[rocket::async_test]
    async fn owner_reaches_the_handler() {
        let client = client().await;
        let response = client.delete("/widgets/1").header(bearer(7, 0)).dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "deleted 1 as 7");
        assert_eq!(deletes(&client), 1);
    }

    #[rocket::async_test]
    async fn admin_reaches_the_handler() {
        let client = client().await;
        let response = client.delete("/widgets/1").header(bearer(3, 1)).dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(deletes(&client), 1);
    }

    #[rocket::async_test]
    async fn stranger_is_rejected_before_the_handler() {
        let client = client().await;
        let response = client.delete("/widgets/1").header(bearer(8, 0)).dispatch().await;

        assert_eq!(response.status(), Status::Forbidden);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["error"]["type"], "InsufficientPermissions");
        assert_eq!(deletes(&client), 0);
    }

    #[rocket::async_test]
    async fn unknown_id_is_rejected_before_the_handler() {
        let client = client().await;
        let response = client.delete("/widgets/99").header(bearer(3, 1)).dispatch().await;

        assert_eq!(response.status(), Status::NotFound);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["error"]["type"], "RecordNotFound");
        assert_eq!(body["error"]["message"], "Widget not found.");
        assert_eq!(deletes(&client), 0);
    }

    #[rocket::async_test]
    async fn anonymous_caller_is_unauthorized() {
        let client = client().await;
        let response = client.delete("/widgets/1").dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(deletes(&client), 0);
    }
}
