//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database access goes through async calls on the recipe API for
//! this reason.
//!
//! Protected routes are declared with `where requires "<permission>"`. They are wrapped in a
//! [`PermissionGuardFactory`](crate::middleware::PermissionGuardFactory), which rejects the request before the handler
//! (or any of its extractors) runs.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use drinks_engine::{db_types::RecipeId, recipe_objects::RecipeDraft, RecipeApi, RecipeManagement};
use log::*;

use crate::{
    auth::ClaimSet,
    data_objects::{DeleteResponse, DrinksResponse, HealthResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $bound:path) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $bound:path where requires $permission:literal) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $bound + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::PermissionGuardFactory::new($permission));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(HealthResponse::default())
}

/// Fallback for unknown routes, so that they get the same JSON error shape as everything else.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    debug!("💻️ No route for {} {}", req.method(), req.path());
    Err(ServerError::NoRecordFound(format!("No route for {} {}", req.method(), req.path())))
}

//----------------------------------------------   Drinks  ----------------------------------------------------
route!(drinks => Get "/drinks" impl RecipeManagement);
/// Route handler for the public drinks list.
///
/// Anyone can see which drinks exist and what they look like (ingredient colors and parts), but not what goes in them.
pub async fn drinks<B: RecipeManagement>(api: web::Data<RecipeApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET drinks");
    let summaries = api.summaries().await?;
    Ok(HttpResponse::Ok().json(DrinksResponse::new(summaries)))
}

route!(drinks_detail => Get "/drinks-detail" impl RecipeManagement where requires "get:drinks-detail");
pub async fn drinks_detail<B: RecipeManagement>(
    claims: ClaimSet,
    api: web::Data<RecipeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET drinks-detail for {:?}", claims.subject());
    let recipes = api.recipes().await?;
    Ok(HttpResponse::Ok().json(DrinksResponse::new(recipes)))
}

route!(create_drink => Post "/drinks" impl RecipeManagement where requires "post:drinks");
/// Route handler for creating a drink.
///
/// The body must contain a `title` and a non-empty `ingredients` list (the legacy key `recipe` is also accepted), where
/// every ingredient has a `name`, `color` and a positive number of `parts`. Titles must be unique.
pub async fn create_drink<B: RecipeManagement>(
    claims: ClaimSet,
    body: web::Json<RecipeDraft>,
    api: web::Data<RecipeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST drinks from {:?}", claims.subject());
    let recipe = api.create(body.into_inner()).await.map_err(|e| {
        debug!("💻️ Could not create drink. {e}");
        ServerError::from(e)
    })?;
    info!("💻️ Drink #{} '{}' created", recipe.id, recipe.title);
    Ok(HttpResponse::Ok().json(DrinksResponse::new(vec![recipe])))
}

route!(update_drink => Patch "/drinks/{id}" impl RecipeManagement where requires "patch:drinks");
pub async fn update_drink<B: RecipeManagement>(
    claims: ClaimSet,
    path: web::Path<i64>,
    body: web::Json<RecipeDraft>,
    api: web::Data<RecipeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = RecipeId(path.into_inner());
    debug!("💻️ PATCH drink #{id} from {:?}", claims.subject());
    let recipe = api.update(id, body.into_inner()).await.map_err(|e| {
        debug!("💻️ Could not update drink #{id}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(DrinksResponse::new(vec![recipe])))
}

route!(delete_drink => Delete "/drinks/{id}" impl RecipeManagement where requires "delete:drinks");
pub async fn delete_drink<B: RecipeManagement>(
    claims: ClaimSet,
    path: web::Path<i64>,
    api: web::Data<RecipeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = RecipeId(path.into_inner());
    debug!("💻️ DELETE drink #{id} from {:?}", claims.subject());
    let id = api.delete(id).await.map_err(|e| {
        debug!("💻️ Could not delete drink #{id}. {e}");
        ServerError::from(e)
    })?;
    info!("💻️ Drink #{id} deleted");
    Ok(HttpResponse::Ok().json(DeleteResponse::new(id)))
}
