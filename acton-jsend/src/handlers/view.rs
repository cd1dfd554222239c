//! HTML view role

use axum::{middleware::map_response, Router};

use super::{
    base::BaseHandler,
    role::{initialize, HandlerRole},
};

/// Role for endpoints rendering HTML
#[derive(Debug, Clone, Default)]
pub struct ViewHandler<D = ()> {
    base: BaseHandler<D>,
}

impl<D> HandlerRole for ViewHandler<D> {
    const CONTENT_TYPE: &'static str = "text/html";
}

impl<D> ViewHandler<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Create a view role over the shared handler base
    pub fn new(base: BaseHandler<D>) -> Self {
        Self { base }
    }

    /// The shared handler base
    pub fn base(&self) -> &BaseHandler<D> {
        &self.base
    }

    /// Apply the view initializer to every route of `router`
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(map_response(initialize::<Self>))
    }
}
