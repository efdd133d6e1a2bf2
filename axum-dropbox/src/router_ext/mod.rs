use axum::Router;

/// Something that adds its own routes to a router.
pub trait AuthInjector<I> {
    fn inject_into(self, inject: I) -> I;
}

impl<T, I> AuthInjector<I> for &T
where
    T: AuthInjector<I> + Clone,
{
    fn inject_into(self, router: I) -> I {
        <T as AuthInjector<I>>::inject_into(self.clone(), router)
    }
}

pub trait RouterExt: Sized {
    /// Adds the callback, logout and optional login routes of `dropbox`.
    fn with_dropbox<I>(self, dropbox: I) -> Self
    where
        I: AuthInjector<Self>;
}

impl<S> RouterExt for Router<S>
where
    S: Send + Sync + Clone + 'static,
{
    fn with_dropbox<I>(self, dropbox: I) -> Router<S>
    where
        I: AuthInjector<Router<S>>,
    {
        dropbox.inject_into(self)
    }
}
