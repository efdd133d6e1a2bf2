use axum::{
    Router,
    routing::{MethodRouter, get},
};

use crate::{DropboxContext, router_ext::AuthInjector, views};

impl<S> AuthInjector<Router<S>> for DropboxContext
where
    S: Send + Sync + Clone + 'static,
{
    fn inject_into(self, mut router: Router<S>) -> Router<S> {
        tracing::debug!(mount_path = %self.0.mount_path, "adding dropbox routes");

        if let Some(login_path) = self.0.login_path.as_deref() {
            let login: MethodRouter<S> = get(views::login).with_state(self.clone());
            router = router.route(login_path, login);
        }

        let callback: MethodRouter<S> = get(views::callback).with_state(self.clone());
        let logout: MethodRouter<S> = get(views::logout).with_state(self.clone());

        router
            .route(self.callback_path(), callback)
            .route(self.logout_path(), logout)
    }
}
