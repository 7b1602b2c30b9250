//! Client-side routes and the guard deciding who may visit them.

use crate::SessionStore;
use std::fmt::{self, Display, Formatter};

/// Every view the application knows about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Login,
    Register,
    Subscriptions,
    Projects,
    Settings,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::About,
        Route::Login,
        Route::Register,
        Route::Subscriptions,
        Route::Projects,
        Route::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Subscriptions => "/subscriptions",
            Route::Projects => "/projects",
            Route::Settings => "/settings",
        }
    }

    /// Look up a route by path, ignoring any trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        Route::ALL.iter().copied().find(|route| route.path() == path)
    }

    /// Only logged in users may visit this route.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Projects | Route::Settings)
    }

    /// Logged in users get sent elsewhere when visiting this route.
    pub fn is_guest_only(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What the guard decided.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

/// Decide whether navigating to `route` may go ahead.
pub fn guard(route: Route, store: &SessionStore) -> Navigation {
    let logged_in = store.logged_in();

    if route.is_protected() && !logged_in {
        log::debug!("{} requires a login", route);
        Navigation::Redirect(Route::Login)
    } else if route.is_guest_only() && logged_in {
        Navigation::Redirect(Route::Projects)
    } else {
        Navigation::Allow
    }
}

/// Something which can move the user to another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) { self(route) }
}

/// A [`Navigator`] for headless use, it only logs.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: Route) {
        log::debug!("Navigation to {} requested", route);
    }
}
