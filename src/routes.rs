//! Client routes, guards and navigation state

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::auth::Identity;
use crate::entities::EntityKind;
use crate::error::Error;

/// A screen of the back-office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Privacy,
    Home,
    Dashboard,
    /// The standalone users screen
    Users,
    Entity(EntityKind),
}

impl Route {
    /// Every route the back-office serves
    pub fn all() -> Vec<Route> {
        let mut routes = vec![Route::Login, Route::Privacy, Route::Home, Route::Dashboard, Route::Users];
        routes.extend(EntityKind::ALL.iter().map(|kind| Route::Entity(*kind)));
        routes
    }

    /// Parse a path such as `/entities/child-users`
    pub fn parse(path: &str) -> Result<Route, Error> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Ok(Route::Home),
            "/auth/login" => Ok(Route::Login),
            "/privacy" => Ok(Route::Privacy),
            "/dashboard" => Ok(Route::Dashboard),
            "/users" => Ok(Route::Users),
            other => other
                .strip_prefix("/entities/")
                .and_then(EntityKind::from_slug)
                .map(Route::Entity)
                .ok_or_else(|| Error::not_found(format!("route {}", path))),
        }
    }

    /// The path of this route
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/auth/login".to_string(),
            Route::Privacy => "/privacy".to_string(),
            Route::Home => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Users => "/users".to_string(),
            Route::Entity(kind) => format!("/entities/{}", kind.slug()),
        }
    }

    /// Access requirements of this route
    pub fn guard(&self) -> Guard {
        match self {
            Route::Login | Route::Privacy => Guard::Public,
            Route::Users | Route::Entity(EntityKind::Users) => Guard::Admin,
            _ => Guard::Session,
        }
    }

    /// The entity screen this route renders, if any
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Route::Users => Some(EntityKind::Users),
            Route::Entity(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Who may open a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    Session,
    Admin,
}

/// Outcome of resolving a route against the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The session is still being restored
    Loading,
    Render(Route),
    Redirect {
        to: Route,
        /// Where to return after logging in
        from: Option<Route>,
    },
}

/// Resolve `route` for the given session state
pub fn resolve(route: Route, identity: Option<&Identity>, loading: bool) -> Resolution {
    if route == Route::Home {
        return match identity {
            Some(_) => Resolution::Redirect {
                to: Route::Dashboard,
                from: None,
            },
            None if loading => Resolution::Loading,
            None => Resolution::Redirect {
                to: Route::Login,
                from: Some(route),
            },
        };
    }

    match route.guard() {
        Guard::Public => Resolution::Render(route),
        _ if loading => Resolution::Loading,
        guard => match identity {
            None => Resolution::Redirect {
                to: Route::Login,
                from: Some(route),
            },
            Some(identity) if guard == Guard::Admin && !identity.is_admin => Resolution::Redirect {
                to: Route::Dashboard,
                from: None,
            },
            Some(_) => Resolution::Render(route),
        },
    }
}

#[derive(Debug)]
struct NavState {
    current: Route,
    return_to: Option<Route>,
}

/// Shared navigation state.
///
/// The API gateway uses it to send the user to the login screen on a 401; the
/// login flow uses it to return to the screen that was originally requested.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: Arc<RwLock<NavState>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            state: Arc::new(RwLock::new(NavState {
                current: start,
                return_to: None,
            })),
        }
    }

    /// The route currently shown
    pub fn current(&self) -> Route {
        self.state.read().map(|s| s.current).unwrap_or(Route::Login)
    }

    /// Route to return to after login
    pub fn return_to(&self) -> Option<Route> {
        self.state.read().ok().and_then(|s| s.return_to)
    }

    /// Show `route`
    pub fn navigate(&self, route: Route) {
        debug!(route = %route, "navigate");
        if let Ok(mut state) = self.state.write() {
            state.current = route;
        }
    }

    /// Send the user to the login screen, remembering `from`
    pub fn redirect_to_login(&self, from: Option<Route>) {
        debug!(from = ?from, "redirect to login");
        if let Ok(mut state) = self.state.write() {
            if from.is_some() {
                state.return_to = from;
            }
            state.current = Route::Login;
        }
    }

    /// Leave the login screen for the remembered route, or the dashboard
    pub fn complete_login(&self) -> Route {
        let mut target = Route::Dashboard;
        if let Ok(mut state) = self.state.write() {
            target = state.return_to.take().unwrap_or(Route::Dashboard);
            state.current = target;
        }
        debug!(route = %target, "login complete");
        target
    }

    /// Resolve `route` and follow any redirect
    pub fn open(&self, route: Route, identity: Option<&Identity>, loading: bool) -> Resolution {
        let resolution = resolve(route, identity, loading);
        match &resolution {
            Resolution::Render(route) => self.navigate(*route),
            Resolution::Redirect { to: Route::Login, from } => self.redirect_to_login(*from),
            Resolution::Redirect { to, .. } => self.navigate(*to),
            Resolution::Loading => {}
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(is_admin: bool) -> Identity {
        Identity {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            is_admin,
            iat: None,
            exp: i64::MAX,
        }
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::all() {
            assert_eq!(Route::parse(&route.path()).unwrap(), route);
        }
        assert!(Route::parse("/entities/unknown").is_err());
        assert_eq!(Route::parse("/dashboard/").unwrap(), Route::Dashboard);
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        let route = Route::Entity(EntityKind::LetterExercises);
        assert_eq!(
            resolve(route, None, false),
            Resolution::Redirect {
                to: Route::Login,
                from: Some(route)
            }
        );
        assert_eq!(resolve(Route::Privacy, None, false), Resolution::Render(Route::Privacy));
        assert_eq!(resolve(route, None, true), Resolution::Loading);
    }

    #[test]
    fn admin_routes_bounce_regular_users_to_the_dashboard() {
        let user = identity(false);
        assert_eq!(
            resolve(Route::Users, Some(&user), false),
            Resolution::Redirect {
                to: Route::Dashboard,
                from: None
            }
        );
        let admin = identity(true);
        assert_eq!(resolve(Route::Users, Some(&admin), false), Resolution::Render(Route::Users));
    }

    #[test]
    fn home_goes_to_dashboard() {
        let user = identity(false);
        assert_eq!(
            resolve(Route::Home, Some(&user), false),
            Resolution::Redirect {
                to: Route::Dashboard,
                from: None
            }
        );
    }

    #[test]
    fn login_returns_to_the_requested_route() {
        let navigator = Navigator::default();
        let route = Route::Entity(EntityKind::ChildUsers);
        navigator.open(route, None, false);
        assert_eq!(navigator.current(), Route::Login);

        assert_eq!(navigator.complete_login(), route);
        assert_eq!(navigator.current(), route);
        assert_eq!(navigator.complete_login(), Route::Dashboard);
    }
}
