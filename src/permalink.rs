//! Canonical URLs for routes, looked up by route id.
//!
//! The host owns URL generation (home URL, rewrite rules, locale plugins) and
//! plugs it in through [`UrlGenerator`]. Generators are allowed to change the
//! scheme, host or query of what they produce, but not the path: when the
//! generated path differs from `home path + route path` the builder puts the
//! expected path back.
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use url::Url;
//! use xpress_mvc::permalink::{PermalinkBuilder, UrlGenerator};
//! use xpress_mvc::{RouteOptions, RouteTable};
//!
//! struct LocalePrefix;
//!
//! impl UrlGenerator for LocalePrefix {
//!     fn absolute_url(&self, path: &str) -> String {
//!         format!("https://example.com/pt-br{path}")
//!     }
//! }
//!
//! let mut table = RouteTable::new();
//! table
//!     .register("/about", Method::GET, "__return_null", RouteOptions::new().route_id("about"))
//!     .unwrap();
//!
//! let builder = PermalinkBuilder::new(Url::parse("https://example.com").unwrap())
//!     .with_generator(Arc::new(LocalePrefix));
//! assert_eq!(
//!     builder.get_route_permalink(&table, "about").as_deref(),
//!     Some("https://example.com/about")
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::router::{fill_placeholders, RouteTable};

/// Produces the public absolute URL for a site-relative path.
pub trait UrlGenerator: Send + Sync {
    fn absolute_url(&self, path: &str) -> String;
}

/// Default generator: appends the path to a fixed home URL.
#[derive(Debug, Clone)]
pub struct HomeUrl {
    base: Url,
}

impl HomeUrl {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl UrlGenerator for HomeUrl {
    fn absolute_url(&self, path: &str) -> String {
        join(&self.base, path).to_string()
    }
}

/// Builds permalinks from a [`RouteTable`] and a [`UrlGenerator`].
#[derive(Clone)]
pub struct PermalinkBuilder {
    home_url: Url,
    generator: Arc<dyn UrlGenerator>,
}

impl PermalinkBuilder {
    /// Builder using [`HomeUrl`] over `home_url`.
    #[must_use]
    pub fn new(home_url: Url) -> Self {
        let generator = Arc::new(HomeUrl::new(home_url.clone()));
        Self {
            home_url,
            generator,
        }
    }

    /// Replace the URL generator. `home_url` stays the reference for the
    /// path check.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn UrlGenerator>) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn home_url(&self) -> &Url {
        &self.home_url
    }

    /// Absolute URL for the path owning `route_id`, or `None` when no route
    /// carries that id. Paths with `{placeholder}` segments also give `None`;
    /// use [`get_route_permalink_with`](Self::get_route_permalink_with) for
    /// those.
    #[must_use]
    pub fn get_route_permalink(&self, table: &RouteTable, route_id: &str) -> Option<String> {
        self.get_route_permalink_with(table, route_id, &[])
    }

    /// Like [`get_route_permalink`](Self::get_route_permalink) with
    /// `{placeholder}` segments filled from `params` and percent-encoded.
    /// `None` when the id is unknown or a placeholder has no value.
    #[must_use]
    pub fn get_route_permalink_with(
        &self,
        table: &RouteTable,
        route_id: &str,
        params: &[(&str, &str)],
    ) -> Option<String> {
        let pattern = table.find_by_id(route_id)?;
        let Some(path) = fill_placeholders(pattern, |name| {
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        }) else {
            debug!(route_id = %route_id, path = %pattern, "Missing placeholder value");
            return None;
        };
        Some(self.build(&path))
    }

    fn build(&self, path: &str) -> String {
        let generated = self.generator.absolute_url(path);
        let expected = join(&self.home_url, path);

        match Url::parse(&generated) {
            Ok(mut url) => {
                if url.path() != expected.path() {
                    debug!(
                        generated = %generated,
                        expected_path = %expected.path(),
                        "URL generator altered the route path, restoring it"
                    );
                    url.set_path(expected.path());
                }
                url.to_string()
            }
            Err(err) => {
                warn!(
                    generated = %generated,
                    error = %err,
                    "URL generator returned an unparseable URL, using home URL"
                );
                expected.to_string()
            }
        }
    }
}

impl fmt::Debug for PermalinkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermalinkBuilder")
            .field("home_url", &self.home_url.as_str())
            .finish_non_exhaustive()
    }
}

/// `base` with `path` appended to its path; query and fragment dropped.
fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}{path}"));
    url.set_query(None);
    url.set_fragment(None);
    url
}
