//! Name → module lookup for message and querier routes.

use super::RegistryError;
use shared_types::AppModule;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Route table built once from the module manager. Lookup is by name;
/// [`Router::routes`] lists names in registration order.
pub struct Router {
    kind: &'static str,
    routes: BTreeMap<&'static str, Arc<dyn AppModule>>,
    order: Vec<&'static str>,
}

impl Router {
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            routes: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn add_route(&mut self, route: &'static str, module: Arc<dyn AppModule>) -> Result<(), RegistryError> {
        if let Some(existing) = self.routes.get(route) {
            return Err(RegistryError::DuplicateRoute {
                kind: self.kind,
                route,
                first: existing.name(),
                second: module.name(),
            });
        }
        self.routes.insert(route, module);
        self.order.push(route);
        Ok(())
    }

    pub fn route(&self, route: &str) -> Option<&Arc<dyn AppModule>> {
        self.routes.get(route)
    }

    pub fn routes(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
