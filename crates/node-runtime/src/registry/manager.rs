//! Stateful modules with per-phase ordering.

use super::{Phase, RegistryError, Router};
use shared_types::{
    AppModule, AppState, Context, ModuleError, RequestBeginBlock,
    RequestEndBlock, ValidatorUpdate,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Ordered collection of [`AppModule`]s.
pub struct ModuleManager {
    modules: BTreeMap<&'static str, Arc<dyn AppModule>>,
    /// Registration order.
    order: Vec<&'static str>,
    phase_orders: HashMap<Phase, Vec<&'static str>>,
}

impl ModuleManager {
    /// # Panics
    ///
    /// Panics if two modules share a name.
    #[must_use]
    pub fn new(modules: Vec<Arc<dyn AppModule>>) -> Self {
        match Self::try_new(modules) {
            Ok(manager) => manager,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(modules: Vec<Arc<dyn AppModule>>) -> Result<Self, RegistryError> {
        let mut by_name = BTreeMap::new();
        let mut order = Vec::with_capacity(modules.len());
        for module in modules {
            let name = module.name();
            if by_name.insert(name, module).is_some() {
                return Err(RegistryError::DuplicateModule(name.to_string()));
            }
            order.push(name);
        }
        Ok(Self {
            modules: by_name,
            order,
            phase_orders: HashMap::new(),
        })
    }

    /// # Panics
    ///
    /// Panics unless `names` is a permutation of the registered names.
    pub fn set_phase_order(&mut self, phase: Phase, names: &[&str]) {
        if let Err(e) = self.try_set_phase_order(phase, names) {
            panic!("{}", e);
        }
    }

    pub fn try_set_phase_order(&mut self, phase: Phase, names: &[&str]) -> Result<(), RegistryError> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::with_capacity(names.len());
        for name in names {
            let Some((&registered, _)) = self.modules.get_key_value(*name) else {
                return Err(RegistryError::UnknownModule {
                    phase,
                    name: name.to_string(),
                });
            };
            if !seen.insert(registered) {
                return Err(RegistryError::DuplicateInOrder {
                    phase,
                    name: name.to_string(),
                });
            }
            order.push(registered);
        }
        if let Some(missing) = self.order.iter().find(|n| !seen.contains(*n)) {
            return Err(RegistryError::MissingModule {
                phase,
                name: missing.to_string(),
            });
        }

        debug!(%phase, order = ?order, "[registry] phase order set");
        self.phase_orders.insert(phase, order);
        Ok(())
    }

    pub fn set_order_begin_blockers(&mut self, names: &[&str]) {
        self.set_phase_order(Phase::BeginBlock, names);
    }

    pub fn set_order_end_blockers(&mut self, names: &[&str]) {
        self.set_phase_order(Phase::EndBlock, names);
    }

    pub fn set_order_init_genesis(&mut self, names: &[&str]) {
        self.set_phase_order(Phase::InitGenesis, names);
    }

    pub fn set_order_export_genesis(&mut self, names: &[&str]) {
        self.set_phase_order(Phase::ExportGenesis, names);
    }

    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    /// Module names in `phase` order. Export falls back to the init order,
    /// everything else to registration order.
    pub fn phase_names(&self, phase: Phase) -> &[&'static str] {
        if let Some(order) = self.phase_orders.get(&phase) {
            return order;
        }
        match phase {
            Phase::ExportGenesis => self.phase_names(Phase::InitGenesis),
            _ => &self.order,
        }
    }

    pub fn module(&self, name: &str) -> Option<&Arc<dyn AppModule>> {
        self.modules.get(name)
    }

    pub fn iter_default(&self) -> impl Iterator<Item = &Arc<dyn AppModule>> + '_ {
        self.visit(&self.order)
    }

    pub fn iter_phase(&self, phase: Phase) -> impl Iterator<Item = &Arc<dyn AppModule>> + '_ {
        self.visit(self.phase_names(phase))
    }

    fn visit<'s>(&'s self, names: &'s [&'static str]) -> impl Iterator<Item = &'s Arc<dyn AppModule>> + 's {
        names.iter().filter_map(move |name| self.modules.get(*name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // =========================================================================
    // ASSEMBLY
    // =========================================================================

    /// Message router and query router, in registration order.
    pub fn build_routers(&self) -> Result<(Router, Router), RegistryError> {
        let mut msgs = Router::new("msg");
        let mut queries = Router::new("querier");
        for module in self.iter_default() {
            if let Some(route) = module.route() {
                msgs.add_route(route, Arc::clone(module))?;
            }
            if let Some(route) = module.querier_route() {
                queries.add_route(route, Arc::clone(module))?;
            }
        }
        Ok((msgs, queries))
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Import every module blob present in `state`, in init order. At most one
    /// module may return validator updates.
    pub fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &AppState,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let mut updates: Option<(&'static str, Vec<ValidatorUpdate>)> = None;
        for module in self.iter_phase(Phase::InitGenesis) {
            let Some(genesis) = state.get(module.name()) else {
                debug!(module = module.name(), "[registry] no genesis state, skipped");
                continue;
            };
            let returned = module.init_genesis(ctx, genesis)?;
            updates = merge_updates(updates, module.name(), returned)?;
        }
        Ok(updates.map(|(_, u)| u).unwrap_or_default())
    }

    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<AppState, ModuleError> {
        let mut state = AppState::new();
        for module in self.iter_phase(Phase::ExportGenesis) {
            state.insert(module.name(), module.export_genesis(ctx)?);
        }
        Ok(state)
    }

    pub fn begin_block(&self, ctx: &mut Context<'_>, req: &RequestBeginBlock) -> Result<(), ModuleError> {
        for module in self.iter_phase(Phase::BeginBlock) {
            module.begin_block(ctx, req)?;
        }
        Ok(())
    }

    pub fn end_block(
        &self,
        ctx: &mut Context<'_>,
        req: &RequestEndBlock,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let mut updates = None;
        for module in self.iter_phase(Phase::EndBlock) {
            let returned = module.end_block(ctx, req)?;
            updates = merge_updates(updates, module.name(), returned)?;
        }
        Ok(updates.map(|(_, u)| u).unwrap_or_default())
    }
}

fn merge_updates(
    current: Option<(&'static str, Vec<ValidatorUpdate>)>,
    module: &'static str,
    returned: Vec<ValidatorUpdate>,
) -> Result<Option<(&'static str, Vec<ValidatorUpdate>)>, ModuleError> {
    if returned.is_empty() {
        return Ok(current);
    }
    match current {
        Some((first, _)) => Err(ModuleError::internal(format!(
            "validator updates returned by both {} and {}",
            first, module
        ))
        .into_fatal()),
        None => Ok(Some((module, returned))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AppModuleBasic, GenesisError, Msg};

    struct Basic(&'static str);

    impl AppModuleBasic for Basic {
        fn name(&self) -> &'static str {
            self.0
        }

        fn default_genesis(&self) -> serde_json::Value {
            serde_json::Value::Null
        }

        fn validate_genesis(&self, _genesis: &serde_json::Value) -> Result<(), GenesisError> {
            Ok(())
        }
    }

    struct Stub {
        basic: Basic,
        route: Option<&'static str>,
    }

    impl AppModule for Stub {
        fn basic(&self) -> &dyn AppModuleBasic {
            &self.basic
        }

        fn route(&self) -> Option<&'static str> {
            self.route
        }

        fn handle_msg(&self, _ctx: &mut Context<'_>, _msg: &Msg) -> Result<(), ModuleError> {
            Ok(())
        }

        fn init_genesis(
            &self,
            _ctx: &mut Context<'_>,
            _genesis: &serde_json::Value,
        ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
            Ok(Vec::new())
        }

        fn export_genesis(&self, _ctx: &Context<'_>) -> Result<serde_json::Value, ModuleError> {
            Ok(serde_json::Value::Null)
        }
    }

    fn stub(name: &'static str, route: Option<&'static str>) -> Arc<dyn AppModule> {
        Arc::new(Stub {
            basic: Basic(name),
            route,
        })
    }

    fn cab() -> ModuleManager {
        ModuleManager::new(vec![stub("c", Some("c")), stub("a", Some("a")), stub("b", None)])
    }

    fn visited(manager: &ModuleManager, phase: Phase) -> Vec<&'static str> {
        manager.iter_phase(phase).map(|m| m.name()).collect()
    }

    #[test]
    fn test_default_order_is_registration_order() {
        let manager = cab();
        let names: Vec<_> = manager.iter_default().map(|m| m.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        for phase in Phase::all() {
            assert_eq!(visited(&manager, phase), vec!["c", "a", "b"]);
        }
        // restartable
        assert_eq!(manager.iter_default().count(), 3);
        assert_eq!(manager.iter_default().count(), 3);
    }

    #[test]
    fn test_phase_orders() {
        let mut manager = cab();
        manager.set_order_init_genesis(&["a", "b", "c"]);
        manager.set_order_end_blockers(&["b", "c", "a"]);

        assert_eq!(visited(&manager, Phase::InitGenesis), vec!["a", "b", "c"]);
        assert_eq!(visited(&manager, Phase::ExportGenesis), vec!["a", "b", "c"]);
        assert_eq!(visited(&manager, Phase::EndBlock), vec!["b", "c", "a"]);
        assert_eq!(visited(&manager, Phase::BeginBlock), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_invalid_phase_orders_are_rejected() {
        let mut manager = cab();
        assert!(matches!(
            manager.try_set_phase_order(Phase::BeginBlock, &["a", "b"]),
            Err(RegistryError::MissingModule { .. })
        ));
        assert!(matches!(
            manager.try_set_phase_order(Phase::BeginBlock, &["a", "b", "c", "d"]),
            Err(RegistryError::UnknownModule { .. })
        ));
        assert!(matches!(
            manager.try_set_phase_order(Phase::BeginBlock, &["a", "a", "b", "c"]),
            Err(RegistryError::DuplicateInOrder { .. })
        ));
        assert_eq!(visited(&manager, Phase::BeginBlock), vec!["c", "a", "b"]);
    }

    #[test]
    #[should_panic(expected = "missing module 'c'")]
    fn test_incomplete_order_panics() {
        cab().set_order_begin_blockers(&["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_module_panics() {
        let _ = ModuleManager::new(vec![stub("a", None), stub("a", None)]);
    }

    #[test]
    fn test_routers() {
        let (msgs, queries) = cab().build_routers().unwrap();
        assert_eq!(msgs.routes(), vec!["c", "a"]);
        assert_eq!(msgs.route("c").unwrap().name(), "c");
        assert!(queries.is_empty());

        let clash = ModuleManager::new(vec![stub("a", Some("x")), stub("b", Some("x"))]);
        assert!(matches!(
            clash.build_routers(),
            Err(RegistryError::DuplicateRoute { first: "a", second: "b", .. })
        ));
    }

    #[test]
    fn test_second_validator_update_source_is_fatal() {
        let update = vec![ValidatorUpdate::new("aa", 1)];
        let first = merge_updates(None, "staking", update.clone()).unwrap();
        let kept = merge_updates(first.clone(), "crisis", Vec::new()).unwrap();
        assert_eq!(kept, first);
        assert!(merge_updates(kept, "genutil", update).unwrap_err().fatal);
    }
}
