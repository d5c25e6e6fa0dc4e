use sapwood_program::PredicateRegistry;

/// Query compilation limits and custom predicates.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub(crate) registry: PredicateRegistry,
    /// Maximum nesting depth of the query text (default: 256).
    pub(crate) recursion_limit: Option<u32>,
    /// Maximum parser steps (default: 1,000,000).
    pub(crate) fuel: Option<u32>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            registry: PredicateRegistry::new(),
            recursion_limit: Some(256),
            fuel: Some(1_000_000),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicates the query may call besides the built-in ones.
    pub fn registry(mut self, registry: PredicateRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// `None` disables the limit.
    pub fn recursion_limit(mut self, limit: Option<u32>) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// `None` disables the limit.
    pub fn fuel(mut self, fuel: Option<u32>) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn get_registry(&self) -> &PredicateRegistry {
        &self.registry
    }
    pub fn get_recursion_limit(&self) -> Option<u32> {
        self.recursion_limit
    }
    pub fn get_fuel(&self) -> Option<u32> {
        self.fuel
    }
}
