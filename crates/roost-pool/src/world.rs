//! The scene world: instance storage and the kind registry.
//!
//! [`SceneWorld`] is the pool engine's spatial/world collaborator. It owns
//! every live [`Instance`] in slot storage behind generational
//! [`InstanceId`]s (free indices are recycled FIFO so generations spread out
//! over time rather than concentrating on a hot index), and it owns the
//! registry of constructible [`InstanceKind`]s.
//!
//! A kind is registered by name with a *prototype* -- the class-default state
//! every constructed instance starts from -- and an optional
//! [`Poolable`] hook implementation. Construction clones the prototype and
//! assigns a stable per-kind serial name (`"Bullet_3"`), which is the key the
//! pools track instances under.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::warn;

use crate::instance::{ActorState, Instance, InstanceId, Transform};
use crate::poolable::Poolable;

// ---------------------------------------------------------------------------
// InstanceKind
// ---------------------------------------------------------------------------

/// A constructible entity kind: a name, the prototype new instances are
/// cloned from, and the optional pooling hooks its payload logic implements.
#[derive(Clone)]
pub struct InstanceKind {
    name: String,
    prototype_actor: Option<ActorState>,
    hooks: Option<Arc<dyn Poolable>>,
}

impl InstanceKind {
    /// A plain object-like kind with no spatial presence.
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prototype_actor: None,
            hooks: None,
        }
    }

    /// An actor-like kind whose instances start from the given class-default
    /// state.
    pub fn actor(name: impl Into<String>, prototype: ActorState) -> Self {
        Self {
            name: name.into(),
            prototype_actor: Some(prototype),
            hooks: None,
        }
    }

    /// Attach a [`Poolable`] hook implementation to this kind.
    pub fn with_hooks(mut self, hooks: Arc<dyn Poolable>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// The kind's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether instances of this kind are actor-like.
    pub fn is_actor(&self) -> bool {
        self.prototype_actor.is_some()
    }

    /// The kind's hooks, if payload logic declared the poolable capability.
    pub fn hooks(&self) -> Option<&Arc<dyn Poolable>> {
        self.hooks.as_ref()
    }

    fn instantiate(&self, name: String) -> Instance {
        Instance {
            name,
            kind: self.name.clone(),
            construction_pending: false,
            actor: self.prototype_actor.clone(),
        }
    }
}

impl std::fmt::Debug for InstanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceKind")
            .field("name", &self.name)
            .field("is_actor", &self.is_actor())
            .field("has_hooks", &self.hooks.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SceneWorld
// ---------------------------------------------------------------------------

/// Owns all live instances and the kind registry.
///
/// Destroying an instance bumps its slot's generation, so any outstanding
/// [`InstanceId`] for it becomes stale and every operation on it degrades to
/// a checked no-op.
pub struct SceneWorld {
    kinds: HashMap<String, InstanceKind>,
    /// Current generation for each slot.
    generations: Vec<u32>,
    /// Slot storage; `None` marks a dead slot.
    slots: Vec<Option<Instance>>,
    /// Free-list of recyclable slot indices (FIFO).
    free_indices: VecDeque<u32>,
    /// Per-kind serial counters for name generation.
    serials: HashMap<String, u64>,
}

impl SceneWorld {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
            generations: Vec::new(),
            slots: Vec::new(),
            free_indices: VecDeque::new(),
            serials: HashMap::new(),
        }
    }

    // -- kind registry ------------------------------------------------------

    /// Register a constructible kind. Re-registering a name replaces the
    /// previous kind and is logged.
    pub fn register_kind(&mut self, kind: InstanceKind) {
        let name = kind.name().to_owned();
        if self.kinds.insert(name.clone(), kind).is_some() {
            warn!(kind = %name, "re-registered kind, replacing previous prototype");
        }
    }

    /// Look up a registered kind by name.
    pub fn kind(&self, name: &str) -> Option<&InstanceKind> {
        self.kinds.get(name)
    }

    /// Whether a kind with this name is registered.
    pub fn has_kind(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Names of all registered kinds, sorted for stable diagnostics.
    pub fn kind_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.kinds.keys().cloned().collect();
        names.sort();
        names
    }

    // -- construction / destruction -----------------------------------------

    /// Construct a fresh instance of `kind` from its prototype.
    ///
    /// Returns `None` (and logs) if the kind is not registered. Construction
    /// itself cannot fail: the prototype is cloned and a serial name
    /// assigned.
    pub fn spawn(&mut self, kind: &str) -> Option<InstanceId> {
        let Some(kind_entry) = self.kinds.get(kind) else {
            warn!(kind, "cannot construct instance of unregistered kind");
            return None;
        };
        let serial = self.serials.entry(kind.to_owned()).or_insert(0);
        *serial += 1;
        let instance = kind_entry.instantiate(format!("{kind}_{serial}"));

        let id = if let Some(index) = self.free_indices.pop_front() {
            // Reuse recycled slot -- generation was already bumped on destroy.
            self.slots[index as usize] = Some(instance);
            InstanceId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.slots.push(Some(instance));
            InstanceId::new(index, 0)
        };
        Some(id)
    }

    /// Destroy an instance, incrementing the generation for its slot so that
    /// any outstanding handles become stale.
    ///
    /// Returns `true` if the instance was alive and is now destroyed,
    /// `false` if it was already dead or the handle was stale.
    pub fn destroy(&mut self, id: InstanceId) -> bool {
        let idx = id.index() as usize;
        if idx >= self.generations.len() || self.generations[idx] != id.generation() {
            return false;
        }
        if self.slots[idx].is_none() {
            return false;
        }
        self.slots[idx] = None;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.index());
        true
    }

    /// Returns `true` if `id` refers to a currently live instance.
    pub fn is_alive(&self, id: InstanceId) -> bool {
        let idx = id.index() as usize;
        idx < self.generations.len()
            && self.generations[idx] == id.generation()
            && self.slots[idx].is_some()
    }

    /// Total number of currently live instances.
    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    // -- access -------------------------------------------------------------

    /// Shared access to a live instance; `None` for stale/dead handles.
    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        let idx = id.index() as usize;
        if idx >= self.generations.len() || self.generations[idx] != id.generation() {
            return None;
        }
        self.slots[idx].as_ref()
    }

    /// Mutable access to a live instance; `None` for stale/dead handles.
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        let idx = id.index() as usize;
        if idx >= self.generations.len() || self.generations[idx] != id.generation() {
            return None;
        }
        self.slots[idx].as_mut()
    }

    // -- spatial / ownership ------------------------------------------------

    /// Set an actor-like instance's world placement.
    ///
    /// Returns `false` for stale handles and object-like instances.
    pub fn set_transform(&mut self, id: InstanceId, transform: &Transform) -> bool {
        match self.get_mut(id).and_then(|i| i.actor.as_mut()) {
            Some(actor) => {
                actor.transform = transform.clone();
                true
            }
            None => false,
        }
    }

    /// Set an actor-like instance's ownership metadata.
    pub fn set_ownership(
        &mut self,
        id: InstanceId,
        owner: Option<InstanceId>,
        instigator: Option<InstanceId>,
    ) -> bool {
        match self.get_mut(id).and_then(|i| i.actor.as_mut()) {
            Some(actor) => {
                actor.owner = owner;
                actor.instigator = instigator;
                true
            }
            None => false,
        }
    }
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
