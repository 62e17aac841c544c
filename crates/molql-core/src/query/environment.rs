//! Mutable evaluation state for one query.
//!
//! Combinators that iterate (generators, filters, reductions) expose their current element
//! to nested expressions through the [`Environment`] instead of threading it through every
//! call. Each concept is an [`IterationStack`]: entering a scope installs a new current
//! value and leaving it restores the enclosing one, at any depth and under recursion.
//!
//! Prefer the `enter_*` methods, whose [`Scope`] guard restores the prior value when it is
//! dropped, including on early `?` returns and unwinding.

use super::atom_set::AtomSet;
use super::context::{Context, ElementAddress};
use super::error::QueryError;
use super::value::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

/// The current value of one iterable concept plus the values it shadows.
#[derive(Debug, Clone)]
pub struct IterationStack<T> {
    current: Option<T>,
    stack: Vec<Option<T>>,
}

impl<T> Default for IterationStack<T> {
    fn default() -> Self {
        Self {
            current: None,
            stack: Vec::new(),
        }
    }
}

impl<T> IterationStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shadows the current value with `initial`.
    pub fn begin(&mut self, initial: T) {
        let prior = self.current.replace(initial);
        self.stack.push(prior);
    }

    /// Ends the innermost scope, restoring the value it shadowed, and returns the ended value.
    pub fn end(&mut self) -> Option<T> {
        let ended = self.current.take();
        self.current = self.stack.pop().flatten();
        ended
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Identity of one symbol occurrence in an expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSite(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeTarget {
    Element,
    AtomSet,
    Value,
    Slot(CallSite),
}

/// Evaluation state backing one depth-first evaluation over a [`Context`].
#[derive(Debug)]
pub struct Environment<'c, V = Value> {
    context: &'c Context,
    pub element: IterationStack<ElementAddress>,
    pub atom_set: IterationStack<AtomSet>,
    pub value: IterationStack<V>,
    slots: HashMap<CallSite, IterationStack<V>>,
    started: Instant,
    deadline: Option<Instant>,
}

impl<'c, V> Environment<'c, V> {
    pub fn new(context: &'c Context) -> Self {
        Self {
            context,
            element: IterationStack::new(),
            atom_set: IterationStack::new(),
            value: IterationStack::new(),
            slots: HashMap::new(),
            started: Instant::now(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_time_budget(self, budget: Duration) -> Self {
        let deadline = Instant::now() + budget;
        self.with_deadline(deadline)
    }

    pub fn context(&self) -> &'c Context {
        self.context
    }

    /// Fails with [`QueryError::Timeout`] once the deadline has passed. Evaluators poll this
    /// between elements; evaluation is never interrupted otherwise.
    pub fn check_budget(&self) -> Result<(), QueryError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(QueryError::Timeout {
                elapsed: self.started.elapsed(),
            }),
            _ => Ok(()),
        }
    }

    pub fn begin_element(&mut self, address: ElementAddress) {
        self.element.begin(address);
    }

    pub fn end_element(&mut self) -> Option<ElementAddress> {
        self.element.end()
    }

    pub fn begin_atom_set(&mut self, set: AtomSet) {
        self.atom_set.begin(set);
    }

    pub fn end_atom_set(&mut self) -> Option<AtomSet> {
        self.atom_set.end()
    }

    pub fn begin_value(&mut self, value: V) {
        self.value.begin(value);
    }

    pub fn end_value(&mut self) -> Option<V> {
        self.value.end()
    }

    pub fn begin_slot(&mut self, site: CallSite, value: V) {
        self.slots.entry(site).or_default().begin(value);
    }

    pub fn end_slot(&mut self, site: CallSite) -> Option<V> {
        self.slots.get_mut(&site).and_then(IterationStack::end)
    }

    pub fn slot(&self, site: CallSite) -> Option<&V> {
        self.slots.get(&site).and_then(IterationStack::current)
    }

    pub fn slot_mut(&mut self, site: CallSite) -> Option<&mut V> {
        self.slots.get_mut(&site).and_then(IterationStack::current_mut)
    }

    pub fn slot_depth(&self, site: CallSite) -> usize {
        self.slots.get(&site).map_or(0, IterationStack::depth)
    }

    pub fn enter_element(&mut self, address: ElementAddress) -> Scope<'_, 'c, V> {
        self.begin_element(address);
        Scope::new(self, ScopeTarget::Element)
    }

    pub fn enter_atom_set(&mut self, set: AtomSet) -> Scope<'_, 'c, V> {
        self.begin_atom_set(set);
        Scope::new(self, ScopeTarget::AtomSet)
    }

    pub fn enter_value(&mut self, value: V) -> Scope<'_, 'c, V> {
        self.begin_value(value);
        Scope::new(self, ScopeTarget::Value)
    }

    pub fn enter_slot(&mut self, site: CallSite, value: V) -> Scope<'_, 'c, V> {
        self.begin_slot(site, value);
        Scope::new(self, ScopeTarget::Slot(site))
    }

    /// Runs `f` once per visible atom with the current element set to that atom.
    pub fn for_each_atom<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Self) -> Result<(), E>,
        E: From<QueryError>,
    {
        let context = self.context;
        let mut scope = self.enter_element(ElementAddress::default());
        for atom in context.atoms() {
            scope.check_budget()?;
            if let Some(address) = scope.element.current_mut() {
                address.set_atom(context, atom);
            }
            f(&mut *scope)?;
        }
        Ok(())
    }

    /// Runs `f` once per visible residue with the current element set to its first atom.
    pub fn for_each_residue<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Self) -> Result<(), E>,
        E: From<QueryError>,
    {
        let context = self.context;
        let mut scope = self.enter_element(ElementAddress::default());
        for residue in context.residues() {
            scope.check_budget()?;
            if let Some(address) = scope.element.current_mut() {
                address.set_residue(context, residue);
            }
            f(&mut *scope)?;
        }
        Ok(())
    }
}

/// Guard for one open scope; ends it when dropped.
#[derive(Debug)]
pub struct Scope<'e, 'c, V> {
    env: &'e mut Environment<'c, V>,
    target: ScopeTarget,
}

impl<'e, 'c, V> Scope<'e, 'c, V> {
    fn new(env: &'e mut Environment<'c, V>, target: ScopeTarget) -> Self {
        Self { env, target }
    }
}

impl<'c, V> Deref for Scope<'_, 'c, V> {
    type Target = Environment<'c, V>;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl<V> DerefMut for Scope<'_, '_, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}

impl<V> Drop for Scope<'_, '_, V> {
    fn drop(&mut self) {
        match self.target {
            ScopeTarget::Element => {
                self.env.end_element();
            }
            ScopeTarget::AtomSet => {
                self.env.end_atom_set();
            }
            ScopeTarget::Value => {
                self.env.end_value();
            }
            ScopeTarget::Slot(site) => {
                self.env.end_slot(site);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParseOptions;
    use crate::core::parser::parse_cif;
    use std::sync::Arc;

    const SIX_ROWS: &str = "\
data_six
loop_
_atom_site.label_entity_id
_atom_site.auth_asym_id
_atom_site.auth_seq_id
1 A 1
1 A 2
1 A 2
1 A 3
2 B 1
2 B 1
";

    fn context() -> Context {
        let structure = parse_cif(SIX_ROWS, &ParseOptions::default()).unwrap();
        Context::of_model(Arc::clone(&structure.models[0]))
    }

    #[test]
    fn begin_end_at_depth_zero_restores_empty() {
        let mut stack = IterationStack::new();
        assert_eq!(stack.current(), None);

        stack.begin(1);
        assert_eq!(stack.current(), Some(&1));
        assert_eq!(stack.depth(), 1);

        assert_eq!(stack.end(), Some(1));
        assert_eq!(stack.current(), None);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn nested_scopes_restore_prior_values() {
        let mut stack = IterationStack::new();
        stack.begin("outer");
        stack.begin("inner");
        assert_eq!(stack.current(), Some(&"inner"));
        stack.end();
        assert_eq!(stack.current(), Some(&"outer"));
        stack.end();
        assert_eq!(stack.current(), None);
    }

    fn recurse(env: &mut Environment<'_, i32>, site: CallSite, depth: i32, seen: &mut Vec<i32>) {
        let mut scope = env.enter_slot(site, depth);
        if depth < 4 {
            recurse(&mut scope, site, depth + 1, seen);
        }
        seen.push(*scope.slot(site).unwrap());
    }

    #[test]
    fn recursive_self_calls_restore_each_level() {
        let ctx = context();
        let mut env: Environment<'_, i32> = Environment::new(&ctx);
        let site = CallSite(7);
        let mut seen = Vec::new();

        recurse(&mut env, site, 0, &mut seen);

        assert_eq!(seen, vec![4, 3, 2, 1, 0]);
        assert_eq!(env.slot(site), None);
        assert_eq!(env.slot_depth(site), 0);
    }

    #[test]
    fn slots_of_different_call_sites_do_not_collide() {
        let ctx = context();
        let mut env: Environment<'_, i32> = Environment::new(&ctx);
        env.begin_slot(CallSite(1), 10);
        env.begin_slot(CallSite(2), 20);
        if let Some(v) = env.slot_mut(CallSite(1)) {
            *v += 1;
        }

        assert_eq!(env.slot(CallSite(1)), Some(&11));
        assert_eq!(env.end_slot(CallSite(2)), Some(20));
        assert_eq!(env.slot(CallSite(1)), Some(&11));
        assert_eq!(env.end_slot(CallSite(3)), None);
    }

    #[test]
    fn guards_restore_on_error_paths() {
        let ctx = context();
        let mut env: Environment<'_, Value> = Environment::new(&ctx);
        env.begin_value(Value::from(1.0));

        let failing = |env: &mut Environment<'_, Value>| -> Result<(), QueryError> {
            let scope = env.enter_value(Value::from("inner"));
            scope.value.current().unwrap().as_number()?;
            Ok(())
        };

        assert!(failing(&mut env).is_err());
        assert_eq!(env.value.current().unwrap().as_number(), Ok(1.0));
        assert_eq!(env.value.depth(), 1);
    }

    #[test]
    fn element_iteration_visits_visible_atoms() {
        let ctx = Context::of_indices(Arc::clone(context().model()), &[1, 4]);
        let mut env: Environment<'_> = Environment::new(&ctx);
        let mut visited = Vec::new();

        env.for_each_atom(|env| -> Result<(), QueryError> {
            let address = env.element.current().unwrap();
            visited.push((address.atom, address.residue, address.chain));
            Ok(())
        })
        .unwrap();

        assert_eq!(visited, vec![(1, 1, 0), (4, 3, 1)]);
        assert_eq!(env.element.current(), None);
    }

    #[test]
    fn nested_element_iteration_sees_the_nearest_scope() {
        let ctx = context();
        let mut env: Environment<'_> = Environment::new(&ctx);
        let mut pairs = Vec::new();

        env.for_each_residue(|outer| -> Result<(), QueryError> {
            let outer_residue = outer.element.current().unwrap().residue;
            outer.for_each_atom(|inner| -> Result<(), QueryError> {
                let inner_residue = inner.element.current().unwrap().residue;
                if inner_residue == outer_residue {
                    pairs.push((outer_residue, inner.element.current().unwrap().atom));
                }
                Ok(())
            })?;
            assert_eq!(outer.element.current().unwrap().residue, outer_residue);
            Ok(())
        })
        .unwrap();

        assert_eq!(pairs, vec![(0, 0), (1, 1), (1, 2), (2, 3), (3, 4), (3, 5)]);
    }

    #[test]
    fn atom_set_scope_exposes_the_current_set() {
        let ctx = context();
        let mut env: Environment<'_> = Environment::new(&ctx);
        {
            let scope = env.enter_atom_set(AtomSet::new(&ctx, vec![0, 1]));
            assert_eq!(scope.atom_set.current().unwrap().residue_indices(), &[0, 1]);
        }
        assert!(env.atom_set.current().is_none());
    }

    #[test]
    fn expired_deadline_times_out() {
        let ctx = context();
        let env: Environment<'_> =
            Environment::new(&ctx).with_deadline(Instant::now());
        assert!(matches!(env.check_budget(), Err(QueryError::Timeout { .. })));

        let relaxed: Environment<'_> =
            Environment::new(&ctx).with_time_budget(Duration::from_secs(60));
        assert!(relaxed.check_budget().is_ok());
    }
}
