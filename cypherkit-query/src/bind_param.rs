//! Named-parameter allocation.
//!
//! A [`BindParam`] hands out parameter names that are unique for its whole
//! lifetime. Builders that must not duplicate names (a parent statement and
//! the subqueries it embeds) share one allocator through a
//! [`SharedBindParam`] handle.

use crate::error::{Error, Result};
use crate::value::Params;
use cypherkit_api::PropertyValue;
use std::cell::{RefCell, RefMut};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::trace;

/// Appended (repeatedly) to a requested name until it is free.
pub const COLLISION_SUFFIX: &str = "__aaaa";

#[derive(Debug, Clone, Default)]
pub struct BindParam {
    params: Params,
    // Synthesized identifiers: never parameters, but never handed out twice.
    reserved: HashSet<String>,
}

impl BindParam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an allocator; colliding names are suffixed like [`BindParam::add`].
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<PropertyValue>,
    {
        let mut bind_param = Self::new();
        for (name, value) in params {
            bind_param.add(name.as_ref(), value);
        }
        bind_param
    }

    /// Registers `value` under `name`, or under `name` plus as many
    /// [`COLLISION_SUFFIX`]es as needed when `name` is taken. Returns the
    /// name actually used; an existing value is never overwritten.
    pub fn add(&mut self, name: &str, value: impl Into<PropertyValue>) -> String {
        let actual = self.unique_name(name);
        if actual != name {
            trace!(requested = name, actual = %actual, "bind parameter name taken");
        }
        self.params.insert(actual.clone(), value);
        actual
    }

    /// Returns a name starting with `prefix` that is neither registered nor
    /// reserved. Nothing is registered.
    pub fn unique_name(&self, prefix: &str) -> String {
        let mut name = prefix.to_string();
        while self.is_taken(&name) {
            name.push_str(COLLISION_SUFFIX);
        }
        name
    }

    /// Allocates a unique name for a synthetic parameter such as `limit`.
    pub fn unique_name_and_add(&mut self, prefix: &str, value: impl Into<PropertyValue>) -> String {
        self.add(prefix, value)
    }

    /// Allocates a unique name that is not a parameter, e.g. an identifier
    /// synthesized for an anonymous pattern. Reserved names do not appear in
    /// [`BindParam::get`].
    pub fn reserve_unique_name(&mut self, prefix: &str) -> String {
        let name = self.unique_name(prefix);
        self.reserved.insert(name.clone());
        name
    }

    /// Drops the given parameters. Removed names may be handed out again.
    pub fn remove<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.params.remove(name.as_ref());
        }
    }

    /// Snapshot of every registered parameter.
    pub fn get(&self) -> Params {
        self.params.clone()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn is_taken(&self, name: &str) -> bool {
        self.params.contains_key(name) || self.reserved.contains(name)
    }
}

/// Cloneable handle to one [`BindParam`].
///
/// Clones share the same allocator; two handles created independently never
/// do, even when their contents are equal.
#[derive(Debug, Clone, Default)]
pub struct SharedBindParam(Rc<RefCell<BindParam>>);

impl SharedBindParam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both handles point at the same allocator instance.
    pub fn same_as(&self, other: &SharedBindParam) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Snapshot of every registered parameter.
    pub fn get(&self) -> Params {
        self.0.borrow().get()
    }

    /// Runs `f` with mutable access to the allocator.
    ///
    /// Fails with [`Error::Composition`] when called from inside another
    /// `with` on the same allocator.
    pub fn with<R>(&self, f: impl FnOnce(&mut BindParam) -> R) -> Result<R> {
        Ok(f(&mut *self.try_borrow_mut()?))
    }

    pub(crate) fn try_borrow_mut(&self) -> Result<RefMut<'_, BindParam>> {
        self.0
            .try_borrow_mut()
            .map_err(|_| Error::Composition("bind parameters are already in use".to_string()))
    }
}

impl From<BindParam> for SharedBindParam {
    fn from(bind_param: BindParam) -> Self {
        SharedBindParam(Rc::new(RefCell::new(bind_param)))
    }
}

#[cfg(test)]
mod tests {
    use super::{BindParam, SharedBindParam};
    use crate::error::Error;
    use cypherkit_api::PropertyValue;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn add_suffixes_instead_of_overwriting() {
        let mut bp = BindParam::new();
        assert_eq!(bp.add("id", 1i64), "id");
        assert_eq!(bp.add("id", 2i64), "id__aaaa");
        assert_eq!(bp.add("id", 3i64), "id__aaaa__aaaa");
        assert_eq!(bp.get().get("id"), Some(&PropertyValue::Int(1)));
        assert_eq!(bp.get().get("id__aaaa"), Some(&PropertyValue::Int(2)));
        assert_eq!(bp.len(), 3);
    }

    #[test]
    fn unique_name_does_not_register() {
        let mut bp = BindParam::new();
        bp.add("limit", 5i64);
        assert_eq!(bp.unique_name("limit"), "limit__aaaa");
        assert_eq!(bp.unique_name("skip"), "skip");
        assert_eq!(bp.len(), 1);
    }

    #[test]
    fn reserved_names_are_unique_but_not_parameters() {
        let mut bp = BindParam::new();
        let first = bp.reserve_unique_name("__n");
        let second = bp.reserve_unique_name("__n");
        assert_eq!(first, "__n");
        assert_eq!(second, "__n__aaaa");
        assert!(bp.is_empty());
        assert_eq!(bp.add("__n", 1i64), "__n__aaaa__aaaa");
    }

    #[test]
    fn from_params_and_remove() {
        let mut bp = BindParam::from_params([("a", 1i64), ("a", 2i64)]);
        assert!(bp.contains("a"));
        assert!(bp.contains("a__aaaa"));
        bp.remove(["a"]);
        assert!(!bp.contains("a"));
        assert_eq!(bp.unique_name("a"), "a");
    }

    #[test]
    fn shared_handles_compare_by_identity() {
        let a = SharedBindParam::new();
        let b = a.clone();
        let c = SharedBindParam::new();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));

        b.with(|bp| bp.add("x", true)).expect("not borrowed");
        assert_eq!(a.get().get("x"), Some(&PropertyValue::Bool(true)));
        assert!(c.get().is_empty());
    }

    #[test]
    fn nested_borrow_is_a_composition_error() {
        let handle = SharedBindParam::new();
        let _guard = handle.try_borrow_mut().expect("first borrow");
        let err = handle.try_borrow_mut().expect_err("second borrow");
        assert!(err.is_constraint());
    }

    #[test]
    fn nested_with_is_a_composition_error() {
        let handle = SharedBindParam::new();
        let inner = handle.clone();
        let nested = handle
            .with(|_| inner.with(|bp| bp.add("x", 1)))
            .expect("outer borrow");
        assert!(matches!(nested, Err(Error::Composition(_))));
        assert!(handle.get().is_empty());
    }

    proptest! {
        #[test]
        fn returned_names_are_pairwise_distinct(
            names in proptest::collection::vec("[a-c]{1,2}", 0..40)
        ) {
            let mut bp = BindParam::new();
            let mut seen = HashSet::new();
            for (i, name) in names.iter().enumerate() {
                let actual = if i % 2 == 0 {
                    bp.add(name, i as i64)
                } else {
                    bp.unique_name_and_add(name, i as i64)
                };
                prop_assert!(actual.starts_with(name.as_str()));
                prop_assert!(seen.insert(actual));
            }
            prop_assert_eq!(bp.get().len(), names.len());
        }
    }
}
