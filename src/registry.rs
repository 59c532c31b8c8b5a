use std::fmt;

use crate::common::Name;

/// How far a registered printer is visible.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Locality {
	// Dropped when the enclosing scope closes.
	Local,
	#[default]
	Global,
	// Global, and also visible to importers.
	Export,
}

impl fmt::Display for Locality {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local => write!(f, "local"),
			Self::Global => write!(f, "global"),
			Self::Export => write!(f, "export"),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Instance {
	pub inductive: Name,
	// The constant holding the dictionary.
	pub constant: Name,
	pub locality: Locality,
}

/// Printers available to capability resolution, in registration order.
#[derive(Clone, Default, Debug)]
pub struct Registry {
	instances: Vec<Instance>,
}

impl Registry {
	pub fn new() -> Self { Self::default() }

	pub fn register(&mut self, instance: Instance) { self.instances.push(instance) }

	/// Finds the most recently registered printer for `inductive`.
	pub fn find(&self, inductive: Name) -> Option<&Instance> {
		self.instances.iter().rev().find(|instance| instance.inductive == inductive)
	}

	pub fn close_scope(&mut self) { self.instances.retain(|instance| instance.locality != Locality::Local) }

	pub fn exported(&self) -> impl Iterator<Item = &Instance> {
		self.instances.iter().filter(|instance| instance.locality == Locality::Export)
	}

	pub fn len(&self) -> usize { self.instances.len() }

	pub fn is_empty(&self) -> bool { self.instances.is_empty() }
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;

	#[test]
	fn latest_registration_wins() {
		let mut interner = Rodeo::new();
		let [t, first, second] = ["T", "first", "second"].map(|s| interner.get_or_intern(s));
		let mut registry = Registry::new();
		registry.register(Instance { inductive: t, constant: first, locality: Locality::Global });
		registry.register(Instance { inductive: t, constant: second, locality: Locality::Local });
		assert_eq!(registry.find(t).map(|instance| instance.constant), Some(second));
		registry.close_scope();
		assert_eq!(registry.find(t).map(|instance| instance.constant), Some(first));
	}

	#[test]
	fn only_exports_are_exported() {
		let mut interner = Rodeo::new();
		let [t, u, repr_t, repr_u] = ["T", "U", "repr_T", "repr_U"].map(|s| interner.get_or_intern(s));
		let mut registry = Registry::new();
		registry.register(Instance { inductive: t, constant: repr_t, locality: Locality::Export });
		registry.register(Instance { inductive: u, constant: repr_u, locality: Locality::Global });
		assert_eq!(registry.exported().map(|instance| instance.constant).collect::<Vec<_>>(), vec![repr_t]);
		assert_eq!(registry.len(), 2);
	}
}
