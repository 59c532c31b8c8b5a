use lasso::Spur;

// de Bruijn index: zero is the innermost enclosing binder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Index(pub usize);

// de Bruijn level: zero is the outermost binder of a context.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Level(pub usize);

impl Level {
	/// Converts a level into the index it has at the point of use.
	pub fn index(self, Level(level): Level) -> Index { Index(self.0 - (level + 1)) }
}

impl std::ops::Add<usize> for Level {
	type Output = Self;
	fn add(self, rhs: usize) -> Self::Output { Self(self.0 + rhs) }
}

pub type Name = Spur;
pub type Label = Option<Name>;

/// A fixed number of binders over a body.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Binder<T, const N: usize = 1> {
	pub parameters: [Label; N],
	pub body: T,
}

impl<T, const N: usize> Binder<T, N> {
	pub fn new(parameters: [Label; N], body: T) -> Self { Self { parameters, body } }

	pub fn map_ref<B, C: From<B>>(&self, f: impl FnOnce(&T) -> B) -> Binder<C, N> {
		Binder { parameters: self.parameters, body: f(&self.body).into() }
	}

	pub fn try_map_ref<B, C: From<B>, E>(&self, f: impl FnOnce(&T) -> Result<B, E>) -> Result<Binder<C, N>, E> {
		Ok(Binder { parameters: self.parameters, body: f(&self.body)?.into() })
	}
}

impl<T> Binder<T, 1> {
	pub fn parameter(&self) -> Label {
		let [parameter] = self.parameters;
		parameter
	}
}

pub fn bind<T, const N: usize>(parameters: [Label; N], body: impl Into<T>) -> Binder<T, N> {
	Binder::new(parameters, body.into())
}

/// Any number of binders over a body; the last parameter is the innermost.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AnyBinder<T> {
	pub parameters: Box<[Label]>,
	pub body: T,
}

impl<T> AnyBinder<T> {
	pub fn new(parameters: Box<[Label]>, body: T) -> Self { Self { parameters, body } }

	pub fn arity(&self) -> usize { self.parameters.len() }

	pub fn map_ref<B, C: From<B>>(&self, f: impl FnOnce(&T) -> B) -> AnyBinder<C> {
		AnyBinder { parameters: self.parameters.clone(), body: f(&self.body).into() }
	}

	pub fn try_map_ref<B, C: From<B>, E>(&self, f: impl FnOnce(&T) -> Result<B, E>) -> Result<AnyBinder<C>, E> {
		Ok(AnyBinder { parameters: self.parameters.clone(), body: f(&self.body)?.into() })
	}
}

pub fn any_bind<T>(parameters: impl Into<Box<[Label]>>, body: impl Into<T>) -> AnyBinder<T> {
	AnyBinder::new(parameters.into(), body.into())
}
