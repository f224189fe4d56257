//! Scope modeling and authorization helpers.

// crates.io
use serde::{Serializer, ser::SerializeSeq};
// self
use crate::{_prelude::*, verify::ClaimSet};

/// Claim that carries the caller's granted permissions.
pub const PERMISSIONS_CLAIM: &str = "permissions";

/// Deduplicated set of scope strings.
///
/// Scopes keep the order of their first appearance in the claim. Membership is exact:
/// no prefix, wildcard, or case folding is applied.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
}
impl ScopeSet {
	/// Derives the scope set granted by verified claims.
	///
	/// Only the `permissions` claim is read. When it is an array, every non-empty string
	/// element is collected and other element types are skipped; any other shape yields
	/// an empty set.
	pub fn from_claims(claims: &ClaimSet) -> Self {
		let mut scopes = Vec::<String>::new();

		if let Some(Value::Array(values)) = claims.get(PERMISSIONS_CLAIM) {
			for scope in values.iter().filter_map(Value::as_str) {
				if !scope.is_empty() && !scopes.iter().any(|seen| seen == scope) {
					scopes.push(scope.to_owned());
				}
			}
		}

		Self { scopes: Arc::from(scopes) }
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the set contains exactly `scope`.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in claim order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.scopes).finish()
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}

/// Derives the scope set granted by verified claims. See [`ScopeSet::from_claims`].
pub fn extract_scopes(claims: &ClaimSet) -> ScopeSet {
	ScopeSet::from_claims(claims)
}

/// Returns `true` iff `required` is an exact member of `scopes`.
pub fn authorize(scopes: &ScopeSet, required: &str) -> bool {
	scopes.contains(required)
}

/// Like [`authorize`], but surfaces a failure as [`Error::InsufficientScope`].
pub fn require_scope(scopes: &ScopeSet, required: &str) -> Result<()> {
	if authorize(scopes, required) {
		Ok(())
	} else {
		Err(Error::InsufficientScope { required: required.to_owned() })
	}
}
