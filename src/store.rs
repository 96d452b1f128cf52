//! Single-slot token store guarded by an exclusive lock.
//!
//! The store never exposes its fields. Every read and write happens inside one short
//! critical section, and the lock is never held across I/O: callers read a
//! [`TokenState`] snapshot, release the lock, perform the network call, then re-acquire it
//! through [`TokenStore::install`] to commit the new token.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
};

/// Snapshot of the store evaluated against a single instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenState {
	/// No login has succeeded yet.
	Missing,
	/// A token exists and is usable.
	Valid(TokenSecret),
	/// A token exists but its lifetime has elapsed; it is still needed for the extend call.
	Expired(TokenSecret),
}
impl TokenState {
	/// Returns the usable token, if any.
	pub fn valid(&self) -> Option<&TokenSecret> {
		match self {
			Self::Valid(secret) => Some(secret),
			_ => None,
		}
	}
}

/// Thread-safe holder for the session's single bearer token.
#[derive(Debug, Default)]
pub struct TokenStore(Mutex<Option<Token>>);
impl TokenStore {
	/// Reads and classifies the current token in one critical section.
	pub fn state_at(&self, now: OffsetDateTime) -> TokenState {
		match self.0.lock().as_ref() {
			None => TokenState::Missing,
			Some(token) if token.is_expired_at(now) => TokenState::Expired(token.value.clone()),
			Some(token) => TokenState::Valid(token.value.clone()),
		}
	}

	/// Replaces the current token.
	pub fn install(&self, token: Token) {
		*self.0.lock() = Some(token);
	}

	/// Drops the current token so the next caller logs in again.
	pub fn clear(&self) -> Option<Token> {
		self.0.lock().take()
	}

	/// Expiry instant of the current token, if any.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.0.lock().as_ref().map(|token| token.expires_at)
	}
}
