//! Tenant metadata lookup and compute-plane discovery.

// self
use crate::{
	_prelude::*,
	client::{ApiCall, Client},
	config::{ApiBase, normalize_url},
	http::ApiHttpClient,
};

/// Tenant metadata endpoint path.
pub const META_INFO_PATH: &str = "meta_info";

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Fetches the tenant metadata document, `None` when the body is not JSON.
	pub async fn meta_info(&self) -> Result<Option<Value>> {
		Ok(self.execute(ApiCall::get(META_INFO_PATH)).await?.into_json())
	}

	/// Reads `twistlockUrl` from the tenant metadata and stores it as the compute base.
	///
	/// Returns `None`, leaving any configured compute base untouched, when the tenant does
	/// not advertise a compute console.
	pub async fn discover_compute_endpoint(&self) -> Result<Option<ApiBase>> {
		let Some(info) = self.meta_info().await? else {
			return Ok(None);
		};
		let Some(normalized) =
			info.get("twistlockUrl").and_then(Value::as_str).and_then(normalize_url)
		else {
			return Ok(None);
		};
		let base = normalized.to_base()?;

		tracing::info!(compute = %base, "Discovered compute-plane endpoint.");

		*self.compute.write() = Some(base.clone());

		Ok(Some(base))
	}
}

