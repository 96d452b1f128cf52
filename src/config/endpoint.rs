//! API URL normalization and control-plane/compute-plane classification.

// self
use crate::{_prelude::*, error::ConfigError};

/// Host suffixes served by the control-plane API.
pub const CONTROL_PLANE_SUFFIXES: [&str; 2] = [".prismacloud.io", ".prismacloud.cn"];

/// The two API planes, each with its own base address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiPlane {
	/// Control-plane API (login, policies, alerts, inventory).
	Control,
	/// Compute-plane API (workload protection console).
	Compute,
}
impl ApiPlane {
	/// Classifies a host by suffix.
	pub fn classify(host: &str) -> Self {
		let host = host.to_ascii_lowercase();

		if CONTROL_PLANE_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
			ApiPlane::Control
		} else {
			ApiPlane::Compute
		}
	}
}

/// Canonical form of a user-supplied API URL.
///
/// The scheme is stripped (an explicit `http://` is remembered so local proxies keep
/// working), trailing slashes are removed, the host is lowercased, and a leading `app`
/// console label is rewritten to the matching `api` label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedUrl {
	secure: bool,
	host: String,
	path: String,
}
impl NormalizedUrl {
	/// Host component, including any port.
	pub fn host(&self) -> &str {
		&self.host
	}

	/// Path below the host, without leading or trailing slashes.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Plane the host belongs to.
	pub fn plane(&self) -> ApiPlane {
		let hostname = self.host.split(':').next().unwrap_or_default();

		ApiPlane::classify(hostname)
	}

	/// Builds the base address used to join endpoint paths.
	pub fn to_base(&self) -> Result<ApiBase, ConfigError> {
		let scheme = if self.secure { "https" } else { "http" };
		let raw = if self.path.is_empty() {
			format!("{scheme}://{}/", self.host)
		} else {
			format!("{scheme}://{}/{}/", self.host, self.path)
		};
		let url = Url::parse(&raw).map_err(|source| ConfigError::invalid_url(raw.clone(), source))?;

		Ok(ApiBase(url))
	}
}
impl Display for NormalizedUrl {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.path.is_empty() {
			f.write_str(&self.host)
		} else {
			write!(f, "{}/{}", self.host, self.path)
		}
	}
}

/// Normalizes a user-supplied API URL; returns `None` for blank input.
pub fn normalize_url(raw: &str) -> Option<NormalizedUrl> {
	let trimmed = raw.trim();
	let lowered = trimmed.to_ascii_lowercase();
	let (secure, rest) = if lowered.starts_with("https://") {
		(true, &trimmed[8..])
	} else if lowered.starts_with("http://") {
		(false, &trimmed[7..])
	} else {
		(true, trimmed)
	};
	let rest = rest.trim_matches('/');

	if rest.is_empty() {
		return None;
	}

	let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
	let host = console_to_api(&host.to_ascii_lowercase());

	Some(NormalizedUrl { secure, host, path: path.trim_matches('/').to_owned() })
}

fn console_to_api(host: &str) -> String {
	let label = host.split(['.', ':']).next().unwrap_or_default();

	match label.strip_prefix("app") {
		Some(suffix) if suffix.chars().all(|c| c.is_ascii_digit()) =>
			format!("api{}", &host[3..]),
		_ => host.to_owned(),
	}
}

/// Base address of one API plane; always ends with `/` so endpoint paths join below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiBase(Url);
impl ApiBase {
	/// Resolves an endpoint path (with or without a leading `/`) against the base.
	pub fn join(&self, endpoint: &str) -> Result<Url, ConfigError> {
		let endpoint = endpoint.trim_start_matches('/');

		self.0.join(endpoint).map_err(|source| ConfigError::invalid_url(endpoint, source))
	}

	/// Base URL.
	pub fn as_url(&self) -> &Url {
		&self.0
	}
}
impl Display for ApiBase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}

/// Resolved base addresses for both planes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiEndpoints {
	/// Control-plane base, when the configured URL is a control-plane host.
	pub control: Option<ApiBase>,
	/// Compute-plane base, when configured directly or discovered later.
	pub compute: Option<ApiBase>,
}
impl ApiEndpoints {
	/// Normalizes `url` and assigns it to a plane (`plane` overrides suffix classification).
	pub fn resolve(url: &str, plane: Option<ApiPlane>) -> Result<Self, ConfigError> {
		let normalized = normalize_url(url).ok_or(ConfigError::MissingUrl)?;
		let base = normalized.to_base()?;

		match plane.unwrap_or_else(|| normalized.plane()) {
			ApiPlane::Control => Ok(Self { control: Some(base), compute: None }),
			ApiPlane::Compute => Ok(Self { control: None, compute: Some(base) }),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn normalized(raw: &str) -> NormalizedUrl {
		normalize_url(raw).expect("URL fixture should normalize.")
	}

	#[test]
	fn normalization_strips_scheme_slashes_and_case() {
		assert_eq!(normalized("https://API.PrismaCloud.io/").to_string(), "api.prismacloud.io");
		assert_eq!(
			normalized("  api2.eu.prismacloud.io//  ").to_string(),
			"api2.eu.prismacloud.io"
		);
		assert_eq!(
			normalized("https://us-east1.cloud.twistlock.com/us-1-111/").to_string(),
			"us-east1.cloud.twistlock.com/us-1-111"
		);
		assert_eq!(normalize_url("   "), None);
		assert_eq!(normalize_url("https:///"), None);
	}

	#[test]
	fn console_hosts_map_to_api_hosts() {
		assert_eq!(normalized("app.prismacloud.io").host(), "api.prismacloud.io");
		assert_eq!(normalized("https://app3.prismacloud.io").host(), "api3.prismacloud.io");
		assert_eq!(normalized("app.anz.prismacloud.io").host(), "api.anz.prismacloud.io");
		assert_eq!(normalized("apple.example.com").host(), "apple.example.com");
	}

	#[test]
	fn planes_are_classified_by_suffix() {
		assert_eq!(ApiPlane::classify("api.prismacloud.io"), ApiPlane::Control);
		assert_eq!(ApiPlane::classify("api.prismacloud.cn"), ApiPlane::Control);
		assert_eq!(ApiPlane::classify("us-east1.cloud.twistlock.com"), ApiPlane::Compute);
		assert_eq!(normalized("api.prismacloud.io:8443").plane(), ApiPlane::Control);
	}

	#[test]
	fn resolve_assigns_plane_and_honors_override() {
		let endpoints = ApiEndpoints::resolve("https://app.prismacloud.io", None)
			.expect("Control-plane URL should resolve.");

		assert_eq!(
			endpoints.control.as_ref().map(ToString::to_string).as_deref(),
			Some("https://api.prismacloud.io/")
		);
		assert!(endpoints.compute.is_none());

		let endpoints = ApiEndpoints::resolve("http://127.0.0.1:8080", Some(ApiPlane::Control))
			.expect("Overridden URL should resolve.");

		assert_eq!(
			endpoints.control.as_ref().map(ToString::to_string).as_deref(),
			Some("http://127.0.0.1:8080/")
		);
		assert!(matches!(ApiEndpoints::resolve("", None), Err(ConfigError::MissingUrl)));
	}

	#[test]
	fn base_join_keeps_compute_path_prefix() {
		let base = normalized("https://us-east1.cloud.twistlock.com/us-1-111")
			.to_base()
			.expect("Compute base should build.");
		let url = base.join("/api/v1/defenders").expect("Endpoint should join.");

		assert_eq!(url.as_str(), "https://us-east1.cloud.twistlock.com/us-1-111/api/v1/defenders");
	}
}
