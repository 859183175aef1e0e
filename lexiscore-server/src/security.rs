use std::collections::HashSet;
use std::env;

use actix_web::HttpRequest;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "api-key";

/// API-key check applied to every scoring endpoint.
///
/// Disabled unless `ENABLE_SECURITY` is `true` or `1`. Accepted keys come from
/// the comma-separated `LEXISCORE_API_KEYS` variable.
#[derive(Debug, Clone, Default)]
pub struct Security {
	pub enabled: bool,
	keys: HashSet<String>,
}

impl Security {
	pub fn new<I, S>(enabled: bool, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { enabled, keys: keys.into_iter().map(Into::into).collect() }
	}

	pub fn from_env() -> Self {
		let enabled = env::var("ENABLE_SECURITY")
			.map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
			.unwrap_or(false);
		let keys = env::var("LEXISCORE_API_KEYS").unwrap_or_default();
		Self::new(enabled, keys.split(',').map(str::trim).filter(|k| !k.is_empty()))
	}

	/// `true` when security is off or the request carries a known key.
	pub fn allows(&self, req: &HttpRequest) -> bool {
		if !self.enabled {
			return true;
		}
		req.headers()
			.get(API_KEY_HEADER)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|key| self.keys.contains(key))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::test::TestRequest;

	#[test]
	fn disabled_allows_everything() {
		let security = Security::default();
		assert!(security.allows(&TestRequest::default().to_http_request()));
	}

	#[test]
	fn enabled_requires_known_key() {
		let security = Security::new(true, ["secret"]);
		assert!(!security.allows(&TestRequest::default().to_http_request()));
		let wrong = TestRequest::default().insert_header((API_KEY_HEADER, "nope")).to_http_request();
		assert!(!security.allows(&wrong));
		let right = TestRequest::default().insert_header((API_KEY_HEADER, "secret")).to_http_request();
		assert!(security.allows(&right));
	}
}
