//! URL classification and cleaning
//!
//! Decides which post links are worth keeping and strips tracking
//! parameters from the ones that are.

use crate::config::PlatformProfile;
use tracing::debug;
use url::Url;

/// Classifies and cleans candidate URLs for one platform
#[derive(Debug, Clone, Default)]
pub struct UrlClassifier {
    platform: PlatformProfile,
}

impl UrlClassifier {
    /// Create a classifier for a platform
    pub fn new(platform: PlatformProfile) -> Self {
        Self { platform }
    }

    /// The platform this classifier was built for
    pub fn platform(&self) -> &PlatformProfile {
        &self.platform
    }

    /// Whether `url` is an outbound link worth recording.
    ///
    /// Unparsable input is rejected, never raised.
    pub fn is_eligible(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                debug!("Rejecting malformed URL {:?}: {}", url, e);
                return false;
            }
        };
        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();

        if self.platform.is_shortener_host(&host) {
            debug!("Keeping shortened link: {}", url);
            return true;
        }

        // No primary-domain URL is ever kept; the marker check only decides
        // how the rejection is reported.
        if self.platform.is_primary_host(&host) {
            if self.has_internal_marker(parsed.path()) {
                debug!("Skipping internal platform link: {}", url);
            } else {
                debug!("Skipping platform link: {}", url);
            }
            return false;
        }

        let web = matches!(parsed.scheme(), "http" | "https");
        if web {
            debug!("Valid external URL: {}", url);
        } else {
            debug!("Filtered out non-web URL: {}", url);
        }
        web
    }

    /// Remove tracking parameters; unparsable input is returned unchanged
    pub fn clean(&self, url: &str) -> String {
        let mut parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => return url.to_string(),
        };

        let has_tracking = parsed.query_pairs().any(|(k, _)| self.is_tracking_key(&k));
        if has_tracking {
            let kept: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(k, _)| !self.is_tracking_key(k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            if kept.is_empty() {
                parsed.set_query(None);
            } else {
                parsed.query_pairs_mut().clear().extend_pairs(kept);
            }
        }

        parsed.into()
    }

    fn has_internal_marker(&self, path: &str) -> bool {
        self.platform
            .internal_path_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
    }

    fn is_tracking_key(&self, key: &str) -> bool {
        self.platform.tracking_params.iter().any(|p| p == key)
    }
}
