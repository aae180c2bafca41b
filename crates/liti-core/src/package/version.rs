//! Version normalization and registry version resolution

use crate::error::ScaffoldError;
use anyhow::Result;
use semver::{BuildMetadata, Version, VersionReq};
use std::collections::HashMap;

/// Tag used when no version is requested
pub const LATEST_TAG: &str = "latest";

/// Parse a version string, handling a leading `v` and surrounding whitespace
///
/// Returns the canonical form (`" v1.0.0 "` becomes `"1.0.0"`), or `None`
/// when the input is not a semantic version. Build metadata is dropped.
pub fn normalize_version(version_str: &str) -> Option<String> {
    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let mut version = Version::parse(cleaned).ok()?;
    version.build = BuildMetadata::EMPTY;
    Some(version.to_string())
}

/// Whether a requested version names one exact release
pub fn is_exact(requested: &str) -> bool {
    normalize_version(requested).is_some()
}

/// Pick the published version a request refers to
///
/// Dist-tags (`latest`, `next`, ...) resolve to their target, exact versions
/// must be published, and ranges resolve to the highest matching release.
pub fn resolve_version<'a>(
    package: &str,
    requested: &str,
    dist_tags: &HashMap<String, String>,
    published: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let not_found = || ScaffoldError::PackageVersionNotFound {
        package: package.to_string(),
        requested: requested.to_string(),
    };

    let requested_trimmed = requested.trim();
    let tag = if requested_trimmed.is_empty() {
        LATEST_TAG
    } else {
        requested_trimmed
    };
    if let Some(target) = dist_tags.get(tag) {
        return Ok(target.clone());
    }

    let published: Vec<(&str, Version)> = published
        .into_iter()
        .filter_map(|raw| Version::parse(raw).ok().map(|v| (raw, v)))
        .collect();

    if let Some(exact) = normalize_version(tag) {
        return published
            .iter()
            .find(|(raw, _)| normalize_version(raw).as_deref() == Some(exact.as_str()))
            .map(|(raw, _)| raw.to_string())
            .ok_or_else(|| not_found().into());
    }

    let req = VersionReq::parse(tag).map_err(|_| not_found())?;
    published
        .into_iter()
        .filter(|(_, v)| req.matches(v))
        .max_by(|(_, a), (_, b)| a.cmp_precedence(b))
        .map(|(raw, _)| raw.to_string())
        .ok_or_else(|| not_found().into())
}
