// ABOUTME: Identity resolution for requests arriving through the authenticating gateway
// ABOUTME: Default resolver trusts the gateway-asserted x-member-id and x-member-name headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Caller identity
//!
//! Authentication happens upstream. This module only turns what the gateway asserted
//! into an [`Identity`], failing with `AuthRequired` when nothing was asserted.

use accountability_core::constants::headers;
use accountability_core::models::MemberId;
use http::HeaderMap;

use crate::errors::{AppError, AppResult};

/// The resolved caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable member identifier
    pub member_id: MemberId,
    /// Display name, when the gateway supplied one
    pub display_name: Option<String>,
}

/// Resolves the caller of a request from its headers
pub trait IdentityResolver: Send + Sync {
    /// Resolve the caller
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no identity was asserted
    fn resolve(&self, headers: &HeaderMap) -> AppResult<Identity>;
}

/// Reads the member id and display name from gateway headers
#[derive(Debug, Clone, Default)]
pub struct HeaderIdentityResolver;

impl HeaderIdentityResolver {
    fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

impl IdentityResolver for HeaderIdentityResolver {
    fn resolve(&self, headers: &HeaderMap) -> AppResult<Identity> {
        let raw_id =
            Self::header_value(headers, headers::MEMBER_ID).ok_or_else(AppError::auth_required)?;
        let member_id = MemberId::new(raw_id).map_err(|_| AppError::auth_required())?;

        Ok(Identity {
            member_id,
            display_name: Self::header_value(headers, headers::MEMBER_NAME).map(str::to_owned),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accountability_core::errors::ErrorCode;
    use http::HeaderValue;

    #[test]
    fn test_missing_member_header_is_auth_required() {
        let err = HeaderIdentityResolver.resolve(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[test]
    fn test_blank_member_header_is_auth_required() {
        let mut headers = HeaderMap::new();
        headers.insert(headers::MEMBER_ID, HeaderValue::from_static("   "));
        assert!(HeaderIdentityResolver.resolve(&headers).is_err());
    }

    #[test]
    fn test_resolves_id_and_name() {
        let mut headers = HeaderMap::new();
        headers.insert(headers::MEMBER_ID, HeaderValue::from_static("user_42"));
        headers.insert(headers::MEMBER_NAME, HeaderValue::from_static("Sam"));

        let identity = HeaderIdentityResolver.resolve(&headers).unwrap();
        assert_eq!(identity.member_id.as_str(), "user_42");
        assert_eq!(identity.display_name.as_deref(), Some("Sam"));
    }
}
