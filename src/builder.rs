//! Typestate builder for constructing [`ResourceUri`] instances.
//!
//! Resolvers use this to synthesize transport URIs; phantom types enforce at
//! compile time that a scheme and an authority are set before building.

use std::marker::PhantomData;

use crate::authority::Authority;
use crate::constants::MAX_URI_LENGTH;
use crate::error::{AuthorityError, BuilderError};
use crate::resource_uri::ResourceUri;

/// Marker: No components set yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

/// Marker: Scheme has been set.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasScheme;

/// Marker: Scheme and authority are set, ready to build.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ready;

/// A typestate builder for constructing [`ResourceUri`] instances.
///
/// Scheme first, then authority; path, query and fragment are optional and
/// can be added at any point.
///
/// # Examples
///
/// ```
/// use resource_address::{Authority, ResourceUriBuilder};
///
/// let uri = ResourceUriBuilder::new()
///     .scheme("http")
///     .authority(Authority::parse("localhost:2020").unwrap())
///     .path("/echo")
///     .build()
///     .unwrap();
///
/// assert_eq!(uri.as_str(), "http://localhost:2020/echo");
/// ```
///
/// ```compile_fail
/// use resource_address::ResourceUriBuilder;
///
/// // Error: cannot call build() without an authority
/// let uri = ResourceUriBuilder::new().scheme("tcp").build();
/// ```
#[derive(Debug, Clone)]
pub struct ResourceUriBuilder<State = Empty> {
    scheme: String,
    authority: Option<Authority>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
    _state: PhantomData<State>,
}

impl ResourceUriBuilder<Empty> {
    /// Creates a new builder in the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheme: String::new(),
            authority: None,
            path: String::new(),
            query: None,
            fragment: None,
            _state: PhantomData,
        }
    }

    /// Sets the scheme and advances to the [`HasScheme`] state.
    ///
    /// The scheme is validated by `build()`.
    #[must_use]
    pub fn scheme(self, scheme: &str) -> ResourceUriBuilder<HasScheme> {
        ResourceUriBuilder {
            scheme: scheme.to_ascii_lowercase(),
            authority: self.authority,
            path: self.path,
            query: self.query,
            fragment: self.fragment,
            _state: PhantomData,
        }
    }
}

impl Default for ResourceUriBuilder<Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceUriBuilder<HasScheme> {
    /// Sets the authority and advances to the [`Ready`] state.
    #[must_use]
    pub fn authority(self, authority: Authority) -> ResourceUriBuilder<Ready> {
        ResourceUriBuilder {
            scheme: self.scheme,
            authority: Some(authority),
            path: self.path,
            query: self.query,
            fragment: self.fragment,
            _state: PhantomData,
        }
    }

    /// Parses and sets the authority from a string.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError`] if the string is not a valid authority.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_address::ResourceUriBuilder;
    ///
    /// let uri = ResourceUriBuilder::new()
    ///     .scheme("tcp")
    ///     .try_authority("127.0.0.1:4949")?
    ///     .build()?;
    /// assert_eq!(uri.port(), Some(4949));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_authority(self, s: &str) -> Result<ResourceUriBuilder<Ready>, AuthorityError> {
        let authority = Authority::parse(s)?;
        Ok(self.authority(authority))
    }
}

impl ResourceUriBuilder<Ready> {
    /// Builds the final [`ResourceUri`].
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidScheme`] if the scheme is malformed and
    /// [`BuilderError::UriTooLong`] if the result exceeds the maximum length.
    pub fn build(self) -> Result<ResourceUri, BuilderError> {
        ResourceUri::validate_scheme(&self.scheme).map_err(|_| BuilderError::InvalidScheme {
            scheme: self.scheme.clone(),
        })?;

        let Some(authority) = self.authority else {
            // Unreachable through the typestate transitions
            return Err(BuilderError::MissingAuthority);
        };

        let uri = ResourceUri::from_parts(self.scheme, authority, self.path, self.query, self.fragment);
        let actual = uri.as_str().len();
        if actual > MAX_URI_LENGTH {
            return Err(BuilderError::UriTooLong {
                max: MAX_URI_LENGTH,
                actual,
            });
        }
        Ok(uri)
    }
}

/// Methods available in all states for optional components.
impl<State> ResourceUriBuilder<State> {
    /// Sets the path. A non-empty path without a leading slash gets one.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    /// Sets the query string (without the leading `?`).
    #[must_use]
    pub fn query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    /// Sets the fragment (without the leading `#`).
    #[must_use]
    pub fn fragment(mut self, fragment: Option<&str>) -> Self {
        self.fragment = fragment.filter(|f| !f.is_empty()).map(str::to_string);
        self
    }
}
