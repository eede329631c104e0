//! Validated filter configuration and its two parameter profiles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FilterError, FilterResult};

/// Smallest target edge length the [`ParameterProfile::FixedLength`]
/// profile accepts; smaller positive values are raised to it.
pub const MIN_FIXED_EDGE_LENGTH: f64 = 1e-6;

/// Largest iteration count the [`ParameterProfile::AutoLength`] profile
/// allows.
pub const MAX_AUTO_ITERATIONS: u32 = 1000;

/// Largest iteration count the [`ParameterProfile::FixedLength`] profile
/// allows (the remesher's signed 32-bit limit).
pub const MAX_FIXED_ITERATIONS: u32 = i32::MAX.unsigned_abs();

/// How configuration values are defaulted, validated and clamped.
///
/// | | `AutoLength` | `FixedLength` |
/// |---|---|---|
/// | default target length | 0 (derived from the mesh) | 0.1 |
/// | target length <= 0 | derived from the mesh | rejected |
/// | small target length | accepted | raised to [`MIN_FIXED_EDGE_LENGTH`] |
/// | iterations | clamped to `1..=1000` | 0 rejected, else clamped to `1..=i32::MAX` |
/// | projection | off | on |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParameterProfile {
    /// A non-positive target length means "use the mean edge length of the
    /// input".
    #[default]
    AutoLength,
    /// The target length is always given explicitly.
    FixedLength,
}

impl ParameterProfile {
    /// Default target edge length.
    #[must_use]
    pub const fn default_target_edge_length(self) -> f64 {
        match self {
            Self::AutoLength => 0.0,
            Self::FixedLength => 0.1,
        }
    }

    /// Default iteration count.
    #[must_use]
    pub const fn default_iterations(self) -> u32 {
        10
    }

    /// Whether vertices are projected back onto the input by default.
    #[must_use]
    pub const fn default_project_to_surface(self) -> bool {
        matches!(self, Self::FixedLength)
    }

    /// Largest accepted iteration count.
    #[must_use]
    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::AutoLength => MAX_AUTO_ITERATIONS,
            Self::FixedLength => MAX_FIXED_ITERATIONS,
        }
    }
}

/// Validated filter configuration.
///
/// Built through [`RemeshConfig::builder`]; every value it holds has
/// already been checked and clamped for its profile.
///
/// # Example
///
/// ```
/// use mesh_uniform_remesh::{ParameterProfile, RemeshConfig};
///
/// let config = RemeshConfig::builder(ParameterProfile::AutoLength)
///     .iterations(5000)
///     .build()?;
/// assert_eq!(config.iterations(), 1000);
/// assert!(config.uses_auto_length());
/// # Ok::<(), mesh_uniform_remesh::FilterError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RemeshSettings", into = "RemeshSettings")
)]
pub struct RemeshConfig {
    profile: ParameterProfile,
    target_edge_length: f64,
    iterations: u32,
    project_to_surface: bool,
    preserve_boundary: bool,
}

impl Default for RemeshConfig {
    fn default() -> Self {
        Self::new(ParameterProfile::default())
    }
}

impl RemeshConfig {
    /// The profile's defaults.
    #[must_use]
    pub const fn new(profile: ParameterProfile) -> Self {
        Self {
            profile,
            target_edge_length: profile.default_target_edge_length(),
            iterations: profile.default_iterations(),
            project_to_surface: profile.default_project_to_surface(),
            preserve_boundary: true,
        }
    }

    /// Start building a configuration for `profile`.
    #[must_use]
    pub const fn builder(profile: ParameterProfile) -> RemeshConfigBuilder {
        RemeshConfigBuilder {
            profile,
            target_edge_length: None,
            iterations: None,
            project_to_surface: None,
            preserve_boundary: true,
        }
    }

    /// Validate loosely typed settings.
    ///
    /// # Errors
    ///
    /// Same as [`RemeshConfigBuilder::build`].
    pub fn from_settings(settings: &RemeshSettings) -> FilterResult<Self> {
        let mut builder = Self::builder(settings.profile);
        if let Some(length) = settings.target_edge_length {
            builder = builder.target_edge_length(length);
        }
        if let Some(iterations) = settings.iterations {
            builder = builder.iterations(iterations);
        }
        if let Some(project) = settings.project_to_surface {
            builder = builder.project_to_surface(project);
        }
        if let Some(preserve) = settings.preserve_boundary {
            builder = builder.preserve_boundary(preserve);
        }
        builder.build()
    }

    /// Profile the configuration was validated against.
    #[must_use]
    pub const fn profile(&self) -> ParameterProfile {
        self.profile
    }

    /// Target edge length as configured (`<= 0` means derived from the
    /// input under [`ParameterProfile::AutoLength`]).
    #[must_use]
    pub const fn target_edge_length(&self) -> f64 {
        self.target_edge_length
    }

    /// Iteration count passed to the remesher.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Whether vertices are projected back onto the input surface.
    #[must_use]
    pub const fn project_to_surface(&self) -> bool {
        self.project_to_surface
    }

    /// Whether boundary vertices are pinned.
    #[must_use]
    pub const fn preserve_boundary(&self) -> bool {
        self.preserve_boundary
    }

    /// Whether the target length is derived from the input mesh.
    #[must_use]
    pub fn uses_auto_length(&self) -> bool {
        self.target_edge_length <= 0.0
    }
}

/// Builder for [`RemeshConfig`].
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct RemeshConfigBuilder {
    profile: ParameterProfile,
    target_edge_length: Option<f64>,
    iterations: Option<u32>,
    project_to_surface: Option<bool>,
    preserve_boundary: bool,
}

impl RemeshConfigBuilder {
    /// Set the target edge length.
    pub const fn target_edge_length(mut self, length: f64) -> Self {
        self.target_edge_length = Some(length);
        self
    }

    /// Set the iteration count.
    pub const fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Enable or disable projection onto the input surface.
    pub const fn project_to_surface(mut self, project: bool) -> Self {
        self.project_to_surface = Some(project);
        self
    }

    /// Enable or disable boundary pinning.
    pub const fn preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Validate and clamp the values for the profile.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] if the target length is not
    /// finite, or under [`ParameterProfile::FixedLength`] if the target
    /// length is not positive or the iteration count is zero.
    pub fn build(self) -> FilterResult<RemeshConfig> {
        let profile = self.profile;
        let length = self
            .target_edge_length
            .unwrap_or(profile.default_target_edge_length());
        let iterations = self.iterations.unwrap_or(profile.default_iterations());

        if !length.is_finite() {
            return Err(FilterError::invalid_parameter(
                "target_edge_length",
                length,
                "must be finite",
            ));
        }

        let target_edge_length = match profile {
            ParameterProfile::AutoLength => length,
            ParameterProfile::FixedLength => {
                if length <= 0.0 {
                    return Err(FilterError::invalid_parameter(
                        "target_edge_length",
                        length,
                        "must be positive",
                    ));
                }
                if length < MIN_FIXED_EDGE_LENGTH {
                    debug!(
                        "Raised target edge length {} to {}",
                        length, MIN_FIXED_EDGE_LENGTH
                    );
                }
                length.max(MIN_FIXED_EDGE_LENGTH)
            }
        };

        if profile == ParameterProfile::FixedLength && iterations == 0 {
            return Err(FilterError::invalid_parameter(
                "iterations",
                iterations,
                "must be at least 1",
            ));
        }
        let clamped_iterations = iterations.clamp(1, profile.max_iterations());

        if clamped_iterations != iterations {
            debug!(
                "Clamped iterations {} to {} for {:?}",
                iterations, clamped_iterations, profile
            );
        }

        Ok(RemeshConfig {
            profile,
            target_edge_length,
            iterations: clamped_iterations,
            project_to_surface: self
                .project_to_surface
                .unwrap_or(profile.default_project_to_surface()),
            preserve_boundary: self.preserve_boundary,
        })
    }
}

/// Unvalidated configuration values, as read from a settings file.
///
/// Missing values take the profile's defaults. Convert with
/// [`RemeshConfig::from_settings`] or `TryFrom`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RemeshSettings {
    /// Profile to validate against.
    pub profile: ParameterProfile,
    /// Target edge length.
    pub target_edge_length: Option<f64>,
    /// Iteration count.
    pub iterations: Option<u32>,
    /// Projection onto the input surface.
    pub project_to_surface: Option<bool>,
    /// Boundary pinning.
    pub preserve_boundary: Option<bool>,
}

impl TryFrom<RemeshSettings> for RemeshConfig {
    type Error = FilterError;

    fn try_from(settings: RemeshSettings) -> FilterResult<Self> {
        Self::from_settings(&settings)
    }
}

impl From<RemeshConfig> for RemeshSettings {
    fn from(config: RemeshConfig) -> Self {
        Self {
            profile: config.profile,
            target_edge_length: Some(config.target_edge_length),
            iterations: Some(config.iterations),
            project_to_surface: Some(config.project_to_surface),
            preserve_boundary: Some(config.preserve_boundary),
        }
    }
}
