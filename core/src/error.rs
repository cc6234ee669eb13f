// Errors raised by a single generation pass.
// A failed pass never touches previously published artifacts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// A parameter failed validation before any work was done.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// No grid cell passes both the elevation and the slope test.
    #[error(
        "no eligible tree sites: elevation must be within {min_height}..={max_height} \
         and dot(normal, up) at least {min_up_dot}"
    )]
    NoEligibleSites {
        min_height: f32,
        max_height: f32,
        min_up_dot: f32,
    },

    /// A grid handed to a later stage does not match the height field.
    #[error("grid is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

impl GenerationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
