//! Engine status codes and their human-readable descriptions.

use std::fmt;

/// Status code reported by the secure-storage engine.
///
/// The set of codes is open: the engine may report anything, and unknown
/// codes pass through verbatim. The associated constants cover the codes the
/// facade itself inspects plus the common failures worth a readable
/// description; everything else falls back to "unknown engine status".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineStatus(i32);

impl EngineStatus {
    /// The operation completed successfully.
    pub const SUCCESS: Self = Self(0);
    /// The function or operation is not implemented.
    pub const UNIMPLEMENTED: Self = Self(-4);
    /// One or more parameters passed to the engine were not valid.
    pub const INVALID_PARAMETER: Self = Self(-50);
    /// The engine failed to allocate memory.
    pub const ALLOCATION_FAILED: Self = Self(-108);
    /// No trust results are available.
    pub const NOT_AVAILABLE: Self = Self(-25291);
    /// Authorization or authentication failed.
    pub const AUTH_FAILED: Self = Self(-25293);
    /// A record with the same key already exists.
    pub const DUPLICATE_ITEM: Self = Self(-25299);
    /// The record cannot be found.
    pub const ITEM_NOT_FOUND: Self = Self(-25300);
    /// Interaction with the security server is not allowed.
    pub const INTERACTION_NOT_ALLOWED: Self = Self(-25308);
    /// The engine was unable to decode the provided data.
    pub const DECODE_FAILED: Self = Self(-26275);
    /// A cryptographic verification failure occurred.
    pub const VERIFY_FAILED: Self = Self(-67808);

    /// Wraps a raw engine code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw engine code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Returns `true` for the success status.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Returns `true` for the not-found status.
    #[must_use]
    pub const fn is_not_found(self) -> bool {
        self.0 == Self::ITEM_NOT_FOUND.0
    }

    /// Best-effort human-readable description of the status.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self.0 {
            0 => "success",
            -4 => "operation not implemented",
            -50 => "invalid parameter",
            -108 => "allocation failure",
            -25291 => "no trust results available",
            -25293 => "authentication failed",
            -25299 => "duplicate item",
            -25300 => "item not found",
            -25308 => "interaction not allowed",
            -26275 => "decode failure",
            -67808 => "cryptographic verification failure",
            _ => "unknown engine status",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}
