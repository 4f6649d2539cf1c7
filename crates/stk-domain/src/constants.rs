//! Domain layer constants
//!
//! Names of built-in injectables and engine bounds shared by the
//! application and infrastructure layers.

// ============================================================================
// INJECTOR CONSTANTS
// ============================================================================

/// Injectable name of the root scope built into every injector
pub const ROOT_SCOPE: &str = "$rootScope";

/// Injectable name under which the mock transport is installed
pub const HTTP_BACKEND: &str = "$httpBackend";

/// Injectable name under which the mock timeout queue is installed
pub const TIMEOUT: &str = "$timeout";

// ============================================================================
// DIGEST CONSTANTS
// ============================================================================

/// Default number of dirty passes a single digest may perform
pub const DEFAULT_DIGEST_TTL: usize = 10;

/// Number of firing watchers named in a convergence error
pub const DIGEST_REPORTED_WATCHERS: usize = 5;
