//! Version identifiers of the supported data formats.
//!
//! Identifiers are compared by exact, case-sensitive string equality.

/// First data format generation.
pub const MITREID_CONNECT_1_0: &str = "mitreid-connect-1.0";

/// Second data format generation.
pub const MITREID_CONNECT_1_1: &str = "mitreid-connect-1.1";

/// Current data format generation; the only one that is exported.
pub const MITREID_CONNECT_1_2: &str = "mitreid-connect-1.2";

/// All supported identifiers, oldest first.
pub const SUPPORTED_VERSIONS: [&str; 3] =
    [MITREID_CONNECT_1_0, MITREID_CONNECT_1_1, MITREID_CONNECT_1_2];
