/// Maximum number of values the data stack may hold.
pub const DATA_STACK_CAPACITY: usize = 32768;

/// Maximum number of return addresses the call stack may hold.
pub const CALL_STACK_CAPACITY: usize = 512;

/// Maximum number of EXECUTE frames that may be active at once.
pub const EXECUTE_DEPTH_LIMIT: usize = 16;

/// Encoded widths of the typed disk accesses, in bytes.
pub const BOOL_BYTES: u32 = 1;
pub const CHAR_BYTES: u32 = 1;
pub const INT_BYTES: u32 = 4;
pub const FLOAT_BYTES: u32 = 8;

/// A character range on disk is a length header followed by its bytes.
pub const STR_HEADER_BYTES: u32 = INT_BYTES;
