/// Decoder-kind lookup for a type name.
pub mod classify;
/// Snapshot summary command.
pub mod info;
/// Demo snapshot writer.
pub mod sample;
/// Value rendering command.
pub mod show;
/// Shared CLI helpers.
pub mod util;
