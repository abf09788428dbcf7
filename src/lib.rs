//! Public library API for decoding Qt 5 container layouts out of paused foreign processes.

/// Value handle contract, container decoders, formatter registry, and snapshot host.
pub mod qt;
