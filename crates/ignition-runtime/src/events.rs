//! Lifecycle event vocabulary.
//!
//! Every phase transition of the bootstrap is announced on the shared bus
//! under one of these names. Per-module variants carry the module name in
//! the event name itself so subscribers can gate on one specific module.

/// Bootstrap entered the initializing phase.
pub const INITIALIZE_START: &str = "runtime.initialize.start";

/// Bootstrap completed and the runtime is initialized.
pub const INITIALIZE_FINISH: &str = "runtime.initialize.finish";

/// Bootstrap failed structurally. Terminal.
pub const INITIALIZE_CRASH: &str = "runtime.initialize.crash";

/// Externally requested crash (post-bootstrap failures included).
pub const RUNTIME_CRASH: &str = "runtime.crash";

/// Core initialization pass started.
pub const CORES_START: &str = "runtime.initialize.cores.start";

/// All cores initialized.
pub const CORES_FINISH: &str = "runtime.initialize.cores.finish";

/// A core failed; the bootstrap is aborting.
pub const CORES_FAILED: &str = "runtime.initialize.cores.failed";

/// The extension pass hit an unexpected error outside per-module rejection.
pub const EXTENSIONS_FAILED: &str = "runtime.initialize.extensions.failed";

/// An extension completed attachment. Payload carries its name.
pub const EXTENSION_ATTACHED: &str = "runtime.extension.attached";

/// An extension was rejected. Payload carries its name and reason.
pub const EXTENSION_REJECTED: &str = "runtime.extension.rejected";

/// One core started initializing.
pub fn core_start(namespace: &str) -> String {
    format!("runtime.initialize.core.{namespace}.start")
}

/// One core finished initializing.
pub fn core_finish(namespace: &str) -> String {
    format!("runtime.initialize.core.{namespace}.finish")
}

/// Per-name rejection event, for subscribers watching one extension.
pub fn extension_rejected(name: &str) -> String {
    format!("runtime.extension.{name}.rejected")
}
