/// Target used for events that report a finished step. The terminal formatter
/// renders these with a dedicated symbol.
pub const SUCCESS_TARGET: &str = "proxysift::success";

#[doc(hidden)]
pub use tracing as __tracing;

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::log::__tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}
