//! Terminal spinner for operations that wait on the network or on git.

use std::time::Duration;

use indicatif::ProgressBar;

/// Run `f` with a spinner showing `message`, clearing it when done.
pub fn with_spinner<T, F>(message: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = f();
    spinner.finish_and_clear();
    result
}
