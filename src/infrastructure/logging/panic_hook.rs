//! Panic hook recording unhandled panics in the log file.

use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;
use std::sync::Once;

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

static INSTALL: Once = Once::new();

/// Install a panic hook that logs every unhandled panic at CRITICAL
///
/// The record goes through the normal logging path (sanitizer and rotation
/// included). The previously installed hook, normally the standard one
/// that prints the panic and lets the process terminate, always runs
/// afterwards. Installing more than once has no further effect.
pub fn install_exception_hook() {
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            let _delegate = Delegate {
                hook: &previous,
                info,
            };
            record_panic(info);
        }));
    });
}

/// Runs the wrapped hook when dropped, so logging cannot skip it
struct Delegate<'a, 'b> {
    hook: &'a PanicHook,
    info: &'a PanicHookInfo<'b>,
}

impl Drop for Delegate<'_, '_> {
    fn drop(&mut self) {
        (self.hook)(self.info);
    }
}

fn record_panic(info: &PanicHookInfo<'_>) {
    let report = describe_panic(info, &Backtrace::force_capture());
    crate::critical!("Unhandled panic:\n{}", report);
}

/// Render thread, location, payload and backtrace like the standard hook
fn describe_panic(info: &PanicHookInfo<'_>, backtrace: &Backtrace) -> String {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let location = info
        .location()
        .map_or_else(|| "<unknown>".to_string(), |l| format!("{}:{}:{}", l.file(), l.line(), l.column()));

    format!(
        "thread '{name}' panicked at {location}:\n{}\nstack backtrace:\n{backtrace}",
        panic_message(info)
    )
}

/// Extract the panic message from panic info.
fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
