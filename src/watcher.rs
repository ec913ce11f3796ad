//! Appearance change notification.
//!
//! The loop blocks in [`ChangeNotifier::wait`] until the appearance setting
//! may have changed. A wake is only a hint: the loop re-reads the setting
//! and decides for itself whether anything actually changed.
//!
//! - [`RegistryNotifier`] (Windows): kernel notification on the
//!   `Personalize` key, no polling
//! - [`PollingNotifier`] (elsewhere): wakes every poll interval
//!
//! Both can be woken early through a [`ShutdownHandle`], which is how Ctrl+C
//! ends the loop cleanly.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::info;

use crate::error::Result;

/// Why [`ChangeNotifier::wait`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The appearance setting may have changed
    Changed,
    /// Shutdown was requested
    Shutdown,
}

pub trait ChangeNotifier {
    /// Register interest in the next change.
    ///
    /// Must be called before [`wait`](Self::wait), and again after each wake
    /// before the setting is read, so a change that lands between the read
    /// and the next wait still produces a wake.
    fn arm(&mut self) -> Result<()>;

    /// Block until the next change or a shutdown request.
    fn wait(&mut self) -> Result<Wake>;

    /// Handle that ends a pending or future `wait` with [`Wake::Shutdown`].
    fn shutdown_handle(&self) -> ShutdownHandle;
}

/// Cloneable, thread-safe request to stop the loop.
#[derive(Clone)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    wake: Arc<dyn Fn() + Send + Sync>,
}

impl ShutdownHandle {
    pub fn new(requested: Arc<AtomicBool>, wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            requested,
            wake: Arc::new(wake),
        }
    }

    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            info!("Shutdown requested");
        }
        (self.wake)();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("requested", &self.is_requested())
            .finish()
    }
}

// ============================================================================
// Polling
// ============================================================================

#[derive(Default)]
struct PollSignal {
    stop: Arc<AtomicBool>,
    lock: Mutex<()>,
    cvar: Condvar,
}

/// Wakes once per poll interval.
pub struct PollingNotifier {
    interval: Duration,
    signal: Arc<PollSignal>,
}

impl PollingNotifier {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            signal: Arc::new(PollSignal::default()),
        }
    }
}

impl ChangeNotifier for PollingNotifier {
    fn arm(&mut self) -> Result<()> {
        Ok(())
    }

    fn wait(&mut self) -> Result<Wake> {
        let deadline = Instant::now() + self.interval;
        let mut guard = self.signal.lock.lock();
        while !self.signal.stop.load(Ordering::SeqCst) {
            if self.signal.cvar.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }

        if self.signal.stop.load(Ordering::SeqCst) {
            Ok(Wake::Shutdown)
        } else {
            Ok(Wake::Changed)
        }
    }

    fn shutdown_handle(&self) -> ShutdownHandle {
        let signal = Arc::clone(&self.signal);
        ShutdownHandle::new(Arc::clone(&self.signal.stop), move || {
            // Taking the lock orders this with the waiter's flag check
            let _guard = signal.lock.lock();
            signal.cvar.notify_all();
        })
    }
}

// ============================================================================
// Registry (Windows)
// ============================================================================

#[cfg(windows)]
pub use registry::RegistryNotifier;

#[cfg(windows)]
mod registry {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::{debug, warn};
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{CloseHandle, ERROR_SUCCESS, FALSE, HANDLE, TRUE, WAIT_FAILED};
    use windows::Win32::System::Registry::{
        RegCloseKey, RegNotifyChangeKeyValue, RegOpenKeyExW, HKEY, HKEY_CURRENT_USER, KEY_NOTIFY,
        REG_NOTIFY_CHANGE_LAST_SET,
    };
    use windows::Win32::System::Threading::{
        CreateEventW, ResetEvent, SetEvent, WaitForSingleObject, INFINITE,
    };

    use super::{ChangeNotifier, ShutdownHandle, Wake};
    use crate::error::{AutoThemeError, Result};

    /// Event handle shared with shutdown handles. Closed by the notifier's
    /// Drop; a shutdown request after that is a no-op.
    struct SharedEvent(Mutex<Option<HANDLE>>);

    // SAFETY: an event handle may be signalled from any thread, and the
    // mutex serializes signalling against closing.
    unsafe impl Send for SharedEvent {}
    unsafe impl Sync for SharedEvent {}

    /// Kernel change notification on a `HKEY_CURRENT_USER` subkey.
    pub struct RegistryNotifier {
        key: HKEY,
        event: Arc<SharedEvent>,
        stop: Arc<AtomicBool>,
    }

    impl RegistryNotifier {
        pub fn open(subkey: &str) -> Result<Self> {
            let wide: Vec<u16> = subkey.encode_utf16().chain(std::iter::once(0)).collect();
            let mut key = HKEY::default();
            let status = unsafe {
                RegOpenKeyExW(HKEY_CURRENT_USER, PCWSTR(wide.as_ptr()), 0, KEY_NOTIFY, &mut key)
            };
            if status != ERROR_SUCCESS {
                return Err(AutoThemeError::Notification(format!(
                    "RegOpenKeyExW({}) failed: {:?}",
                    subkey, status
                )));
            }

            let event = match unsafe { CreateEventW(None, TRUE, FALSE, PCWSTR::null()) } {
                Ok(event) => event,
                Err(e) => {
                    unsafe {
                        let _ = RegCloseKey(key);
                    }
                    return Err(AutoThemeError::Notification(format!(
                        "CreateEventW failed: {}",
                        e
                    )));
                }
            };

            debug!(subkey, "Registry notifier opened");
            Ok(Self {
                key,
                event: Arc::new(SharedEvent(Mutex::new(Some(event)))),
                stop: Arc::new(AtomicBool::new(false)),
            })
        }

        fn event_handle(&self) -> Result<HANDLE> {
            (*self.event.0.lock())
                .ok_or_else(|| AutoThemeError::Notification("event handle closed".to_string()))
        }
    }

    impl ChangeNotifier for RegistryNotifier {
        fn arm(&mut self) -> Result<()> {
            let event = self.event_handle()?;
            unsafe { ResetEvent(event) }
                .map_err(|e| AutoThemeError::Notification(format!("ResetEvent failed: {}", e)))?;

            let status = unsafe {
                RegNotifyChangeKeyValue(self.key, TRUE, REG_NOTIFY_CHANGE_LAST_SET, event, TRUE)
            };
            if status != ERROR_SUCCESS {
                return Err(AutoThemeError::Notification(format!(
                    "RegNotifyChangeKeyValue failed: {:?}",
                    status
                )));
            }
            Ok(())
        }

        fn wait(&mut self) -> Result<Wake> {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(Wake::Shutdown);
            }
            let event = self.event_handle()?;
            if unsafe { WaitForSingleObject(event, INFINITE) } == WAIT_FAILED {
                let error = windows::core::Error::from_win32();
                return Err(AutoThemeError::Notification(format!(
                    "WaitForSingleObject failed: {}",
                    error
                )));
            }
            if self.stop.load(Ordering::SeqCst) {
                Ok(Wake::Shutdown)
            } else {
                Ok(Wake::Changed)
            }
        }

        fn shutdown_handle(&self) -> ShutdownHandle {
            let event = Arc::clone(&self.event);
            ShutdownHandle::new(Arc::clone(&self.stop), move || {
                if let Some(handle) = *event.0.lock() {
                    if let Err(e) = unsafe { SetEvent(handle) } {
                        warn!(error = %e, "SetEvent failed");
                    }
                }
            })
        }
    }

    impl Drop for RegistryNotifier {
        fn drop(&mut self) {
            // Closing the key also drops the pending notification request
            unsafe {
                let _ = RegCloseKey(self.key);
            }
            if let Some(handle) = self.event.0.lock().take() {
                unsafe {
                    let _ = CloseHandle(handle);
                }
            }
            debug!("Registry notifier closed");
        }
    }
}

/// The notifier for this platform.
#[cfg(windows)]
pub fn system_notifier(_poll_interval: Duration) -> Result<Box<dyn ChangeNotifier>> {
    let notifier = RegistryNotifier::open(crate::appearance::PERSONALIZE_KEY)?;
    info!(kind = "registry", "Change notifier ready");
    Ok(Box::new(notifier))
}

/// The notifier for this platform.
#[cfg(not(windows))]
pub fn system_notifier(poll_interval: Duration) -> Result<Box<dyn ChangeNotifier>> {
    info!(
        kind = "polling",
        poll_interval_ms = poll_interval.as_millis() as u64,
        "Change notifier ready"
    );
    Ok(Box::new(PollingNotifier::new(poll_interval)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_polling_wakes_after_interval() {
        let mut notifier = PollingNotifier::new(Duration::from_millis(10));
        notifier.arm().unwrap();

        let start = Instant::now();
        assert_eq!(notifier.wait().unwrap(), Wake::Changed);
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_shutdown_before_wait() {
        let mut notifier = PollingNotifier::new(Duration::from_secs(60));
        let handle = notifier.shutdown_handle();
        handle.request();

        assert!(handle.is_requested());
        assert_eq!(notifier.wait().unwrap(), Wake::Shutdown);
    }

    #[test]
    fn test_shutdown_from_other_thread_ends_wait() {
        let mut notifier = PollingNotifier::new(Duration::from_secs(60));
        let handle = notifier.shutdown_handle();

        let requester = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.request();
        });

        let start = Instant::now();
        assert_eq!(notifier.wait().unwrap(), Wake::Shutdown);
        assert!(start.elapsed() < Duration::from_secs(30));
        requester.join().unwrap();
    }

    #[test]
    fn test_shutdown_handle_clones_share_state() {
        let notifier = PollingNotifier::new(Duration::from_secs(1));
        let first = notifier.shutdown_handle();
        let second = first.clone();
        second.request();
        assert!(first.is_requested());
        // Repeated requests are harmless
        first.request();
        assert!(second.is_requested());
    }

    #[test]
    fn test_system_notifier_can_be_built() {
        let notifier = system_notifier(Duration::from_millis(50));
        assert!(notifier.is_ok());
    }
}
