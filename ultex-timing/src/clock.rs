use std::cell::Cell;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Time source for the session state machine and capture loops.
///
/// Stage transitions compare monotonic nanoseconds; log rows carry wall
/// clock Unix seconds. Splitting the two lets tests drive both.
pub trait Clock: Send {
    /// Monotonic nanoseconds since clock creation.
    fn now(&self) -> u64;

    /// Wall-clock Unix seconds, with fraction; used for log timestamps.
    fn unix_time(&self) -> f64;

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }

    fn sleep(&self, d: Duration);
}

/// Monotonic clock over [`Instant`] with a platform high-precision sleep.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "windows")]
        self.windows_sleep(duration);
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(target_os = "macos")]
        self.macos_sleep(duration);
        #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "windows")]
    fn windows_sleep(&self, duration: Duration) {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::Foundation::FILETIME;
        use windows::Win32::System::Threading::{
            CreateWaitableTimerW, SetWaitableTimer, WaitForSingleObject,
        };

        unsafe {
            let Ok(timer) = CreateWaitableTimerW(None, true, None) else {
                std::thread::sleep(duration);
                return;
            };

            let intervals = -(duration.as_nanos() as i64 / 100);

            let due_time = FILETIME {
                dwLowDateTime: intervals as u32,
                dwHighDateTime: (intervals >> 32) as u32,
            };

            if SetWaitableTimer(timer, &due_time, 0, None, None, false).is_ok() {
                WaitForSingleObject(timer, u32::MAX);
            }

            let _ = CloseHandle(timer);
        }
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }

    #[cfg(target_os = "macos")]
    fn macos_sleep(&self, duration: Duration) {
        use mach2::mach_time::{mach_absolute_time, mach_timebase_info, mach_timebase_info_data_t};
        use std::thread;

        if duration.as_nanos() < 100_000 {
            unsafe {
                let start = mach_absolute_time();
                let mut timebase = mach_timebase_info_data_t { numer: 0, denom: 0 };
                mach_timebase_info(&mut timebase);

                let target_ticks =
                    duration.as_nanos() as u64 * timebase.denom as u64 / timebase.numer as u64;

                while mach_absolute_time() - start < target_ticks {
                    std::hint::spin_loop();
                }
            }
        } else {
            thread::sleep(duration);
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn unix_time(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

/// Hand-advanced clock for tests. `sleep` advances it instead of blocking.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: Cell<u64>,
    base_unix: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_unix(base_unix: f64) -> Self {
        Self {
            now_ns: Cell::new(0),
            base_unix,
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.set(self.now_ns.get() + d.as_nanos() as u64);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now_ns.get()
    }

    fn unix_time(&self) -> f64 {
        self.base_unix + self.now_ns.get() as f64 / 1e9
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::with_base_unix(1000.0);
        assert_eq!(clock.now(), 0);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), 250_000_000);
        assert_eq!(clock.elapsed(0), Duration::from_millis(250));
        assert!((clock.unix_time() - 1000.25).abs() < 1e-9);
    }

    #[test]
    fn manual_clock_sleep_is_virtual() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_secs(4));
        assert_eq!(clock.now(), 4_000_000_000);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(clock.unix_time() > 0.0);
    }
}
